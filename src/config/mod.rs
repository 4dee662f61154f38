use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An item to put on the list at startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedItem {
    pub text: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Optional hex color overrides (`#RRGGBB` or `#RGB`)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_selected: Option<String>,
}

fn default_status_timeout() -> u64 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Start with the checked list collapsed
    #[serde(default)]
    pub hide_checked: bool,

    /// Seconds before a status message clears itself
    #[serde(default = "default_status_timeout")]
    pub status_timeout_secs: u64,

    /// Items on the list when the app starts
    #[serde(default)]
    pub items: Vec<SeedItem>,

    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hide_checked: false,
            status_timeout_secs: default_status_timeout(),
            items: Vec::new(),
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("shoplist");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default location, creating it if missing
    pub async fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path).await,
            Err(e) => {
                tracing::warn!("{}", e);
                Ok(AppConfig::default())
            }
        }
    }

    /// Load config from `path`, or write and return the default
    pub async fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            match tokio::fs::read_to_string(path).await {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config {}: {}", path.display(), e),
                },
                Err(e) => tracing::warn!("Failed to read config {}: {}", path.display(), e),
            }
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(path).await {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save config to `path`
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        // Drop blank seeds and blank categories before writing
        let mut clean_config = self.clone();
        clean_config.items.retain(|item| !item.text.trim().is_empty());
        for item in &mut clean_config.items {
            if item.category.as_ref().map(|c| c.trim().is_empty()).unwrap_or(false) {
                item.category = None;
            }
        }

        let content = toml::to_string_pretty(&clean_config)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
