//! Theme colors, with optional overrides from the `[theme]` config table

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,           // Active borders, highlights, key hints
    pub danger: Color,           // Warnings and delete hints
    pub warning: Color,          // Status messages
    pub text: Color,             // Primary text (unchecked items)
    pub text_dim: Color,         // Checked items, hints
    pub bg_selected: Color,      // Selection background
    pub inactive: Color,         // Inactive borders
    pub category: Color,         // Category tags
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired colors
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            warning: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            category: Color::Rgb(137, 180, 250),
        }
    }
}

impl Theme {
    /// Defaults with any valid overrides from config applied
    pub fn from_config(config: &ThemeConfig) -> Self {
        let defaults = Self::default();
        let pick = |value: &Option<String>, fallback: Color| {
            match value.as_deref() {
                Some(hex) => Self::parse_hex_color(hex).unwrap_or_else(|| {
                    tracing::warn!("Ignoring invalid theme color {:?}", hex);
                    fallback
                }),
                None => fallback,
            }
        };

        Self {
            accent: pick(&config.accent, defaults.accent),
            danger: pick(&config.danger, defaults.danger),
            warning: pick(&config.warning, defaults.warning),
            text: pick(&config.text, defaults.text),
            text_dim: pick(&config.text_dim, defaults.text_dim),
            bg_selected: pick(&config.bg_selected, defaults.bg_selected),
            inactive: defaults.inactive,
            category: defaults.category,
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
