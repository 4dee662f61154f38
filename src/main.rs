mod app;
mod config;
mod list;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use config::{AppConfig, SeedItem};
use list::ListModel;
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "shoplist")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "A terminal shopping list with sorted, checkable items")]
struct Args {
    /// Use this config file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Add an item at startup (repeatable)
    #[arg(short, long = "add", value_name = "ITEM")]
    add: Vec<String>,

    /// Check off an item at startup, adding it first if needed (repeatable)
    #[arg(short, long = "check", value_name = "ITEM")]
    check: Vec<String>,

    /// Ignore the items listed in the config file
    #[arg(long)]
    no_seed: bool,

    /// Print the resulting list as JSON instead of starting the TUI
    #[arg(short, long)]
    dump: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging (stderr, filtered by RUST_LOG)
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path).await?,
        None => AppConfig::load().await?,
    };

    let list = build_list(&config, &args);
    if list.is_empty() {
        tracing::info!("Starting with an empty list");
    } else {
        tracing::info!("Starting with {} items", list.len());
    }

    if args.dump {
        return print_list(&list);
    }

    ui::init_theme(Theme::from_config(&config.theme));
    let mut app = App::new(&config, list);
    run_tui(&mut app).await
}

/// Seed the list from config and the command line
fn build_list(config: &AppConfig, args: &Args) -> ListModel {
    let mut seeds: Vec<SeedItem> = if args.no_seed {
        Vec::new()
    } else {
        config.items.clone()
    };

    seeds.extend(args.add.iter().map(|text| SeedItem {
        text: text.clone(),
        checked: false,
        category: None,
    }));

    let mut list = ListModel::from_seed(&seeds);

    // --check adds missing items, then checks them in argument order
    for text in &args.check {
        if list.get(text).is_none() {
            if let Err(e) = list.add(text, None) {
                tracing::debug!("--check {}: {}", text, e);
            }
        }
        if let Err(e) = list.set_checked(text, true) {
            tracing::warn!("Could not check {:?}: {}", text, e);
        }
    }

    list
}

fn print_list(list: &ListModel) -> Result<()> {
    let items: Vec<_> = list.items().collect();
    let output = serde_json::json!({
        "items": items,
        "unchecked": list.unchecked().count(),
        "checked": list.checked().count(),
        "has_checked": list.has_checked_items(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.can_quit() => return Ok(()),
                        KeyCode::Char('c')
                            if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                        {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key) {
                                app.warning = Some(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        // Expire status messages
        app.tick();
        tokio::task::yield_now().await;
    }
}
