use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use slamstory_core::{Opponent, SlamConfig};
use slamstory_gemini::GeminiClient;

mod headless;

/// slamstory: turn one photo into your own US Open final.
///
/// Generates a six-panel storyboard of you facing a real finalist, one panel
/// at a time, then writes match commentary and post-match interview
/// questions for the same match.
#[derive(Parser, Debug)]
#[command(name = "slamstory", version, about)]
struct Cli {
    /// Photo of you (can also be chosen in the TUI).
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Opponent, by full name or surname (e.g. "Sinner").
    #[arg(short, long)]
    opponent: Option<String>,

    /// Run without the TUI: generate everything and write the panels to disk.
    #[arg(long, requires = "image")]
    headless: bool,

    /// Directory for saved panels (defaults to output.download_dir).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8, headless: bool) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .init();
        return;
    }

    // The TUI owns the terminal, so logs go to a file.
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("slamstory");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("slamstory.log"));

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .with_writer(std::io::sink)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.headless);

    let config = match cli.config {
        Some(ref path) => SlamConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SlamConfig::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            SlamConfig::default()
        }),
    };

    let opponent = match cli.opponent {
        Some(ref name) => name.parse::<Opponent>()?,
        None => Opponent::default(),
    };
    let download_dir = cli
        .out
        .clone()
        .unwrap_or_else(|| config.output.download_dir.clone());

    tracing::info!("Starting slamstory v{}", env!("CARGO_PKG_VERSION"));

    let client = GeminiClient::from_config(&config)?;

    if cli.headless {
        let image = cli.image.context("--headless needs --image")?;
        headless::run(&client, &image, opponent, &download_dir).await?;
    } else {
        let mut app = slamstory_tui::App::new(Arc::new(client), download_dir);
        app.set_initial_opponent(opponent);
        if let Some(image) = cli.image {
            app.set_initial_image(image);
        }
        app.run().await?;
    }

    tracing::info!("slamstory exited cleanly");
    Ok(())
}
