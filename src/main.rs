//! Parley - a terminal client for WebSocket and HTTP chat backends
//!
//! This is the binary entry point. Session logic lives in `parley-app`,
//! rendering in `parley-tui`.

mod headless;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

use parley_app::config::{load_settings, load_settings_from, BackendMode, Settings};
use parley_transport::PromptField;

/// Parley - chat with a WebSocket or HTTP backend from the terminal
#[derive(Parser, Debug)]
#[command(name = "parley", version)]
#[command(about = "A terminal client for WebSocket and HTTP chat backends", long_about = None)]
struct Args {
    /// WebSocket endpoint of the chat backend
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Use the stateless HTTP backend at this endpoint instead
    #[arg(long, value_name = "URL")]
    http: Option<String>,

    /// JSON field carrying the prompt in HTTP mode (message | prompt)
    #[arg(long, value_name = "FIELD")]
    field: Option<PromptField>,

    /// Reconnect attempts after the socket drops (0 disables)
    #[arg(long, value_name = "N")]
    max_reconnect_attempts: Option<u32>,

    /// Run in headless mode (NDJSON on stdout, commands on stdin)
    #[arg(long)]
    headless: bool,

    /// Read settings from this file instead of .parley/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.url {
            settings.server.url = url.clone();
            settings.server.mode = BackendMode::Websocket;
        }
        if let Some(endpoint) = &self.http {
            settings.server.http_endpoint = endpoint.clone();
            settings.server.mode = BackendMode::Http;
        }
        if let Some(field) = self.field {
            settings.server.http_field = field;
        }
        if let Some(attempts) = self.max_reconnect_attempts {
            settings.server.max_reconnect_attempts = attempts;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    parley_core::logging::init()?;

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            load_settings(&cwd)
        }
    };
    args.apply(&mut settings);
    settings.validate()?;

    if args.headless {
        headless::runner::run_headless(settings).await?;
    } else {
        parley_tui::run(settings).await?;
    }
    Ok(())
}
