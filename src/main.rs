use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod api;
mod browser;
mod config;
mod domain;
mod error;
mod server;

use api::{GitHubClient, TelegramClient};
use browser::{MemorySessionStore, Navigator};
use config::Cli;
use server::{AppState, Dispatcher};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("🔧 Starting repository browser bot...");

    let timeout = cli.request_timeout();
    let github = Arc::new(GitHubClient::new(
        &cli.github_api_url,
        &cli.github_raw_url,
        cli.github_token.clone(),
        timeout,
    )?);
    let telegram = Arc::new(TelegramClient::new(
        &cli.telegram_api_url,
        &cli.bot_token,
        timeout,
    )?);

    if cli.github_token.as_deref().map_or(true, str::is_empty) {
        info!("No GITHUB_TOKEN set; GitHub API calls are unauthenticated");
    }

    let navigator = Arc::new(Navigator::new(
        github,
        telegram.clone(),
        Arc::new(MemorySessionStore::new()),
        cli.page_size,
    ));
    let state = Arc::new(AppState {
        telegram,
        dispatcher: Arc::new(Dispatcher::new(navigator)),
        webhook_secret: cli.webhook_secret(),
    });

    server::serve(cli.listen_addr(), state).await
}
