//! Command-line and environment configuration.

use clap::builder::TypedValueParser;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::api::{DEFAULT_GITHUB_API_URL, DEFAULT_GITHUB_RAW_URL, DEFAULT_TELEGRAM_API_URL};
use crate::browser::DEFAULT_PAGE_SIZE;

/// Telegram bot for browsing GitHub repositories
#[derive(Parser, Debug)]
#[command(name = "repo-browser-bot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// GitHub token for higher API rate limits
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Port of the webhook server
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address the webhook server binds to
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Entries per keyboard page
    #[arg(
        long,
        env = "PAGE_SIZE",
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = clap::value_parser!(u16).range(1..=50).map(usize::from)
    )]
    pub page_size: usize,

    /// Timeout for every outbound HTTP request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Expected X-Telegram-Bot-Api-Secret-Token header on webhook calls
    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL, hide = true)]
    pub github_api_url: String,

    /// GitHub raw content base URL
    #[arg(long, env = "GITHUB_RAW_URL", default_value = DEFAULT_GITHUB_RAW_URL, hide = true)]
    pub github_raw_url: String,

    /// Telegram Bot API base URL
    #[arg(long, env = "TELEGRAM_API_URL", default_value = DEFAULT_TELEGRAM_API_URL, hide = true)]
    pub telegram_api_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn webhook_secret(&self) -> Option<String> {
        self.webhook_secret.clone().filter(|s| !s.is_empty())
    }
}
