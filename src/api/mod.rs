//! HTTP clients for the repository host and the chat platform.
//!
//! - `github`: `RetrievalGateway` over the GitHub REST API and raw host
//! - `telegram`: `DeliveryGateway` over the Telegram Bot API, plus webhook
//!   update decoding

mod callback;
mod github;
mod http;
mod telegram;
mod types;

pub use github::{GitHubClient, DEFAULT_GITHUB_API_URL, DEFAULT_GITHUB_RAW_URL};
pub use telegram::{TelegramClient, DEFAULT_TELEGRAM_API_URL};
pub use types::Update;
