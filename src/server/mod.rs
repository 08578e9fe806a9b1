//! Webhook receiver.
//!
//! Telegram posts every update to `/webhook`. The handler acknowledges
//! immediately and hands the event to the per-chat dispatcher, so slow
//! GitHub calls never hold the webhook request open.

mod dispatch;

pub use dispatch::Dispatcher;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{TelegramClient, Update};

/// Header Telegram sets when the webhook was registered with a secret
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

const HEALTH_MESSAGE: &str = "🤖 Telegram GitHub File Fetch Bot is running";

/// Shared state of the webhook routes
pub struct AppState {
    pub telegram: Arc<TelegramClient>,
    pub dispatcher: Arc<Dispatcher>,
    pub webhook_secret: Option<String>,
}

pub(crate) fn is_authorized(headers: &HeaderMap, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        return true;
    };
    headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == secret)
}

async fn health() -> &'static str {
    HEALTH_MESSAGE
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> StatusCode {
    if !is_authorized(&headers, state.webhook_secret.as_deref()) {
        warn!("Rejected update {}: bad secret token", update.update_id);
        return StatusCode::UNAUTHORIZED;
    }

    if let Some(query) = &update.callback_query {
        let telegram = state.telegram.clone();
        let query_id = query.id.clone();
        tokio::spawn(async move {
            if let Err(err) = telegram.answer_callback_query(&query_id).await {
                debug!("Failed to answer callback query {}: {}", query_id, err);
            }
        });
    }

    match state.telegram.inbound_event(&update) {
        Some(event) => state.dispatcher.submit(event).await,
        None => debug!("Update {} carries nothing to handle", update.update_id),
    }

    StatusCode::OK
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/webhook", post(webhook))
        .with_state(state)
}

/// Serve the webhook until Ctrl-C
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let local_addr = listener.local_addr()?;

    info!("✅ Server running on http://{}", local_addr);
    info!("🔗 Webhook endpoint: http://{}/webhook", local_addr);
    if state.webhook_secret.is_some() {
        info!("🔐 Webhook secret check enabled");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server failed")?;

    info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
}
