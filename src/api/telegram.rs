//! Telegram Bot API delivery client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::callback::CallbackRegistry;
use super::http::build_client;
use super::types::{
    AnswerCallbackQueryRequest, ApiResponse, EditMessageTextRequest, InlineKeyboardButton,
    InlineKeyboardMarkup, Message, SendMessageRequest, Update,
};
use crate::browser::{Action, DeliveryGateway, InboundEvent, ViewDescriptor};
use crate::domain::{ChatId, MessageId};
use crate::error::DeliveryError;

/// Public Bot API endpoint
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Returned by editMessageText when the new content equals the old one
const NOT_MODIFIED: &str = "message is not modified";

/// Client for the Telegram Bot API
pub struct TelegramClient {
    client: Client,
    /// `<api>/bot<token>`; never logged
    base_url: String,
    callbacks: CallbackRegistry,
}

impl TelegramClient {
    pub fn new(api_base: &str, bot_token: &str, timeout: Duration) -> Result<Self> {
        let client = build_client(timeout).context("Failed to build Telegram HTTP client")?;
        if bot_token.trim().is_empty() {
            anyhow::bail!("Telegram bot token is empty");
        }

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token.trim()),
            callbacks: CallbackRegistry::new(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<B, R>(&self, method: &'static str, body: &B) -> Result<R, DeliveryError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.post(self.method_url(method)).json(body);
        self.execute(method, request).await
    }

    /// Send a prepared request and unwrap the Bot API envelope
    async fn execute<R: DeserializeOwned>(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<R, DeliveryError> {
        let response = request
            .send()
            .await
            .map_err(|source| DeliveryError::Transport { method, source })?;
        let status = response.status();
        debug!("Telegram {} -> {}", method, status);

        let envelope: ApiResponse<R> = response
            .json()
            .await
            .map_err(|source| DeliveryError::Transport { method, source })?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(DeliveryError::Api {
                method,
                description: description.unwrap_or_else(|| format!("HTTP {}", status)),
            }),
        }
    }

    /// Inline keyboard for a view; entry buttons get a kind marker
    fn keyboard(&self, view: &ViewDescriptor) -> InlineKeyboardMarkup {
        let inline_keyboard = view
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|button| {
                        let text = match &button.action {
                            Action::EnterDirectory(_) => format!("📁 {}", button.label),
                            Action::FetchFile(_) => format!("📄 {}", button.label),
                            _ => button.label.clone(),
                        };
                        InlineKeyboardButton {
                            text,
                            callback_data: self.callbacks.encode(&button.token()),
                        }
                    })
                    .collect()
            })
            .collect();

        InlineKeyboardMarkup { inline_keyboard }
    }

    /// Stop the client-side spinner on a pressed button
    pub async fn answer_callback_query(&self, query_id: &str) -> Result<(), DeliveryError> {
        let body = AnswerCallbackQueryRequest {
            callback_query_id: query_id,
        };
        let _: bool = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    /// Translate a webhook update into a browser event.
    ///
    /// Updates without text or callback data (joins, stickers, edits) yield `None`.
    pub fn inbound_event(&self, update: &Update) -> Option<InboundEvent> {
        if let Some(query) = &update.callback_query {
            let message = query.message.as_ref()?;
            let data = query.data.as_deref()?;
            let Some(token) = self.callbacks.decode(data) else {
                debug!("Update {}: unknown callback key {}", update.update_id, data);
                return None;
            };
            return Some(InboundEvent::ButtonPress {
                chat: ChatId(message.chat.id),
                message: MessageId(message.message_id),
                token,
            });
        }

        let message = update.message.as_ref()?;
        let text = message.text.as_ref()?;
        Some(InboundEvent::Text {
            chat: ChatId(message.chat.id),
            text: text.clone(),
        })
    }
}

#[async_trait]
impl DeliveryGateway for TelegramClient {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), DeliveryError> {
        let body = SendMessageRequest {
            chat_id: chat.0,
            text,
            reply_markup: None,
        };
        let _: Message = self.call("sendMessage", &body).await?;
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat: ChatId,
        view: &ViewDescriptor,
    ) -> Result<MessageId, DeliveryError> {
        let body = SendMessageRequest {
            chat_id: chat.0,
            text: &view.title,
            reply_markup: Some(self.keyboard(view)),
        };
        let message: Message = self.call("sendMessage", &body).await?;
        Ok(MessageId(message.message_id))
    }

    async fn edit_keyboard(
        &self,
        chat: ChatId,
        message: MessageId,
        view: &ViewDescriptor,
    ) -> Result<(), DeliveryError> {
        let body = EditMessageTextRequest {
            chat_id: chat.0,
            message_id: message.0,
            text: &view.title,
            reply_markup: self.keyboard(view),
        };
        match self
            .call::<_, serde_json::Value>("editMessageText", &body)
            .await
        {
            Ok(_) => Ok(()),
            Err(DeliveryError::Api { description, .. }) if description.contains(NOT_MODIFIED) => {
                debug!("Chat {}: keyboard unchanged", chat);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn send_document(
        &self,
        chat: ChatId,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<(), DeliveryError> {
        let form = Form::new()
            .text("chat_id", chat.0.to_string())
            .part("document", Part::bytes(bytes).file_name(filename.to_string()));
        let request = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form);

        let _: Message = self.execute("sendDocument", request).await?;
        Ok(())
    }
}
