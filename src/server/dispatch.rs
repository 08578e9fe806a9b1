//! Per-chat event ordering.
//!
//! Each chat gets its own queue and worker task, so one chat's events run
//! strictly in arrival order while different chats interleave. Every event
//! runs in a task of its own that the worker awaits: a panic ends that
//! event only.
//!
//! Queues are never reclaimed. Every chat seen since startup keeps its
//! sender and an idle worker until the process exits, so memory grows with
//! the number of distinct chats.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error};

use crate::browser::{InboundEvent, Navigator};
use crate::domain::ChatId;

/// Something that handles one inbound event to completion
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, event: InboundEvent);
}

#[async_trait]
impl EventHandler for Navigator {
    async fn handle(&self, event: InboundEvent) {
        Navigator::handle(self, event).await
    }
}

/// Routes events to per-chat workers
pub struct Dispatcher {
    handler: Arc<dyn EventHandler>,
    queues: Mutex<HashMap<ChatId, mpsc::UnboundedSender<InboundEvent>>>,
}

impl Dispatcher {
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self {
            handler,
            queues: Mutex::new(HashMap::new()),
        }
    }

    /// Queue `event` behind earlier events of the same chat
    pub async fn submit(&self, event: InboundEvent) {
        let chat = event.chat();
        let mut queues = self.queues.lock().await;

        let event = match queues.get(&chat) {
            Some(sender) => match sender.send(event) {
                Ok(()) => return,
                // Worker is gone; start a new one below
                Err(mpsc::error::SendError(event)) => event,
            },
            None => event,
        };

        debug!("Starting worker for chat {}", chat);
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_chat_worker(chat, self.handler.clone(), receiver));
        if sender.send(event).is_err() {
            error!("Chat {}: worker stopped before receiving an event", chat);
        }
        queues.insert(chat, sender);
    }
}

async fn run_chat_worker(
    chat: ChatId,
    handler: Arc<dyn EventHandler>,
    mut receiver: mpsc::UnboundedReceiver<InboundEvent>,
) {
    while let Some(event) = receiver.recv().await {
        let handler = handler.clone();
        let outcome = tokio::spawn(async move { handler.handle(event).await }).await;
        if let Err(err) = outcome {
            error!("Chat {}: event handler crashed: {}", chat, err);
        }
    }
}
