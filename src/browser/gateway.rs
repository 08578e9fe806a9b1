//! Seams to the repository host and the chat platform.

use async_trait::async_trait;

use super::tree::Entry;
use super::view::ViewDescriptor;
use crate::domain::{ChatId, MessageId, Revision};
use crate::error::{DeliveryError, RetrievalError};

/// Read access to a hosted repository
#[async_trait]
pub trait RetrievalGateway: Send + Sync {
    /// Resolve the repository's default branch to a commit
    async fn resolve_default_revision(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Revision, RetrievalError>;

    /// Resolve a named branch to a commit
    async fn resolve_branch(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
    ) -> Result<Revision, RetrievalError>;

    /// Full recursive listing of a revision
    async fn fetch_tree(
        &self,
        owner: &str,
        name: &str,
        revision: &str,
    ) -> Result<Vec<Entry>, RetrievalError>;

    /// Raw bytes of one file
    async fn fetch_blob(
        &self,
        owner: &str,
        name: &str,
        revision: &str,
        path: &str,
    ) -> Result<Vec<u8>, RetrievalError>;
}

/// Outbound chat operations
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), DeliveryError>;

    /// Send a new keyboard message and return its id
    async fn send_keyboard(
        &self,
        chat: ChatId,
        view: &ViewDescriptor,
    ) -> Result<MessageId, DeliveryError>;

    /// Replace text and keyboard of a message sent earlier
    async fn edit_keyboard(
        &self,
        chat: ChatId,
        message: MessageId,
        view: &ViewDescriptor,
    ) -> Result<(), DeliveryError>;

    async fn send_document(
        &self,
        chat: ChatId,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<(), DeliveryError>;
}
