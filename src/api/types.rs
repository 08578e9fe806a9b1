//! Wire types for the GitHub REST API and the Telegram Bot API.

use serde::{Deserialize, Serialize};

// ============================================================================
// GitHub
// ============================================================================

/// `GET /repos/{owner}/{repo}` (only the fields we read)
#[derive(Debug, Deserialize)]
pub(super) struct RepositoryInfo {
    pub default_branch: String,
}

/// One entry of `GET /repos/{owner}/{repo}/git/refs/heads/{branch}`
#[derive(Debug, Deserialize)]
pub(super) struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

/// The refs endpoint answers an exact match with one object and a prefix
/// match (`heads/feature` when only `heads/feature/x` exists) with an array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum RefLookup {
    Exact(GitRef),
    Prefixed(Vec<GitRef>),
}

#[derive(Debug, Deserialize)]
pub(super) struct GitObject {
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/git/trees/{sha}?recursive=1`
#[derive(Debug, Deserialize)]
pub(super) struct TreeResponse {
    pub sha: String,
    pub tree: Vec<TreeItem>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct TreeItem {
    pub path: String,
    /// `blob`, `tree` or `commit` (submodule)
    #[serde(rename = "type")]
    pub kind: String,
}

// ============================================================================
// Telegram
// ============================================================================

/// Incoming webhook payload
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub(super) struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub(super) struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub(super) struct EditMessageTextRequest<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
    pub reply_markup: InlineKeyboardMarkup,
}

#[derive(Debug, Serialize)]
pub(super) struct AnswerCallbackQueryRequest<'a> {
    pub callback_query_id: &'a str,
}
