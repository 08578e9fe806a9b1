//! Event handling for the repository browser.
//!
//! Each inbound event is reduced against the chat's session by pure
//! functions (`reduce_press`, `reduce_keyword`) that return the outbound
//! `Effect`s; `Navigator` then performs those effects through the gateways.
//! Keeping the two apart means every state transition can be checked
//! without any network.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::action::Action;
use super::gateway::{DeliveryGateway, RetrievalGateway};
use super::session::{SearchOutcome, Session};
use super::store::SessionStore;
use super::tree::{base_name, TreeIndex};
use super::view::{render, ViewDescriptor};
use crate::domain::{ChatId, MessageId, RepoIdentity, RepoRef, Revision};
use crate::error::RetrievalError;

pub const FETCHING_MESSAGE: &str = "⏳ Fetching repository files…";
pub const EMPTY_REPOSITORY_MESSAGE: &str = "⚠️ No files found in repository";
pub const NO_SESSION_MESSAGE: &str =
    "This keyboard is no longer active. Send a GitHub repository link to start browsing.";
pub const EMPTY_KEYWORD_MESSAGE: &str =
    "Send a non-empty keyword, or press \"Cancel search\" to go back.";

/// An event received from the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Text {
        chat: ChatId,
        text: String,
    },
    ButtonPress {
        chat: ChatId,
        message: MessageId,
        token: String,
    },
}

impl InboundEvent {
    pub fn chat(&self) -> ChatId {
        match self {
            InboundEvent::Text { chat, .. } | InboundEvent::ButtonPress { chat, .. } => *chat,
        }
    }
}

/// `a/b/c`, then `a/b`, then `a`
pub(crate) fn branch_candidates(tree_path: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(tree_path), |&path| {
        path.rsplit_once('/').map(|(head, _)| head)
    })
    .filter(|candidate| !candidate.is_empty())
}

/// Outbound command produced by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendText(String),
    SendKeyboard(ViewDescriptor),
    EditKeyboard {
        message: MessageId,
        view: ViewDescriptor,
    },
    /// Fetch a file of the session's revision and send it as a document
    DeliverFile { path: String },
}

/// Outcome of reducing one event against a session
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Transition {
    /// The session was mutated and must be stored again
    pub changed: bool,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(effects: Vec<Effect>) -> Self {
        Self {
            changed: false,
            effects,
        }
    }

    fn rerender(session: &Session, message: MessageId) -> Self {
        Self {
            changed: true,
            effects: vec![Effect::EditKeyboard {
                message,
                view: render(session),
            }],
        }
    }
}

/// Apply a button press to `session`.
///
/// File selection never mutates the session. Actions that do not fit the
/// current state produce no effects.
pub fn reduce_press(session: &mut Session, action: Action, message: MessageId) -> Transition {
    let result = match &action {
        Action::FetchFile(path) => {
            return match session.file_entry(path) {
                Ok(_) => Transition::unchanged(vec![Effect::DeliverFile { path: path.clone() }]),
                Err(reason) => {
                    debug!("Ignoring {}: {}", action, reason);
                    Transition::default()
                }
            };
        }
        Action::EnterDirectory(path) => session.enter_directory(path),
        Action::Back => session.back(),
        Action::PageNext => session.next_page(),
        Action::PagePrev => session.prev_page(),
        Action::StartSearch => session.start_search(),
        Action::CancelSearch => session.cancel_search(),
    };

    match result {
        Ok(()) => Transition::rerender(session, message),
        Err(reason) => {
            debug!("Ignoring {}: {}", action, reason);
            Transition::default()
        }
    }
}

/// Apply text received while the session awaits a search keyword.
///
/// Results (or the unchanged directory after an empty search) are sent as a
/// new keyboard because the keyword message now sits below the old one.
pub fn reduce_keyword(session: &mut Session, keyword: &str) -> Transition {
    match session.submit_keyword(keyword) {
        Ok(SearchOutcome::Matches(count)) => {
            debug!("Search for {:?} matched {} file(s)", keyword.trim(), count);
            Transition {
                changed: true,
                effects: vec![Effect::SendKeyboard(render(session))],
            }
        }
        Ok(SearchOutcome::NoMatches) => Transition {
            changed: true,
            effects: vec![
                Effect::SendText(format!(
                    "🔍 No files matching \"{}\" (0 results)",
                    keyword.trim()
                )),
                Effect::SendKeyboard(render(session)),
            ],
        },
        Ok(SearchOutcome::EmptyKeyword) => {
            Transition::unchanged(vec![Effect::SendText(EMPTY_KEYWORD_MESSAGE.to_string())])
        }
        Err(reason) => {
            debug!("Ignoring text: {}", reason);
            Transition::default()
        }
    }
}

/// Drives sessions from inbound events
pub struct Navigator {
    retrieval: Arc<dyn RetrievalGateway>,
    delivery: Arc<dyn DeliveryGateway>,
    sessions: Arc<dyn SessionStore>,
    page_size: usize,
}

impl Navigator {
    pub fn new(
        retrieval: Arc<dyn RetrievalGateway>,
        delivery: Arc<dyn DeliveryGateway>,
        sessions: Arc<dyn SessionStore>,
        page_size: usize,
    ) -> Self {
        Self {
            retrieval,
            delivery,
            sessions,
            page_size: page_size.max(1),
        }
    }

    /// Handle one event to completion, including its network calls
    pub async fn handle(&self, event: InboundEvent) {
        match event {
            InboundEvent::Text { chat, text } => self.on_text(chat, &text).await,
            InboundEvent::ButtonPress {
                chat,
                message,
                token,
            } => self.on_button_press(chat, message, &token).await,
        }
    }

    async fn on_text(&self, chat: ChatId, text: &str) {
        let parse_error = match RepoRef::parse(text) {
            Ok(repo) => return self.load_repository(chat, repo).await,
            Err(err) => err,
        };

        let Some(mut session) = self.sessions.get(chat).await else {
            debug!("Chat {}: ignoring text ({})", chat, parse_error);
            return;
        };

        let transition = reduce_keyword(&mut session, text);
        if transition.effects.is_empty() {
            debug!("Chat {}: ignoring text ({})", chat, parse_error);
            return;
        }
        if transition.changed {
            self.sessions.put(chat, session.clone()).await;
        }
        self.execute(chat, session.repo(), transition.effects).await;
    }

    async fn on_button_press(&self, chat: ChatId, message: MessageId, token: &str) {
        let action = match token.parse::<Action>() {
            Ok(action) => action,
            Err(err) => {
                debug!("Chat {}: {}", chat, err);
                return;
            }
        };

        let Some(mut session) = self.sessions.get(chat).await else {
            debug!("Chat {}: button press without a session", chat);
            self.notify(chat, NO_SESSION_MESSAGE).await;
            return;
        };

        let transition = reduce_press(&mut session, action, message);
        if transition.changed {
            self.sessions.put(chat, session.clone()).await;
        }
        self.execute(chat, session.repo(), transition.effects).await;
    }

    /// Fetch a repository tree and start a fresh session at its root
    async fn load_repository(&self, chat: ChatId, repo: RepoRef) {
        info!("📥 Chat {}: loading {}", chat, repo.full_name());
        self.notify(chat, FETCHING_MESSAGE).await;

        let (identity, tree) = match self.fetch_snapshot(&repo).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("Chat {}: failed to load {}: {}", chat, repo.full_name(), err);
                self.notify(chat, &format!("❌ Error: {}", err.user_message()))
                    .await;
                return;
            }
        };

        if tree.is_empty() {
            info!("Chat {}: {} has no entries", chat, repo.full_name());
            self.notify(chat, EMPTY_REPOSITORY_MESSAGE).await;
            return;
        }

        info!(
            "✅ Chat {}: {} @ {} ({} entries)",
            chat,
            identity.full_name(),
            identity.revision.sha,
            tree.len()
        );
        let session = Session::new(identity, Arc::new(tree), self.page_size);
        let view = render(&session);
        let repo_identity = session.repo().clone();
        self.sessions.put(chat, session).await;
        self.execute(chat, &repo_identity, vec![Effect::SendKeyboard(view)])
            .await;
    }

    async fn fetch_snapshot(
        &self,
        repo: &RepoRef,
    ) -> Result<(RepoIdentity, TreeIndex), RetrievalError> {
        let revision = match &repo.branch {
            Some(tree_path) => self.resolve_tree_link(repo, tree_path).await?,
            None => {
                self.retrieval
                    .resolve_default_revision(&repo.owner, &repo.name)
                    .await?
            }
        };
        let entries = self
            .retrieval
            .fetch_tree(&repo.owner, &repo.name, &revision.sha)
            .await?;

        Ok((RepoIdentity::new(repo, revision), TreeIndex::new(entries)))
    }

    /// Resolve the branch named by a `/tree/...` link.
    ///
    /// Branch names may contain `/` and the link may continue into a
    /// directory, so the longest prefix that names a branch wins.
    async fn resolve_tree_link(
        &self,
        repo: &RepoRef,
        tree_path: &str,
    ) -> Result<Revision, RetrievalError> {
        for candidate in branch_candidates(tree_path) {
            match self
                .retrieval
                .resolve_branch(&repo.owner, &repo.name, candidate)
                .await
            {
                Ok(revision) => return Ok(revision),
                Err(err) if err.is_not_found() => {
                    debug!("{}: no branch {}", repo.full_name(), candidate);
                }
                Err(err) => return Err(err),
            }
        }
        Err(RetrievalError::UnknownBranch(tree_path.to_string()))
    }

    async fn execute(&self, chat: ChatId, repo: &RepoIdentity, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendText(text) => self.notify(chat, &text).await,
                Effect::SendKeyboard(view) => {
                    if let Err(err) = self.delivery.send_keyboard(chat, &view).await {
                        warn!("Chat {}: failed to send keyboard: {}", chat, err);
                    }
                }
                Effect::EditKeyboard { message, view } => {
                    if let Err(err) = self.delivery.edit_keyboard(chat, message, &view).await {
                        warn!("Chat {}: failed to edit keyboard: {}", chat, err);
                    }
                }
                Effect::DeliverFile { path } => self.deliver_file(chat, repo, &path).await,
            }
        }
    }

    async fn deliver_file(&self, chat: ChatId, repo: &RepoIdentity, path: &str) {
        let bytes = match self
            .retrieval
            .fetch_blob(&repo.owner, &repo.name, &repo.revision.sha, path)
            .await
        {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Chat {}: failed to fetch {}: {}", chat, path, err);
                self.notify(
                    chat,
                    &format!("❌ Error: could not fetch {}: {}", path, err.user_message()),
                )
                .await;
                return;
            }
        };

        debug!("Chat {}: sending {} ({} bytes)", chat, path, bytes.len());
        if let Err(err) = self
            .delivery
            .send_document(chat, bytes, base_name(path))
            .await
        {
            warn!("Chat {}: failed to send {}: {}", chat, path, err);
            self.notify(chat, &format!("❌ Error: could not send {}", path))
                .await;
        }
    }

    async fn notify(&self, chat: ChatId, text: &str) {
        if let Err(err) = self.delivery.send_text(chat, text).await {
            warn!("Chat {}: failed to send message: {}", chat, err);
        }
    }
}
