//! Domain types shared across modules.
//!
//! This module contains data structures that are used by the gateways,
//! the navigation core and the webhook server. Keeping them here avoids
//! circular dependencies between `api` and `browser`.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::error::ParseError;

/// Telegram chat identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message previously sent by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

/// A repository reference extracted from chat text.
///
/// `branch` is only set when the link pointed at a specific tree
/// (`https://github.com/<owner>/<repo>/tree/<branch>`). It holds everything
/// after `/tree/`, which for links into a directory also includes the
/// directory path; the branch part is found when the revision is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    pub branch: Option<String>,
}

fn repo_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https?://(?:www\.)?github\.com/([^/\s]+)/([^/\s#?]+)(?:/tree/([^\s#?]+))?")
            .expect("repository URL pattern is valid")
    })
}

impl RepoRef {
    /// Parse a GitHub repository link at the start of a chat message.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let caps = repo_url_regex()
            .captures(text.trim())
            .ok_or(ParseError::NotARepositoryUrl)?;

        let owner = caps[1].to_string();
        let raw_name = &caps[2];
        let name = raw_name.strip_suffix(".git").unwrap_or(raw_name).to_string();
        if name.is_empty() {
            return Err(ParseError::MissingRepositoryName);
        }
        let branch = caps
            .get(3)
            .map(|m| m.as_str().trim_matches('/'))
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        Ok(Self {
            owner,
            name,
            branch,
        })
    }

    /// `owner/name` form used in messages and logs
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// A branch resolved to a concrete commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub branch: String,
    pub sha: String,
}

/// Repository identity fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    pub owner: String,
    pub name: String,
    pub revision: Revision,
}

impl RepoIdentity {
    pub fn new(repo: &RepoRef, revision: Revision) -> Self {
        Self {
            owner: repo.owner.clone(),
            name: repo.name.clone(),
            revision,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}
