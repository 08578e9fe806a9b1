//! GitHub retrieval client.
//!
//! Resolves branches through the REST API, lists a revision with the
//! recursive trees endpoint and downloads file bytes from the raw host.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::http::{build_client, send_checked};
use super::types::{GitRef, RefLookup, RepositoryInfo, TreeResponse};
use crate::browser::{Entry, RetrievalGateway};
use crate::domain::Revision;
use crate::error::RetrievalError;

/// Public GitHub REST API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Public raw content host
pub const DEFAULT_GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Largest file the Telegram Bot API accepts through `sendDocument`
pub const MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// Client for the GitHub REST API and raw content host
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    raw_base: Url,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client; `token` is sent as a Bearer token to the REST API when present
    pub fn new(
        api_base: &str,
        raw_base: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = build_client(timeout).context("Failed to build GitHub HTTP client")?;
        let api_base =
            Url::parse(api_base).with_context(|| format!("Invalid GitHub API URL: {}", api_base))?;
        let raw_base =
            Url::parse(raw_base).with_context(|| format!("Invalid GitHub raw URL: {}", raw_base))?;

        Ok(Self {
            client,
            api_base,
            raw_base,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// `base` with `segments` appended, each percent-encoded
    fn join(base: &Url, segments: &[&str]) -> Result<Url, RetrievalError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| RetrievalError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn repo_url(&self, owner: &str, name: &str, rest: &[&str]) -> Result<Url, RetrievalError> {
        let mut segments = vec!["repos", owner, name];
        segments.extend_from_slice(rest);
        Self::join(&self.api_base, &segments)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RetrievalError> {
        let url_str = url.to_string();
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = send_checked(request, &url_str).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RetrievalError::Decode {
                url: url_str,
                message: e.to_string(),
            })
    }
}

/// Map a GitHub tree listing to browser entries, skipping submodules
pub(super) fn tree_entries(tree: TreeResponse) -> Vec<Entry> {
    if tree.truncated {
        warn!(
            "Tree {} was truncated by GitHub; browsing the partial listing",
            tree.sha
        );
    }

    tree.tree
        .into_iter()
        .filter_map(|item| match item.kind.as_str() {
            "tree" => Some(Entry::directory(item.path)),
            "blob" => Some(Entry::file(item.path)),
            _ => None,
        })
        .collect()
}

/// The ref naming exactly `refs/heads/<branch>`, never a prefix match
pub(super) fn exact_branch_ref(lookup: RefLookup, branch: &str) -> Result<GitRef, RetrievalError> {
    let wanted = format!("refs/heads/{}", branch);
    let found = match lookup {
        RefLookup::Exact(git_ref) => Some(git_ref),
        RefLookup::Prefixed(refs) => refs.into_iter().find(|r| r.name == wanted),
    };
    found
        .filter(|r| r.name == wanted)
        .ok_or_else(|| RetrievalError::UnknownBranch(branch.to_string()))
}

pub(super) fn ensure_sendable(path: &str, size: u64) -> Result<(), RetrievalError> {
    if size > MAX_DOCUMENT_BYTES {
        return Err(RetrievalError::TooLarge {
            path: path.to_string(),
            size,
            limit: MAX_DOCUMENT_BYTES,
        });
    }
    Ok(())
}

#[async_trait]
impl RetrievalGateway for GitHubClient {
    async fn resolve_default_revision(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Revision, RetrievalError> {
        let info: RepositoryInfo = self.get_json(self.repo_url(owner, name, &[])?).await?;
        debug!("{}/{} default branch: {}", owner, name, info.default_branch);
        self.resolve_branch(owner, name, &info.default_branch).await
    }

    async fn resolve_branch(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
    ) -> Result<Revision, RetrievalError> {
        let mut rest = vec!["git", "refs", "heads"];
        rest.extend(branch.split('/'));
        let lookup: RefLookup = self.get_json(self.repo_url(owner, name, &rest)?).await?;
        let git_ref = exact_branch_ref(lookup, branch)?;

        Ok(Revision {
            branch: branch.to_string(),
            sha: git_ref.object.sha,
        })
    }

    async fn fetch_tree(
        &self,
        owner: &str,
        name: &str,
        revision: &str,
    ) -> Result<Vec<Entry>, RetrievalError> {
        let mut url = self.repo_url(owner, name, &["git", "trees", revision])?;
        url.query_pairs_mut().append_pair("recursive", "1");

        let tree: TreeResponse = self.get_json(url).await?;
        Ok(tree_entries(tree))
    }

    async fn fetch_blob(
        &self,
        owner: &str,
        name: &str,
        revision: &str,
        path: &str,
    ) -> Result<Vec<u8>, RetrievalError> {
        let mut segments = vec![owner, name, revision];
        segments.extend(path.split('/'));
        let url = Self::join(&self.raw_base, &segments)?;
        let url_str = url.to_string();

        let response = send_checked(self.client.get(url), &url_str).await?;
        if let Some(length) = response.content_length() {
            ensure_sendable(path, length)?;
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|source| RetrievalError::Transport {
                url: url_str,
                source,
            })?;
        ensure_sendable(path, bytes.len() as u64)?;
        Ok(bytes.to_vec())
    }
}
