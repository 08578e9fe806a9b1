//! Per-chat navigation state and its transitions.
//!
//! A `Session` is always in exactly one `Mode`. Every transition validates
//! the mode and the targeted entry first and either applies completely or
//! returns `Rejected` without touching any field. Rejections are expected:
//! chat clients keep old keyboards around, so users can press buttons that
//! no longer match the session.

use std::fmt;
use std::sync::Arc;

use super::pager::{paginate, Page};
use super::tree::{parent_of, Entry, EntryKind, TreeIndex};
use crate::domain::RepoIdentity;

/// Navigation mode of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    AwaitingSearchKeyword,
    ShowingSearchResults { keyword: String },
}

/// Why an action did not apply to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    WrongMode,
    UnknownEntry,
    NoSuchPage,
    AtRoot,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejected::WrongMode => "action not available in the current mode",
            Rejected::UnknownEntry => "entry is not part of the current view",
            Rejected::NoSuchPage => "no page in that direction",
            Rejected::AtRoot => "already at the repository root",
        };
        f.write_str(reason)
    }
}

/// Result of submitting a search keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results are now shown
    Matches(usize),
    /// Nothing matched; the session went back to browsing unchanged
    NoMatches,
    /// Blank keyword; still waiting for a real one
    EmptyKeyword,
}

/// Navigation state of one chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    repo: RepoIdentity,
    tree: Arc<TreeIndex>,
    current_path: String,
    history: Vec<String>,
    visible: Vec<Entry>,
    page: usize,
    page_size: usize,
    mode: Mode,
}

impl Session {
    /// Start browsing `tree` at its root
    pub fn new(repo: RepoIdentity, tree: Arc<TreeIndex>, page_size: usize) -> Self {
        let visible = tree.children_of("");
        Self {
            repo,
            tree,
            current_path: String::new(),
            history: Vec::new(),
            visible,
            page: 0,
            page_size: page_size.max(1),
            mode: Mode::Browsing,
        }
    }

    pub fn repo(&self) -> &RepoIdentity {
        &self.repo
    }

    #[allow(dead_code)]
    pub fn tree(&self) -> &TreeIndex {
        &self.tree
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Directory a single `back` returns to
    #[allow(dead_code)]
    pub fn previous_path(&self) -> &str {
        match self.history.last() {
            Some(path) => path,
            None => parent_of(&self.current_path),
        }
    }

    pub fn visible_entries(&self) -> &[Entry] {
        &self.visible
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_at_root(&self) -> bool {
        self.current_path.is_empty()
    }

    /// The page of visible entries currently on screen
    pub fn current_page(&self) -> Page<'_, Entry> {
        paginate(&self.visible, self.page, self.page_size)
    }

    /// Descend into a directory listed in the current view
    pub fn enter_directory(&mut self, path: &str) -> Result<(), Rejected> {
        if self.mode != Mode::Browsing {
            return Err(Rejected::WrongMode);
        }
        if !self.visible.iter().any(|e| e.is_dir() && e.path == path) {
            return Err(Rejected::UnknownEntry);
        }

        let previous = std::mem::replace(&mut self.current_path, path.to_string());
        self.history.push(previous);
        self.show_current_directory();
        Ok(())
    }

    /// Return to the directory visited before the current one
    pub fn back(&mut self) -> Result<(), Rejected> {
        if self.mode != Mode::Browsing {
            return Err(Rejected::WrongMode);
        }
        if self.is_at_root() {
            return Err(Rejected::AtRoot);
        }

        self.current_path = match self.history.pop() {
            Some(path) => path,
            None => parent_of(&self.current_path).to_string(),
        };
        self.show_current_directory();
        Ok(())
    }

    pub fn next_page(&mut self) -> Result<(), Rejected> {
        if self.mode == Mode::AwaitingSearchKeyword {
            return Err(Rejected::WrongMode);
        }
        if !self.current_page().has_next {
            return Err(Rejected::NoSuchPage);
        }
        self.page += 1;
        Ok(())
    }

    pub fn prev_page(&mut self) -> Result<(), Rejected> {
        if self.mode == Mode::AwaitingSearchKeyword {
            return Err(Rejected::WrongMode);
        }
        if !self.current_page().has_prev {
            return Err(Rejected::NoSuchPage);
        }
        self.page -= 1;
        Ok(())
    }

    pub fn start_search(&mut self) -> Result<(), Rejected> {
        if self.mode != Mode::Browsing {
            return Err(Rejected::WrongMode);
        }
        self.mode = Mode::AwaitingSearchKeyword;
        Ok(())
    }

    /// Search every file of the snapshot for `keyword`.
    ///
    /// Zero matches leave `visible` and `page` as they were and return to browsing.
    pub fn submit_keyword(&mut self, keyword: &str) -> Result<SearchOutcome, Rejected> {
        if self.mode != Mode::AwaitingSearchKeyword {
            return Err(Rejected::WrongMode);
        }

        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(SearchOutcome::EmptyKeyword);
        }

        let matches = self.tree.search_files(keyword);
        if matches.is_empty() {
            self.mode = Mode::Browsing;
            return Ok(SearchOutcome::NoMatches);
        }

        let count = matches.len();
        self.visible = matches;
        self.page = 0;
        self.mode = Mode::ShowingSearchResults {
            keyword: keyword.to_string(),
        };
        Ok(SearchOutcome::Matches(count))
    }

    /// Leave search and show the current directory again
    pub fn cancel_search(&mut self) -> Result<(), Rejected> {
        if self.mode == Mode::Browsing {
            return Err(Rejected::WrongMode);
        }
        self.mode = Mode::Browsing;
        self.show_current_directory();
        Ok(())
    }

    /// Check that `path` names a file of this snapshot
    pub fn file_entry(&self, path: &str) -> Result<&Entry, Rejected> {
        match self.tree.find(path) {
            Some(entry) if entry.kind == EntryKind::File => Ok(entry),
            _ => Err(Rejected::UnknownEntry),
        }
    }

    fn show_current_directory(&mut self) {
        self.visible = self.tree.children_of(&self.current_path);
        self.page = 0;
    }
}
