//! Action tokens attached to keyboard buttons.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const ENTER_DIRECTORY: &str = "enter-directory:";
const FETCH_FILE: &str = "fetch-file:";
const PAGE_NEXT: &str = "page-next";
const PAGE_PREV: &str = "page-prev";
const BACK: &str = "back";
const START_SEARCH: &str = "start-search";
const CANCEL_SEARCH: &str = "cancel-search";

/// A user command encoded on a button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    EnterDirectory(String),
    FetchFile(String),
    PageNext,
    PagePrev,
    Back,
    StartSearch,
    CancelSearch,
}

impl Action {
    /// Wire form of the action, e.g. `fetch-file:src/main.rs`
    pub fn to_token(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::EnterDirectory(path) => write!(f, "{}{}", ENTER_DIRECTORY, path),
            Action::FetchFile(path) => write!(f, "{}{}", FETCH_FILE, path),
            Action::PageNext => f.write_str(PAGE_NEXT),
            Action::PagePrev => f.write_str(PAGE_PREV),
            Action::Back => f.write_str(BACK),
            Action::StartSearch => f.write_str(START_SEARCH),
            Action::CancelSearch => f.write_str(CANCEL_SEARCH),
        }
    }
}

/// Token that does not name a known action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action token: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if let Some(path) = token.strip_prefix(ENTER_DIRECTORY) {
            return Ok(Action::EnterDirectory(path.to_string()));
        }
        if let Some(path) = token.strip_prefix(FETCH_FILE) {
            return Ok(Action::FetchFile(path.to_string()));
        }
        match token {
            PAGE_NEXT => Ok(Action::PageNext),
            PAGE_PREV => Ok(Action::PagePrev),
            BACK => Ok(Action::Back),
            START_SEARCH => Ok(Action::StartSearch),
            CANCEL_SEARCH => Ok(Action::CancelSearch),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}
