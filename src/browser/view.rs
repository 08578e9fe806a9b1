//! Keyboard rendering.
//!
//! Rendering is a pure function of the session: it never mutates state and
//! the result is rebuilt on every transition.

use super::action::Action;
use super::pager::{page_count, paginate};
use super::session::{Mode, Session};
use super::tree::{Entry, EntryKind};

/// A single keyboard button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }

    pub fn token(&self) -> String {
        self.action.to_token()
    }
}

/// Message text plus keyboard rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDescriptor {
    pub title: String,
    pub rows: Vec<Vec<Button>>,
}

#[allow(dead_code)]
impl ViewDescriptor {
    /// Trailing navigation row
    pub fn controls(&self) -> &[Button] {
        self.rows.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entry rows, without the trailing control row
    pub fn entry_buttons(&self) -> impl Iterator<Item = &Button> {
        let entry_rows = self.rows.len().saturating_sub(1);
        self.rows[..entry_rows].iter().flatten()
    }

    pub fn has_control(&self, action: &Action) -> bool {
        self.controls().iter().any(|b| &b.action == action)
    }
}

/// Mode-dependent switches for `render_entries`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFlags {
    /// Entry rows and paging are hidden while a keyword is awaited
    pub show_entries: bool,
    pub show_back: bool,
    pub searching: bool,
}

/// Render one page of `entries` with a single trailing control row
pub fn render_entries(
    title: String,
    entries: &[Entry],
    page_index: usize,
    page_size: usize,
    flags: ViewFlags,
) -> ViewDescriptor {
    let mut rows = Vec::new();
    let mut controls = Vec::new();

    if flags.show_entries {
        let page = paginate(entries, page_index, page_size);
        for entry in page.items {
            let action = match entry.kind {
                EntryKind::Directory => Action::EnterDirectory(entry.path.clone()),
                EntryKind::File => Action::FetchFile(entry.path.clone()),
            };
            rows.push(vec![Button::new(entry.name(), action)]);
        }
        if page.has_prev {
            controls.push(Button::new("« Prev", Action::PagePrev));
        }
        if page.has_next {
            controls.push(Button::new("Next »", Action::PageNext));
        }
    }

    if flags.show_back {
        controls.push(Button::new("Back", Action::Back));
    }
    if flags.searching {
        controls.push(Button::new("Cancel search", Action::CancelSearch));
    } else {
        controls.push(Button::new("Search", Action::StartSearch));
    }
    rows.push(controls);

    ViewDescriptor { title, rows }
}

/// Render the keyboard for the session's current state
pub fn render(session: &Session) -> ViewDescriptor {
    let flags = ViewFlags {
        show_entries: session.mode() != &Mode::AwaitingSearchKeyword,
        show_back: session.mode() == &Mode::Browsing && !session.is_at_root(),
        searching: session.mode() != &Mode::Browsing,
    };

    render_entries(
        title_for(session),
        session.visible_entries(),
        session.page(),
        session.page_size(),
        flags,
    )
}

fn title_for(session: &Session) -> String {
    let repo = session.repo();
    let header = format!("📦 {} @ {}", repo.full_name(), repo.revision.branch);
    let pages = page_count(session.visible_entries().len(), session.page_size());
    let position = format!("Page {}/{}", session.page() + 1, pages);

    match session.mode() {
        Mode::Browsing => {
            let location = if session.is_at_root() {
                "/".to_string()
            } else {
                format!("/{}", session.current_path())
            };
            if session.visible_entries().is_empty() {
                format!("{}\n📂 {}\n(empty directory)", header, location)
            } else {
                format!("{}\n📂 {}\n{}", header, location, position)
            }
        }
        Mode::AwaitingSearchKeyword => {
            format!("{}\n🔍 Send a keyword to search file paths", header)
        }
        Mode::ShowingSearchResults { keyword } => format!(
            "{}\n🔍 {} file(s) matching \"{}\"\n{}",
            header,
            session.visible_entries().len(),
            keyword,
            position
        ),
    }
}
