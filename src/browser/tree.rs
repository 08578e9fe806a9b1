//! Tree index over a flat repository listing.
//!
//! GitHub's recursive tree endpoint returns every path of a revision in one
//! flat list. `TreeIndex` keeps that list untouched and builds a
//! parent-path -> children map once, so drilling into directories does not
//! rescan the whole snapshot.

use std::collections::HashMap;

/// Kind of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One node of the flat tree listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    pub kind: EntryKind,
}

impl Entry {
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Final path segment, used as the display label
    pub fn name(&self) -> &str {
        base_name(&self.path)
    }
}

/// Final segment of a slash-delimited path
pub fn base_name(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((_, name)) => name,
        None => path,
    }
}

/// Parent directory of a path; "" for top-level paths and the root itself
pub fn parent_of(path: &str) -> &str {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    }
}

/// Immutable snapshot of one repository revision with a children index
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TreeIndex {
    entries: Vec<Entry>,
    children: HashMap<String, Vec<usize>>,
}

impl TreeIndex {
    pub fn new(entries: Vec<Entry>) -> Self {
        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            children
                .entry(parent_of(&entry.path).to_string())
                .or_default()
                .push(idx);
        }

        Self { entries, children }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with exactly this path
    pub fn find(&self, path: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Direct children of `path` in snapshot order.
    ///
    /// Unknown paths (and files) have no children and yield an empty list.
    pub fn children_of(&self, path: &str) -> Vec<Entry> {
        let key = path.trim_end_matches('/');
        self.children
            .get(key)
            .map(|indices| indices.iter().map(|&i| self.entries[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Files anywhere in the snapshot whose path contains `keyword`, ignoring case
    pub fn search_files(&self, keyword: &str) -> Vec<Entry> {
        let needle = keyword.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::File && e.path.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}
