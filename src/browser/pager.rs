//! Fixed-size pagination over an entry list.

/// Default number of entries shown per keyboard page
pub const DEFAULT_PAGE_SIZE: usize = 8;

/// One page of a slice plus the navigation controls it allows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub index: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Slice `entries` into page `index` of `page_size` items.
///
/// An index past the end yields an empty slice; a zero page size is treated as 1.
pub fn paginate<T>(entries: &[T], index: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let start = index.saturating_mul(page_size).min(entries.len());
    let end = start.saturating_add(page_size).min(entries.len());

    Page {
        items: &entries[start..end],
        index,
        has_prev: index > 0,
        has_next: (index.saturating_add(1)).saturating_mul(page_size) < entries.len(),
    }
}

/// Number of pages needed for `len` entries; an empty list still has one page
pub fn page_count(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}
