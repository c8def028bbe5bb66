//! Cursor arithmetic for incremental loading
//!
//! A [`Cursor`] counts how many ids of a snapshot have already been resolved
//! and handed to the consumer. It only moves forward, and only by the size of
//! a page that resolved completely.

use serde::Serialize;
use std::ops::Range;

/// Error type for pagination operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

/// Offset into a snapshot's id list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Cursor(usize);

impl Cursor {
    pub fn new(offset: usize) -> Self {
        Cursor(offset)
    }

    pub fn start() -> Self {
        Cursor(0)
    }

    pub fn offset(self) -> usize {
        self.0
    }

    pub fn advance(self, by: usize) -> Self {
        Cursor(self.0.saturating_add(by))
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calculate the slice of a snapshot served by one page
///
/// Returns `start..end` for slicing the ids array. A cursor at or past the
/// end yields an empty range, which is how callers detect the last page.
pub fn page_bounds(
    total_items: usize,
    cursor: Cursor,
    page_size: usize,
) -> Result<Range<usize>, PaginationError> {
    if page_size == 0 {
        return Err(PaginationError::ZeroPageSize);
    }

    let start = cursor.offset().min(total_items);
    let end = cursor.offset().saturating_add(page_size).min(total_items);
    Ok(start..end)
}

/// Cursor where the 1-indexed `page` of size `limit` starts
pub fn cursor_for_page(page: usize, limit: usize) -> Cursor {
    Cursor(page.saturating_sub(1).saturating_mul(limit))
}

/// 1-indexed page number a cursor falls on
pub fn page_number(cursor: Cursor, limit: usize) -> usize {
    if limit == 0 {
        return 1;
    }
    cursor.offset() / limit + 1
}

pub fn total_pages(total_items: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    total_items.div_ceil(limit)
}

/// One batch of resolved records, in snapshot order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor the page was requested at
    pub start: Cursor,
    /// Cursor of the page after this one
    pub next: Cursor,
}

impl<T> Page<T> {
    /// The terminal page: nothing left at `at`
    pub fn empty(at: Cursor) -> Self {
        Self {
            items: Vec::new(),
            start: at,
            next: at,
        }
    }

    pub fn new(start: Cursor, items: Vec<T>) -> Self {
        let next = start.advance(items.len());
        Self { items, start, next }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
