//! Pagination types
//!
//! Page requests, page results and the transient state of one cursor walk.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Page size used when a caller does not ask for one
pub const DEFAULT_PER_PAGE: usize = 50;

/// Parameters for fetching a single page
///
/// Domain filters are not part of the request: they are captured by the
/// page-fetch closure and stay opaque to the walker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageRequest {
    /// Server-issued continuation token, forwarded verbatim
    pub cursor: Option<String>,
    /// Number of items requested for this page
    pub per_page: usize,
}

impl PageRequest {
    /// Create a page request
    pub fn new(cursor: Option<String>, per_page: usize) -> Self {
        Self { cursor, per_page }
    }

    /// Request the first page with the default page size
    pub fn first() -> Self {
        Self::new(None, DEFAULT_PER_PAGE)
    }
}

/// One page returned by the upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Cursor of the following page; `None` when there is none
    pub next_cursor: Option<String>,
}

impl<T> PageResult<T> {
    /// Create a page result
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }

    /// A page with no items and no continuation
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    /// Number of items in the page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transform every item, keeping order and cursor
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

/// Options controlling a cursor walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Upper bound on items per page request
    pub items_per_page: usize,
    /// Total item limit; `None` fetches a single page
    pub limit: Option<usize>,
    /// Treat a page shorter than requested as the end of data
    pub stop_on_short_page: bool,
    /// Checked before each page request
    pub cancel: Option<CancellationToken>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_PER_PAGE,
            limit: None,
            stop_on_short_page: true,
            cancel: None,
        }
    }
}

impl WalkOptions {
    /// Create options for the given page size and limit
    pub fn new(items_per_page: usize, limit: Option<usize>) -> Self {
        Self {
            items_per_page,
            limit,
            ..Default::default()
        }
    }

    /// Keep walking after a short page as long as a cursor is returned
    #[must_use]
    pub fn with_stop_on_short_page(mut self, stop: bool) -> Self {
        self.stop_on_short_page = stop;
        self
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Final output of a walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkResult<T> {
    /// Accumulated items in server order
    pub items: Vec<T>,
    /// Where a later walk may resume
    pub next_cursor: Option<String>,
    /// Number of page requests made
    pub pages: usize,
}

/// Tracks one walk while it runs
#[derive(Debug)]
pub struct WalkState<T> {
    /// Items accumulated so far
    pub items: Vec<T>,
    /// Cursor for the next request
    pub cursor: Option<String>,
    /// Items fetched so far
    pub fetched: usize,
    /// Pages fetched so far
    pub pages: usize,
    /// Cursor reported to the caller once the walk ends
    pub final_cursor: Option<String>,
    /// Is the walk complete?
    pub done: bool,
}

impl<T> WalkState<T> {
    /// Start a walk at the given cursor
    pub fn new(cursor: Option<String>) -> Self {
        Self {
            items: Vec::new(),
            cursor,
            fetched: 0,
            pages: 0,
            final_cursor: None,
            done: false,
        }
    }

    /// Append a page's items in order
    pub fn absorb(&mut self, items: Vec<T>) {
        self.fetched += items.len();
        self.pages += 1;
        self.items.extend(items);
    }

    /// Items still needed to satisfy `limit`
    pub fn remaining(&self, limit: usize) -> usize {
        limit.saturating_sub(self.fetched)
    }

    /// Finish the walk, reporting `cursor` as the continuation point
    pub fn finish(&mut self, cursor: Option<String>) {
        self.final_cursor = cursor;
        self.done = true;
    }

    /// Move on to the next page
    pub fn advance(&mut self, cursor: Option<String>) {
        self.cursor = cursor;
    }

    /// Consume the state into the walk output
    pub fn into_result(self) -> WalkResult<T> {
        WalkResult {
            items: self.items,
            next_cursor: self.final_cursor,
            pages: self.pages,
        }
    }
}
