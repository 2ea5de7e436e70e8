//! Pagination module
//!
//! Cursor-based pagination over Sentry list endpoints.
//!
//! # Overview
//!
//! - [`walk`] / [`walk_with`] follow cursors until a limit or the end of data
//! - [`extract_next_cursor`] reads the continuation cursor from a `Link` header
//!
//! The walker only knows about a page-fetch closure; endpoint details and
//! filters live in the closure.

mod cursor;
mod types;
mod walker;

pub use cursor::{extract_next_cursor, LINK_HEADER};
pub use types::{
    PageRequest, PageResult, WalkOptions, WalkResult, WalkState, DEFAULT_PER_PAGE,
};
pub use walker::{walk, walk_with};
