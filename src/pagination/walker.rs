//! Cursor walker
//!
//! Follows a cursor-paginated listing page by page until a caller-supplied
//! item limit is met or the upstream runs out of data.

use super::types::{PageRequest, PageResult, WalkOptions, WalkResult, WalkState};
use crate::error::{Error, Result};
use std::future::Future;
use tracing::debug;

/// Walk a paginated listing with the default options
///
/// Without a `limit` exactly one page is fetched and its cursor is returned
/// unchanged. With a `limit` pages are requested sequentially, never asking
/// for more items than are still needed.
pub async fn walk<T, F, Fut>(
    fetch_page: F,
    first_cursor: Option<String>,
    items_per_page: usize,
    limit: Option<usize>,
) -> Result<WalkResult<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<PageResult<T>>>,
{
    walk_with(
        fetch_page,
        first_cursor,
        &WalkOptions::new(items_per_page, limit),
    )
    .await
}

/// Walk a paginated listing
///
/// The first failed page aborts the walk and its error is returned as-is.
pub async fn walk_with<T, F, Fut>(
    mut fetch_page: F,
    first_cursor: Option<String>,
    options: &WalkOptions,
) -> Result<WalkResult<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<PageResult<T>>>,
{
    if options.items_per_page == 0 {
        return Err(Error::config("items per page must be positive"));
    }
    if options.limit == Some(0) {
        return Err(Error::config("walk limit must be positive"));
    }

    let mut state = WalkState::new(first_cursor);

    let Some(limit) = options.limit else {
        ensure_not_cancelled(options)?;
        let request = PageRequest::new(state.cursor.take(), options.items_per_page);
        let page = fetch_page(request).await?;
        debug!(items = page.len(), "Fetched single page");
        state.absorb(page.items);
        state.finish(page.next_cursor);
        return Ok(state.into_result());
    };

    while !state.done {
        ensure_not_cancelled(options)?;

        let per_page = options.items_per_page.min(state.remaining(limit));
        let request = PageRequest::new(state.cursor.clone(), per_page);
        let page = fetch_page(request).await?;
        let page_len = page.len();

        debug!(
            page = state.pages + 1,
            requested = per_page,
            received = page_len,
            "Fetched page"
        );

        if page_len == 0 {
            state.finish(None);
            break;
        }

        state.absorb(page.items);

        if state.fetched >= limit || page.next_cursor.is_none() {
            state.finish(page.next_cursor);
        } else if options.stop_on_short_page && page_len < per_page {
            // Short page ends the walk even with a cursor present
            state.finish(page.next_cursor);
        } else {
            state.advance(page.next_cursor);
        }
    }

    debug!(
        items = state.fetched,
        pages = state.pages,
        "Walk complete"
    );
    Ok(state.into_result())
}

fn ensure_not_cancelled(options: &WalkOptions) -> Result<()> {
    match &options.cancel {
        Some(token) if token.is_cancelled() => Err(Error::Cancelled),
        _ => Ok(()),
    }
}
