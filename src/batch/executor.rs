//! Bounded fan-out executor
//!
//! Runs independent work items with at most `concurrency` of them in flight.
//! Admission is a sliding window: whenever an item settles, the next pending
//! item (in input order) is started.

use super::types::{BatchOutcome, BatchResult, FailureDescriptor, WorkItem};
use crate::error::{Error, Result};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Run every work item, keeping at most `concurrency` in flight
///
/// Resolves once every item has settled. Individual failures are recorded in
/// the result; only an empty item list or a zero ceiling is an error.
pub async fn run_bounded<T>(items: Vec<WorkItem<T>>, concurrency: usize) -> Result<BatchResult<T>>
where
    T: Send + 'static,
{
    run_bounded_with_cancel(items, concurrency, None).await
}

/// Like [`run_bounded`], but stops admitting new items once `cancel` fires
///
/// Items already in flight settle on their own. Items never admitted are
/// recorded as cancelled failures.
pub async fn run_bounded_with_cancel<T>(
    items: Vec<WorkItem<T>>,
    concurrency: usize,
    cancel: Option<&CancellationToken>,
) -> Result<BatchResult<T>>
where
    T: Send + 'static,
{
    if items.is_empty() {
        return Err(Error::config("batch requires at least one work item"));
    }
    if concurrency == 0 {
        return Err(Error::config("concurrency must be positive"));
    }

    let total = items.len();
    let slots = concurrency.min(total);
    let keys: Vec<String> = items.iter().map(|item| item.key().to_string()).collect();
    let permits = Arc::new(Semaphore::new(slots));

    let mut settled = vec![false; total];
    let mut outcomes = Vec::with_capacity(total);
    let mut running = JoinSet::new();
    let mut pending = items.into_iter().enumerate().peekable();

    debug!(total, slots, "Starting bounded fan-out");

    loop {
        // Admit pending items while slots are free
        while pending.peek().is_some() {
            if is_cancelled(cancel) {
                for (index, item) in pending.by_ref() {
                    warn!(id = %item.key(), "Work item cancelled before dispatch");
                    settled[index] = true;
                    outcomes.push(BatchOutcome::Failure {
                        index,
                        failure: FailureDescriptor::cancelled(item.key()),
                    });
                }
                break;
            }

            let Ok(permit) = Arc::clone(&permits).try_acquire_owned() else {
                break;
            };
            let Some((index, item)) = pending.next() else {
                break;
            };

            let (key, task) = item.into_parts();
            debug!(index, id = %key, "Admitting work item");
            running.spawn(async move {
                let result = AssertUnwindSafe(task)
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| Err(Error::Other("work item panicked".to_string())));
                drop(permit);
                (index, result)
            });
        }

        match running.join_next().await {
            Some(Ok((index, result))) => {
                let outcome = BatchOutcome::from_result(index, &keys[index], result);
                match &outcome {
                    BatchOutcome::Success { .. } => debug!(index, "Work item succeeded"),
                    BatchOutcome::Failure { failure, .. } => warn!(
                        id = %failure.id,
                        status = ?failure.status,
                        "Work item failed: {}",
                        failure.message
                    ),
                }
                settled[index] = true;
                outcomes.push(outcome);
            }
            Some(Err(e)) => warn!("Work item task did not complete: {e}"),
            None => break,
        }
    }

    // Anything still unsettled was lost with its task
    for (index, done) in settled.iter().enumerate() {
        if !done {
            outcomes.push(BatchOutcome::Failure {
                index,
                failure: FailureDescriptor::new(&keys[index], None, "work item did not complete"),
            });
        }
    }

    let result = BatchResult::from_outcomes(total, outcomes);
    debug!(
        succeeded = result.count,
        failed = result.failed.len(),
        "Bounded fan-out complete"
    );
    Ok(result)
}

fn is_cancelled(cancel: Option<&CancellationToken>) -> bool {
    cancel.is_some_and(CancellationToken::is_cancelled)
}
