//! Batch types
//!
//! Work items, per-item outcomes and the aggregate result of a fan-out.

use crate::error::{Error, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Concurrency ceiling used when a caller does not ask for one
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Largest concurrency ceiling a caller may request
pub const MAX_CONCURRENCY: usize = 10;

/// Largest number of identifiers accepted by one batch
pub const MAX_BATCH_SIZE: usize = 50;

/// One unit of work in a fan-out
///
/// Its index is its position in the list handed to the executor. The task is
/// not polled until the executor admits the item.
pub struct WorkItem<T> {
    key: String,
    task: BoxFuture<'static, Result<T>>,
}

impl<T> WorkItem<T> {
    /// Create a work item identified by `key`
    pub fn new<F>(key: impl Into<String>, task: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            key: key.into(),
            task: Box::pin(task),
        }
    }

    /// Identifying key reported on failure
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn into_parts(self) -> (String, BoxFuture<'static, Result<T>>) {
        (self.key, self.task)
    }
}

impl<T> fmt::Debug for WorkItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Why a work item did not produce a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDescriptor {
    /// Key of the failed work item (e.g. the issue ID)
    pub id: String,
    /// HTTP status, present only if the upstream answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Human-readable reason
    pub message: String,
}

impl FailureDescriptor {
    /// Create a failure descriptor
    pub fn new(id: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status,
            message: message.into(),
        }
    }

    /// Describe `error` as the failure of work item `id`
    pub fn from_error(id: impl Into<String>, error: &Error) -> Self {
        Self::new(id, error.status(), error.to_string())
    }

    /// Failure for an item that was never dispatched because of cancellation
    pub fn cancelled(id: impl Into<String>) -> Self {
        Self::from_error(id, &Error::Cancelled)
    }
}

/// Outcome of a single work item
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome<T> {
    /// The item produced a value
    Success {
        /// Position in the input list
        index: usize,
        /// Produced value
        value: T,
    },
    /// The item failed
    Failure {
        /// Position in the input list
        index: usize,
        /// Why it failed
        failure: FailureDescriptor,
    },
}

impl<T> BatchOutcome<T> {
    /// Build an outcome from a work item's result
    pub fn from_result(index: usize, key: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Success { index, value },
            Err(e) => Self::Failure {
                index,
                failure: FailureDescriptor::from_error(key, &e),
            },
        }
    }

    /// Position in the input list
    pub fn index(&self) -> usize {
        match self {
            Self::Success { index, .. } | Self::Failure { index, .. } => *index,
        }
    }

    /// Check if this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Aggregate result of a fan-out
///
/// `items` are in input order, `failed` in the order failures were observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult<T> {
    /// Successful values in input order
    pub items: Vec<T>,
    /// Failures in observation order
    pub failed: Vec<FailureDescriptor>,
    /// Number of successes
    pub count: usize,
}

impl<T> BatchResult<T> {
    /// Assemble the aggregate from outcomes listed in observation order
    ///
    /// Every index in `0..total` must appear exactly once.
    pub fn from_outcomes(total: usize, outcomes: impl IntoIterator<Item = BatchOutcome<T>>) -> Self {
        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
        let mut failed = Vec::new();

        for outcome in outcomes {
            match outcome {
                BatchOutcome::Success { index, value } => slots[index] = Some(value),
                BatchOutcome::Failure { failure, .. } => failed.push(failure),
            }
        }

        let items: Vec<T> = slots.into_iter().flatten().collect();
        Self {
            count: items.len(),
            items,
            failed,
        }
    }

    /// Total number of work items accounted for
    pub fn total(&self) -> usize {
        self.items.len() + self.failed.len()
    }

    /// Check if every work item succeeded
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Transform every successful value, keeping order
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> BatchResult<U> {
        BatchResult {
            items: self.items.into_iter().map(f).collect(),
            failed: self.failed,
            count: self.count,
        }
    }
}
