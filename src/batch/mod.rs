//! Batch module
//!
//! Bounded-concurrency fan-out over independently keyed work items.
//!
//! # Overview
//!
//! - [`WorkItem`] - one keyed unit of asynchronous work
//! - [`run_bounded`] - sliding-window executor with total failure isolation
//! - [`BatchResult`] - successes in input order, failures in observation order

mod executor;
mod types;

pub use executor::{run_bounded, run_bounded_with_cancel};
pub use types::{
    BatchOutcome, BatchResult, FailureDescriptor, WorkItem, DEFAULT_CONCURRENCY,
    MAX_BATCH_SIZE, MAX_CONCURRENCY,
};
