//! Sentry API module
//!
//! Typed access to the handful of Sentry REST endpoints this crate reads.
//!
//! # Overview
//!
//! - [`SentryApi`] - the read operations, as a trait so callers can swap the transport
//! - [`SentryClient`] - the HTTP implementation over [`crate::http::HttpClient`]
//! - [`IssueFilters`] - filters for the organization issue listing
//!
//! List operations return a [`crate::pagination::PageResult`] whose cursor
//! comes from the response `Link` header.

mod client;
mod types;

pub use client::{SentryApi, SentryClient};
pub use types::{IssueFilters, ProjectRef, ProjectSelector};

#[cfg(test)]
mod tests;
