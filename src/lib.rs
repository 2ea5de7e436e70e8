// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # sentry-fetch
//!
//! Rate-limited, read-only access to the Sentry issue-tracking API, built
//! around two retrieval primitives.
//!
//! ## Features
//!
//! - **Cursor Walker**: follows `Link`-header cursors page by page until an
//!   item limit is met, never requesting more than is still needed
//! - **Bounded Fan-Out**: runs many keyed requests with a concurrency ceiling,
//!   isolating every failure and keeping successes in input order
//! - **Response Shaping**: brief or full views of issues, events, projects and
//!   organizations with timestamps rendered in a configured timezone
//! - **CLI and HTTP server**: every tool is reachable from both
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sentry_fetch::{config::Config, tools::{self, ToolContext}};
//!
//! #[tokio::main]
//! async fn main() -> sentry_fetch::Result<()> {
//!     let ctx = ToolContext::from_config(Config::from_env()?)?;
//!
//!     let args = serde_json::json!({ "issueIds": ["123", "456"], "concurrency": 2 });
//!     let batch = tools::dispatch(&ctx, tools::ISSUES_DETAILS_BATCH, args, None).await?;
//!     println!("{batch}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │            CLI (clap)  /  HTTP server (axum)                 │
//! └──────────────────────────────┬───────────────────────────────┘
//!                        tools::dispatch
//! ┌──────────────┬───────────────┴──────────────┬────────────────┐
//! │  Pagination  │            Batch             │    Mappers     │
//! │  walk()      │  run_bounded()               │  brief / full  │
//! └──────┬───────┴──────────────┬───────────────┴────────────────┘
//!        └────────── SentryApi (SentryClient) ──────────┘
//!                               │
//!             HttpClient (reqwest + governor + cancel)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Add docs before 1.0 release

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with rate limiting and cancellation
pub mod http;

/// Cursor walking over paginated listings
pub mod pagination;

/// Bounded-concurrency fan-out
pub mod batch;

/// Sentry API client
pub mod sentry;

/// Response shaping
pub mod mappers;

/// Runtime configuration
pub mod config;

/// Caller-facing operations
pub mod tools;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use batch::{run_bounded, BatchResult, FailureDescriptor, WorkItem};
pub use pagination::{extract_next_cursor, walk, PageRequest, PageResult, WalkResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
