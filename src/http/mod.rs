//! HTTP client module
//!
//! Provides the HTTP transport for the Sentry API.
//!
//! # Features
//!
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Cancellation**: In-flight requests observe a `CancellationToken`
//! - **Authentication**: Bearer token on every request
//!
//! There are no transport-level retries; a failed request is reported once.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, HttpResponse, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
