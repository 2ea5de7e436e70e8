//! Runtime configuration
//!
//! Loaded once from the process environment and passed down explicitly.
//!
//! | Variable                        | Default         |
//! |---------------------------------|-----------------|
//! | `SENTRY_URL`                    | required        |
//! | `SENTRY_TOKEN`                  | required        |
//! | `SENTRY_TIMEZONE`               | `Europe/Moscow` |
//! | `SENTRY_HTTP_TIMEOUT_MS`        | `10000`         |
//! | `SENTRY_READ_ONLY`              | `true`          |
//! | `SENTRY_USE_STRUCTURED_CONTENT` | `false`         |
//! | `SENTRY_RATE_LIMIT_RPS`         | `20`            |

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use chrono_tz::Tz;
use std::fmt;
use std::time::Duration;
use url::Url;

pub const ENV_URL: &str = "SENTRY_URL";
pub const ENV_TOKEN: &str = "SENTRY_TOKEN";
pub const ENV_TIMEZONE: &str = "SENTRY_TIMEZONE";
pub const ENV_HTTP_TIMEOUT_MS: &str = "SENTRY_HTTP_TIMEOUT_MS";
pub const ENV_READ_ONLY: &str = "SENTRY_READ_ONLY";
pub const ENV_USE_STRUCTURED_CONTENT: &str = "SENTRY_USE_STRUCTURED_CONTENT";
pub const ENV_RATE_LIMIT_RPS: &str = "SENTRY_RATE_LIMIT_RPS";

/// Timezone used when none is configured
pub const DEFAULT_TIMEZONE: Tz = Tz::Europe__Moscow;

/// Request timeout used when none is configured
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// Largest accepted request timeout
pub const MAX_HTTP_TIMEOUT_MS: u64 = 60_000;

/// Request rate used when none is configured
pub const DEFAULT_RATE_LIMIT_RPS: u32 = 20;

const MIN_TOKEN_LEN: usize = 10;

const INVALID_PREFIX: &str = "Invalid Sentry environment configuration";

/// Validated runtime configuration
#[derive(Clone)]
pub struct Config {
    /// Base URL of the Sentry instance
    pub sentry_url: Url,
    /// API token
    pub token: String,
    /// Timezone for rendered timestamps
    pub timezone: Tz,
    /// Per-request timeout
    pub http_timeout: Duration,
    /// Only read operations are exposed
    pub read_only: bool,
    /// Callers prefer structured tool output
    pub use_structured_content: bool,
    /// Upstream request budget
    pub rate_limit_rps: u32,
}

impl Config {
    /// Create a config with defaults for everything but URL and token
    pub fn new(sentry_url: Url, token: impl Into<String>) -> Self {
        Self {
            sentry_url,
            token: token.into(),
            timezone: DEFAULT_TIMEZONE,
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            read_only: true,
            use_structured_content: false,
            rate_limit_rps: DEFAULT_RATE_LIMIT_RPS,
        }
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(ENV_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::missing_field(ENV_URL))?;
        let sentry_url = Url::parse(raw_url.trim())
            .map_err(|e| invalid(ENV_URL, format!("must be a valid URL ({e})")))?;
        if !matches!(sentry_url.scheme(), "http" | "https") {
            return Err(invalid(ENV_URL, "must use http or https"));
        }

        let token = lookup(ENV_TOKEN)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::missing_field(ENV_TOKEN))?;
        if token.chars().count() < MIN_TOKEN_LEN {
            return Err(invalid(ENV_TOKEN, "looks too short"));
        }

        let mut config = Self::new(sentry_url, token);

        if let Some(raw) = lookup(ENV_TIMEZONE).filter(|v| !v.trim().is_empty()) {
            config.timezone = raw
                .trim()
                .parse::<Tz>()
                .map_err(|_| invalid(ENV_TIMEZONE, format!("unknown timezone '{raw}'")))?;
        }

        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_MS) {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|_| invalid(ENV_HTTP_TIMEOUT_MS, "must be an integer"))?;
            if ms == 0 || ms > MAX_HTTP_TIMEOUT_MS {
                return Err(invalid(
                    ENV_HTTP_TIMEOUT_MS,
                    format!("must be between 1 and {MAX_HTTP_TIMEOUT_MS}"),
                ));
            }
            config.http_timeout = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup(ENV_READ_ONLY) {
            config.read_only = raw.trim() != "false";
        }

        if let Some(raw) = lookup(ENV_USE_STRUCTURED_CONTENT) {
            config.use_structured_content = parse_flag(&raw);
        }

        if let Some(raw) = lookup(ENV_RATE_LIMIT_RPS) {
            config.rate_limit_rps = raw
                .trim()
                .parse()
                .ok()
                .filter(|rps| *rps > 0)
                .ok_or_else(|| invalid(ENV_RATE_LIMIT_RPS, "must be a positive integer"))?;
        }

        Ok(config)
    }

    /// Transport settings derived from this config
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(self.sentry_url.as_str())
            .timeout(self.http_timeout)
            .bearer_token(self.token.clone())
            .rate_limit(RateLimiterConfig::per_second(self.rate_limit_rps))
            .build()
    }

    /// Check if a token is configured
    pub fn token_present(&self) -> bool {
        !self.token.is_empty()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("sentry_url", &self.sentry_url.as_str())
            .field("token", &"<redacted>")
            .field("timezone", &self.timezone.name())
            .field("http_timeout", &self.http_timeout)
            .field("read_only", &self.read_only)
            .field("use_structured_content", &self.use_structured_content)
            .field("rate_limit_rps", &self.rate_limit_rps)
            .finish()
    }
}

fn invalid(field: &str, message: impl fmt::Display) -> Error {
    Error::invalid_config(field, format!("{INVALID_PREFIX}: {message}"))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
