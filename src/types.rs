//! Common types used throughout sentry-fetch
//!
//! Shared type aliases and small value types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Ordered query parameters; keys may repeat
pub type QueryPairs = Vec<(String, String)>;

// ============================================================================
// Output Shaping
// ============================================================================

/// How much of an upstream payload a caller wants back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detail {
    /// Key fields only
    #[default]
    Brief,
    /// Every mapped field
    Full,
}

impl Detail {
    /// Build from the `briefOutput` flag; absent means brief
    pub fn from_brief_flag(brief: Option<bool>) -> Self {
        if brief == Some(false) {
            Self::Full
        } else {
            Self::Brief
        }
    }

    /// Check if this is the brief shape
    pub fn is_brief(self) -> bool {
        matches!(self, Self::Brief)
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Brief => write!(f, "brief"),
            Self::Full => write!(f, "full"),
        }
    }
}
