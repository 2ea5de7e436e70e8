//! Event shaping

use super::entities::string_field;
use crate::types::{Detail, JsonValue};
use serde::{Deserialize, Serialize};

/// One exception of an event, with its stack rendered as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedException {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,
    pub frames: Vec<String>,
}

/// Event as returned to callers
///
/// Brief output carries `exceptions`, full output carries `raw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedEvent {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culprit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<Vec<MappedException>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<JsonValue>,
}

/// Shape an event payload
pub fn map_event(event: &JsonValue, detail: Detail) -> MappedEvent {
    let mut mapped = MappedEvent {
        id: string_field(event, "id").unwrap_or_default(),
        title: string_field(event, "title")
            .or_else(|| string_field(event, "message"))
            .unwrap_or_default(),
        level: string_field(event, "level"),
        culprit: string_field(event, "culprit"),
        environment: string_field(event, "environment"),
        timestamp: string_field(event, "dateCreated").or_else(|| string_field(event, "timestamp")),
        url: string_field(event, "permalink"),
        exceptions: None,
        raw: None,
    };

    match detail {
        Detail::Brief => mapped.exceptions = Some(exceptions(event)),
        Detail::Full => mapped.raw = Some(event.clone()),
    }
    mapped
}

fn exceptions(event: &JsonValue) -> Vec<MappedException> {
    let Some(entries) = event["entries"].as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| entry["type"] == "exception")
        .filter_map(|entry| entry["data"]["values"].as_array())
        .flatten()
        .map(|value| MappedException {
            kind: string_field(value, "type"),
            value: string_field(value, "value"),
            mechanism: string_field(&value["mechanism"], "type"),
            frames: value["stacktrace"]["frames"]
                .as_array()
                .map(|frames| frames.iter().map(format_frame).collect())
                .unwrap_or_default(),
        })
        .collect()
}

/// Render a stack frame as `function (file:line:col)`
///
/// Missing parts fall back to `<anonymous>` and `<unknown>`; line and column
/// are omitted when absent.
pub fn format_frame(frame: &JsonValue) -> String {
    let function = ["function", "fn"]
        .iter()
        .find_map(|key| frame[*key].as_str())
        .unwrap_or("<anonymous>");
    let file = ["filename", "absPath", "module"]
        .iter()
        .find_map(|key| frame[*key].as_str())
        .unwrap_or("<unknown>");

    let mut location = file.to_string();
    for key in ["lineno", "colno"] {
        if let Some(n) = frame[key].as_i64() {
            location.push_str(&format!(":{n}"));
        }
    }

    format!("{function} ({location})")
}
