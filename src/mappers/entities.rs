//! Organization, project and issue shaping

use super::time::format_datetime;
use crate::error::{Error, Result};
use crate::types::{Detail, JsonValue};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Organization as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedOrganization {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
}

/// Project as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedProject {
    /// Numeric or string ID, kept as the upstream sent it
    pub id: JsonValue,
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_bookmarked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_internal: Option<bool>,
    /// `null` in full output when the project has no platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
}

/// Issue as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedIssue {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culprit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<String>,
}

/// Shape an organization payload
pub fn map_organization(org: &JsonValue, detail: Detail, tz: Tz) -> MappedOrganization {
    let mut mapped = MappedOrganization {
        id: text(org, "id"),
        slug: text(org, "slug"),
        name: text(org, "name"),
        status: None,
        date_created: None,
    };

    if detail.is_brief() {
        return mapped;
    }

    let status = &org["status"];
    mapped.status = string_field(status, "name").or_else(|| string_field(status, "id"));
    mapped.date_created = format_datetime(org["dateCreated"].as_str(), tz);
    mapped
}

/// Shape a project payload
pub fn map_project(project: &JsonValue, detail: Detail, tz: Tz) -> MappedProject {
    let mut mapped = MappedProject {
        id: project["id"].clone(),
        slug: text(project, "slug"),
        name: text(project, "name"),
        is_bookmarked: None,
        is_public: None,
        is_internal: None,
        platform: None,
        date_created: None,
    };

    if detail.is_brief() {
        return mapped;
    }

    mapped.is_bookmarked = Some(flag(project, "isBookmarked"));
    mapped.is_public = Some(flag(project, "isPublic"));
    mapped.is_internal = Some(flag(project, "isInternal"));
    mapped.platform = Some(
        string_field(project, "platform").map_or(JsonValue::Null, JsonValue::String),
    );
    mapped.date_created = format_datetime(project["dateCreated"].as_str(), tz);
    mapped
}

/// Shape an issue payload
///
/// Fails when the payload carries no `id`, since the issue could not be
/// referred to afterwards.
pub fn map_issue(issue: &JsonValue, detail: Detail, tz: Tz) -> Result<MappedIssue> {
    let id = scalar(&issue["id"])
        .ok_or_else(|| Error::decode("issue payload has no id"))?;

    let mut mapped = MappedIssue {
        id,
        short_id: string_field(issue, "shortId"),
        title: text(issue, "title"),
        status: string_field(issue, "status"),
        last_seen: format_datetime(issue["lastSeen"].as_str(), tz),
        permalink: string_field(issue, "permalink"),
        culprit: None,
        level: None,
        is_public: None,
        assigned_to: None,
        user_count: None,
        count: None,
        first_seen: None,
    };

    if detail.is_brief() {
        return Ok(mapped);
    }

    mapped.culprit = string_field(issue, "culprit");
    mapped.level = string_field(issue, "level");
    mapped.is_public = Some(flag(issue, "isPublic"));
    mapped.assigned_to = Some(issue["assignedTo"].clone()).filter(|v| !v.is_null());
    mapped.user_count = issue["userCount"].as_u64();
    mapped.count = scalar(&issue["count"]);
    mapped.first_seen = format_datetime(issue["firstSeen"].as_str(), tz);
    Ok(mapped)
}

/// String or number rendered as text
fn scalar(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(value: &JsonValue, key: &str) -> String {
    scalar(&value[key]).unwrap_or_default()
}

pub(super) fn string_field(value: &JsonValue, key: &str) -> Option<String> {
    value[key].as_str().map(str::to_string)
}

fn flag(value: &JsonValue, key: &str) -> bool {
    value[key].as_bool().unwrap_or(false)
}
