//! Request-side types for the Sentry API

use serde::{Deserialize, Serialize};
use std::fmt;

/// A project given by numeric ID or slug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectRef {
    /// Numeric project ID
    Id(u64),
    /// Project slug
    Slug(String),
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Slug(slug) => write!(f, "{slug}"),
        }
    }
}

/// One or more projects to filter issues by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectSelector {
    /// A single project
    One(ProjectRef),
    /// Several projects; sent as repeated `project` keys
    Many(Vec<ProjectRef>),
}

impl ProjectSelector {
    /// Query values, one per project
    pub fn values(&self) -> Vec<String> {
        match self {
            Self::One(project) => vec![project.to_string()],
            Self::Many(projects) => projects.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Filters for the organization issue listing
///
/// Opaque to the pagination walker; captured by the page-fetch closure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilters {
    /// Sentry search query
    pub query: Option<String>,
    /// Environments, sent as repeated `environment` keys
    pub environments: Vec<String>,
    /// Relative period, e.g. `14d`
    pub stats_period: Option<String>,
    /// Absolute start
    pub since: Option<String>,
    /// Absolute end
    pub until: Option<String>,
    /// Project filter
    pub project: Option<ProjectSelector>,
}
