//! Response shaping module
//!
//! Turns raw Sentry payloads into the brief or full shapes handed to callers.
//! Timestamps are rendered in an explicitly passed timezone.

mod entities;
mod event;
mod time;

pub use entities::{
    map_issue, map_organization, map_project, MappedIssue, MappedOrganization, MappedProject,
};
pub use event::{format_frame, map_event, MappedEvent, MappedException};
pub use time::format_datetime;
