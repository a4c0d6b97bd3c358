// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod issue;
pub mod page;
pub mod search_result;

pub use issue::{Comment, Issue, Project};
pub use page::{Label, Page, Space, SpaceRef};
pub use search_result::{RelatedResultSet, SearchPage};

use chrono::{DateTime, FixedOffset};

/// Parse the timestamp formats both services emit.
///
/// Confluence uses RFC 3339 (`2024-01-05T09:30:00.000Z`), Jira uses a
/// numeric offset without a colon (`2024-01-05T09:30:00.000+0000`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}
