// file: src/models/issue.rs
// description: Jira issue, project and comment models
// reference: https://developer.atlassian.com/cloud/jira/platform/rest/v2/api-group-issues/

use super::parse_timestamp;
use crate::query::SourceItem;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const CUSTOM_FIELD_PREFIX: &str = "customfield_";

/// Typed core of an issue. Instance-specific `customfield_*` entries are kept
/// in `custom_fields` as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub id: String,
    pub key: String,
    pub summary: String,
    pub status: Option<String>,
    pub issue_type: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub project_key: Option<String>,
    pub project_name: Option<String>,
    pub labels: Vec<String>,
    pub description: Option<String>,
    pub created: Option<DateTime<FixedOffset>>,
    pub updated: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, Value>,
}

impl Issue {
    pub fn to_source_item(&self) -> SourceItem {
        SourceItem {
            identifier: self.key.clone(),
            text: self.summary.clone(),
            labels: self.labels.clone(),
            scope: self.project_key.clone(),
        }
    }

    pub(crate) fn from_raw(raw: RawIssue) -> Self {
        let fields = raw.fields;

        let text = |name: &str| fields.get(name).and_then(Value::as_str).map(str::to_string);
        let nested = |name: &str, inner: &str| {
            fields
                .get(name)
                .and_then(|v| v.get(inner))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let labels = fields
            .get("labels")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let custom_fields = fields
            .iter()
            .filter(|(name, value)| name.starts_with(CUSTOM_FIELD_PREFIX) && !value.is_null())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Self {
            id: raw.id,
            key: raw.key,
            summary: text("summary").unwrap_or_default(),
            status: nested("status", "name"),
            issue_type: nested("issuetype", "name"),
            priority: nested("priority", "name"),
            assignee: nested("assignee", "displayName"),
            reporter: nested("reporter", "displayName"),
            project_key: nested("project", "key"),
            project_name: nested("project", "name"),
            labels,
            description: text("description"),
            created: text("created").as_deref().and_then(parse_timestamp),
            updated: text("updated").as_deref().and_then(parse_timestamp),
            custom_fields,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub author: Option<String>,
    pub body: String,
    pub created: Option<DateTime<FixedOffset>>,
    pub updated: Option<DateTime<FixedOffset>>,
}

impl Comment {
    pub(crate) fn from_raw(raw: RawComment) -> Self {
        Self {
            id: raw.id,
            author: raw.author.and_then(|a| a.display_name),
            body: raw.body.as_str().map(str::to_string).unwrap_or_default(),
            created: raw.created.as_deref().and_then(parse_timestamp),
            updated: raw.updated.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawIssue {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawIssueSearch {
    #[serde(default)]
    pub start_at: usize,
    #[serde(default)]
    pub max_results: usize,
    pub total: Option<usize>,
    #[serde(default)]
    pub issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCommentPage {
    #[serde(default)]
    pub start_at: usize,
    #[serde(default)]
    pub max_results: usize,
    pub total: Option<usize>,
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawComment {
    pub id: String,
    pub author: Option<RawUser>,
    #[serde(default)]
    pub body: Value,
    pub created: Option<String>,
    pub updated: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawUser {
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_issue() -> RawIssue {
        serde_json::from_value(json!({
            "id": "10001",
            "key": "OPS-7",
            "fields": {
                "summary": "Rotate database credentials",
                "status": {"name": "In Progress"},
                "issuetype": {"name": "Task"},
                "priority": {"name": "High"},
                "assignee": {"displayName": "Sam Rivera"},
                "reporter": null,
                "project": {"key": "OPS", "name": "Operations"},
                "labels": ["security", "postgres"],
                "description": "Quarterly rotation",
                "created": "2024-02-01T08:00:00.000+0000",
                "updated": "2024-02-03T10:15:00.000+0000",
                "customfield_10010": {"value": "Platform"},
                "customfield_10020": null,
                "environment": "prod"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_issue_core_fields() {
        let issue = Issue::from_raw(raw_issue());
        assert_eq!(issue.key, "OPS-7");
        assert_eq!(issue.summary, "Rotate database credentials");
        assert_eq!(issue.status.as_deref(), Some("In Progress"));
        assert_eq!(issue.assignee.as_deref(), Some("Sam Rivera"));
        assert_eq!(issue.reporter, None);
        assert_eq!(issue.project_key.as_deref(), Some("OPS"));
        assert_eq!(issue.labels, vec!["security", "postgres"]);
        assert!(issue.updated > issue.created);
    }

    #[test]
    fn test_custom_fields_side_map() {
        let issue = Issue::from_raw(raw_issue());
        assert_eq!(issue.custom_fields.len(), 1);
        assert_eq!(
            issue.custom_fields.get("customfield_10010"),
            Some(&json!({"value": "Platform"}))
        );
        assert!(!issue.custom_fields.contains_key("environment"));
    }

    #[test]
    fn test_issue_source_item_carries_project() {
        let source = Issue::from_raw(raw_issue()).to_source_item();
        assert_eq!(source.identifier, "OPS-7");
        assert_eq!(source.scope.as_deref(), Some("OPS"));
    }

    #[test]
    fn test_comment_from_raw() {
        let raw: RawComment = serde_json::from_value(json!({
            "id": "1",
            "author": {"displayName": "Ada"},
            "body": "Looks good",
            "created": "2024-02-01T08:00:00.000+0000"
        }))
        .unwrap();
        let comment = Comment::from_raw(raw);
        assert_eq!(comment.author.as_deref(), Some("Ada"));
        assert_eq!(comment.body, "Looks good");
        assert!(comment.updated.is_none());
    }
}
