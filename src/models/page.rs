// file: src/models/page.rs
// description: Confluence content and space models
// reference: https://developer.atlassian.com/cloud/confluence/rest/v1/api-group-content/

use super::parse_timestamp;
use crate::parser::storage::to_plain_text;
use crate::query::SourceItem;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpaceRef {
    pub key: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub id: String,
    pub content_type: String,
    pub status: String,
    pub title: String,
    pub space: Option<SpaceRef>,
    pub labels: Vec<String>,
    /// Storage-format (XHTML) body, present when `body.storage` was expanded.
    pub body: Option<String>,
    pub version: Option<u32>,
    pub last_modified: Option<DateTime<FixedOffset>>,
    pub web_url: Option<String>,
}

impl Page {
    pub fn plain_text_body(&self) -> Option<String> {
        self.body.as_deref().map(to_plain_text)
    }

    pub fn to_source_item(&self) -> SourceItem {
        SourceItem {
            identifier: self.id.clone(),
            text: self.title.clone(),
            labels: self.labels.clone(),
            scope: None,
        }
    }

    pub(crate) fn from_raw(raw: RawContent, base_url: Option<&str>) -> Self {
        let labels = raw
            .metadata
            .and_then(|m| m.labels)
            .map(|l| l.results.into_iter().map(|label| label.name).collect())
            .unwrap_or_default();

        let web_url = raw.links.and_then(|links| links.webui).map(|path| match base_url {
            Some(base) if path.starts_with('/') => format!("{}{}", base.trim_end_matches('/'), path),
            _ => path,
        });

        let (version, last_modified) = match raw.version {
            Some(v) => (Some(v.number), v.when.as_deref().and_then(parse_timestamp)),
            None => (None, None),
        };

        Self {
            id: raw.id,
            content_type: raw.content_type,
            status: raw.status.unwrap_or_else(|| "current".to_string()),
            title: raw.title,
            space: raw.space.map(|s| SpaceRef {
                key: s.key,
                name: s.name,
            }),
            labels,
            body: raw.body.and_then(|b| b.storage).map(|s| s.value),
            version,
            last_modified,
            web_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub name: String,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Space {
    pub id: Option<u64>,
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub space_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawContent {
    pub id: String,
    #[serde(rename = "type", default = "default_content_type")]
    pub content_type: String,
    pub status: Option<String>,
    #[serde(default)]
    pub title: String,
    pub space: Option<RawSpaceRef>,
    pub version: Option<RawVersion>,
    pub metadata: Option<RawMetadata>,
    pub body: Option<RawBody>,
    #[serde(rename = "_links")]
    pub links: Option<RawLinks>,
}

fn default_content_type() -> String {
    "page".to_string()
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSpaceRef {
    pub key: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawVersion {
    pub number: u32,
    pub when: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMetadata {
    pub labels: Option<RawResults<Label>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBody {
    pub storage: Option<RawStorage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawStorage {
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawLinks {
    pub webui: Option<String>,
    pub base: Option<String>,
    pub next: Option<String>,
}

/// The `{results, start, limit, size, _links}` envelope of list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct RawResults<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub size: usize,
    #[serde(rename = "_links", default)]
    pub links: RawLinks,
}
