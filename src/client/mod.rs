// file: src/client/mod.rs
// description: REST transport abstraction and the Confluence/Jira clients built on it
// reference: https://docs.rs/reqwest

pub mod confluence;
pub mod http;
pub mod jira;

#[cfg(test)]
pub(crate) mod mock;

pub use confluence::ConfluenceClient;
pub use http::HttpTransport;
pub use jira::JiraClient;

use crate::error::{ApiError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;

/// A JSON-over-HTTP GET against one service.
///
/// Implementations classify non-success statuses into `ApiError` before
/// returning, so callers only see decoded bodies or classified failures.
pub trait Transport: Send + Sync {
    /// Human readable service name used in errors and logs.
    fn service(&self) -> &'static str;

    fn base_url(&self) -> &str;

    fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Paging and field selection for a search or list call.
///
/// `expand` maps to Confluence's `expand` parameter and to Jira's `fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub limit: usize,
    pub start: usize,
    pub expand: Vec<String>,
}

impl SearchOptions {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            start: 0,
            expand: Vec::new(),
        }
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn expand<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand = fields.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn expand_param(&self) -> Option<String> {
        let fields: Vec<&str> = self
            .expand
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.is_empty() {
            None
        } else {
            Some(fields.join(","))
        }
    }
}

pub(crate) fn decode<D: DeserializeOwned>(service: &'static str, value: Value) -> Result<D> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        service,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_param() {
        assert_eq!(SearchOptions::new(5).expand_param(), None);
        assert_eq!(
            SearchOptions::new(5)
                .expand(["space", " ", "metadata.labels"])
                .expand_param()
                .as_deref(),
            Some("space,metadata.labels")
        );
    }

    #[test]
    fn test_decode_reports_service() {
        let err = decode::<Vec<String>>("Jira", serde_json::json!({"not": "a list"})).unwrap_err();
        assert!(err.to_string().starts_with("Unexpected Jira response"));
    }
}
