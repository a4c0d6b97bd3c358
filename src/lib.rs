// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod parser;
pub mod query;
pub mod utils;

pub use client::{ConfluenceClient, HttpTransport, JiraClient, SearchOptions, Transport};
pub use config::{ClientConfig, Config, ServiceConfig};
pub use error::{ApiError, Result};
pub use models::{Comment, Issue, Label, Page, Project, RelatedResultSet, SearchPage, Space};
pub use query::{Expr, Query, SourceItem, extract_keywords, related_issues_query, related_pages_query};
pub use utils::Validator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _config = Config::default_config();
        let _options = SearchOptions::new(10);
        assert!(extract_keywords("").is_empty());
    }
}
