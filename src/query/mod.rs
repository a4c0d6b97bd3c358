// file: src/query/mod.rs
// description: keyword extraction and CQL/JQL synthesis for related-content discovery
// reference: internal module structure

pub mod expr;
pub mod keywords;
pub mod synth;

pub use expr::{Expr, Query, SortDirection, Value};
pub use keywords::extract_keywords;
pub use synth::{SourceItem, related_issues_query, related_pages_query};
