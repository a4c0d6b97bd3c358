// file: src/models/search_result.rs
// description: paginated search pages and related-item result sets
// reference: Used for CQL/JQL search results

use serde::Serialize;

/// One page of a remote search, in remote order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchPage<T> {
    pub items: Vec<T>,
    pub start: usize,
    pub limit: usize,
    pub size: usize,
    /// Only reported by Jira.
    pub total: Option<usize>,
    /// Continuation link, only reported by Confluence.
    pub next: Option<String>,
}

impl<T> SearchPage<T> {
    pub fn has_more(&self) -> bool {
        match (self.total, &self.next) {
            (_, Some(_)) => true,
            (Some(total), None) => self.start + self.size < total,
            (None, None) => false,
        }
    }
}

/// Items related to a source page or issue.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RelatedResultSet<T> {
    /// Identifier of the source item.
    pub source: String,
    /// The CQL or JQL that was executed.
    pub query: String,
    pub items: Vec<T>,
}

impl<T> RelatedResultSet<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
