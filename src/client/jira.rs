// file: src/client/jira.rs
// description: Jira REST client: issues, projects, comments, JQL search and related issues
// reference: https://developer.atlassian.com/cloud/jira/platform/rest/v2/intro/

use super::{HttpTransport, SearchOptions, Transport, decode};
use crate::config::Config;
use crate::error::Result;
use crate::models::issue::{RawCommentPage, RawIssue, RawIssueSearch};
use crate::models::{Comment, Issue, Project, RelatedResultSet, SearchPage};
use crate::query::related_issues_query;
use crate::utils::Validator;
use tracing::{debug, info};

pub const SERVICE: &str = "Jira";

/// Fields the related-issue lookup needs from the source issue.
const SOURCE_FIELDS: &[&str] = &["summary", "labels", "project"];

/// Fields returned by searches when the caller does not choose any.
pub const DEFAULT_FIELDS: &[&str] = &[
    "summary",
    "status",
    "issuetype",
    "priority",
    "assignee",
    "reporter",
    "project",
    "labels",
    "created",
    "updated",
];

pub struct JiraClient<T = HttpTransport> {
    transport: T,
}

impl JiraClient<HttpTransport> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(SERVICE, &config.jira, config.client.timeout())?;
        Ok(Self::new(transport))
    }
}

impl<T: Transport> JiraClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn get_issue(&self, key: &str, fields: &[String]) -> Result<Issue> {
        Validator::validate_issue_key(key)?;

        let mut query = Vec::new();
        if let Some(fields) = SearchOptions::new(1).expand(fields.iter().cloned()).expand_param() {
            query.push(("fields", fields));
        }

        let value = self
            .transport
            .get_json(&format!("/rest/api/2/issue/{}", key), &query)
            .await?;
        let raw: RawIssue = decode(SERVICE, value)?;
        Ok(Issue::from_raw(raw))
    }

    /// Execute a JQL query and return one page of matching issues.
    pub async fn search(&self, jql: &str, options: &SearchOptions) -> Result<SearchPage<Issue>> {
        Validator::validate_query(jql)?;
        Validator::validate_limit(options.limit)?;

        let fields = options
            .expand_param()
            .unwrap_or_else(|| DEFAULT_FIELDS.join(","));

        let value = self
            .transport
            .get_json(
                "/rest/api/2/search",
                &[
                    ("jql", jql.to_string()),
                    ("startAt", options.start.to_string()),
                    ("maxResults", options.limit.to_string()),
                    ("fields", fields),
                ],
            )
            .await?;
        let raw: RawIssueSearch = decode(SERVICE, value)?;

        let items: Vec<Issue> = raw.issues.into_iter().map(Issue::from_raw).collect();
        Ok(SearchPage {
            size: items.len(),
            items,
            start: raw.start_at,
            limit: raw.max_results,
            total: raw.total,
            next: None,
        })
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let value = self.transport.get_json("/rest/api/2/project", &[]).await?;
        decode(SERVICE, value)
    }

    pub async fn get_issue_comments(
        &self,
        key: &str,
        limit: usize,
        start: usize,
    ) -> Result<SearchPage<Comment>> {
        Validator::validate_issue_key(key)?;
        Validator::validate_limit(limit)?;

        let value = self
            .transport
            .get_json(
                &format!("/rest/api/2/issue/{}/comment", key),
                &[
                    ("startAt", start.to_string()),
                    ("maxResults", limit.to_string()),
                ],
            )
            .await?;
        let raw: RawCommentPage = decode(SERVICE, value)?;

        let items: Vec<Comment> = raw.comments.into_iter().map(Comment::from_raw).collect();
        Ok(SearchPage {
            size: items.len(),
            items,
            start: raw.start_at,
            limit: raw.max_results,
            total: raw.total,
            next: None,
        })
    }

    /// Issues in the same project, or sharing summary keywords or labels with
    /// `key`, most recently updated first.
    ///
    /// A failed fetch of the source issue returns before any search is
    /// issued. At most `limit` issues are requested and returned, never
    /// including the source.
    pub async fn find_related_issues(
        &self,
        key: &str,
        limit: usize,
        fields: &[String],
    ) -> Result<RelatedResultSet<Issue>> {
        Validator::validate_limit(limit)?;

        let source_fields: Vec<String> = SOURCE_FIELDS.iter().map(|s| s.to_string()).collect();
        let source = self.get_issue(key, &source_fields).await?;

        let jql = related_issues_query(&source.to_source_item()).to_string();
        debug!("Related issues JQL for {}: {}", source.key, jql);

        let options = SearchOptions::new(limit).expand(fields.iter().cloned());
        let found = self.search(&jql, &options).await?;

        let items: Vec<Issue> = found
            .items
            .into_iter()
            .filter(|issue| !issue.key.eq_ignore_ascii_case(&source.key))
            .take(limit)
            .collect();

        info!("Found {} issues related to {}", items.len(), source.key);

        Ok(RelatedResultSet {
            source: source.key,
            query: jql,
            items,
        })
    }
}
