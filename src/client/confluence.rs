// file: src/client/confluence.rs
// description: Confluence REST client: pages, spaces, labels, CQL search and related pages
// reference: https://developer.atlassian.com/cloud/confluence/rest/v1/intro/

use super::{HttpTransport, SearchOptions, Transport, decode};
use crate::config::Config;
use crate::error::Result;
use crate::models::page::{RawContent, RawResults};
use crate::models::{Label, Page, RelatedResultSet, SearchPage, Space};
use crate::query::related_pages_query;
use crate::utils::Validator;
use tracing::{debug, info};

pub const SERVICE: &str = "Confluence";

/// Fields the related-page lookup needs from the source page.
const SOURCE_EXPAND: &[&str] = &["metadata.labels"];

pub struct ConfluenceClient<T = HttpTransport> {
    transport: T,
}

impl ConfluenceClient<HttpTransport> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(SERVICE, &config.confluence, config.client.timeout())?;
        Ok(Self::new(transport))
    }
}

impl<T: Transport> ConfluenceClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn get_page(&self, page_id: &str, expand: &[String]) -> Result<Page> {
        Validator::validate_page_id(page_id)?;

        let mut query = Vec::new();
        if let Some(expand) = SearchOptions::new(1).expand(expand.iter().cloned()).expand_param() {
            query.push(("expand", expand));
        }

        let value = self
            .transport
            .get_json(&format!("/rest/api/content/{}", page_id), &query)
            .await?;
        let raw: RawContent = decode(SERVICE, value)?;
        Ok(Page::from_raw(raw, Some(self.transport.base_url())))
    }

    /// Execute a CQL query and return one page of matching content.
    pub async fn search(&self, cql: &str, options: &SearchOptions) -> Result<SearchPage<Page>> {
        Validator::validate_query(cql)?;
        Validator::validate_limit(options.limit)?;

        let mut query = vec![
            ("cql", cql.to_string()),
            ("limit", options.limit.to_string()),
            ("start", options.start.to_string()),
        ];
        if let Some(expand) = options.expand_param() {
            query.push(("expand", expand));
        }

        let value = self
            .transport
            .get_json("/rest/api/content/search", &query)
            .await?;
        self.content_page(value)
    }

    pub async fn list_spaces(&self, limit: usize, start: usize) -> Result<SearchPage<Space>> {
        Validator::validate_limit(limit)?;

        let value = self
            .transport
            .get_json(
                "/rest/api/space",
                &[("limit", limit.to_string()), ("start", start.to_string())],
            )
            .await?;
        let raw: RawResults<Space> = decode(SERVICE, value)?;

        Ok(SearchPage {
            size: raw.results.len(),
            items: raw.results,
            start: raw.start,
            limit: raw.limit,
            total: None,
            next: raw.links.next,
        })
    }

    pub async fn get_page_children(
        &self,
        page_id: &str,
        limit: usize,
        start: usize,
    ) -> Result<SearchPage<Page>> {
        Validator::validate_page_id(page_id)?;
        Validator::validate_limit(limit)?;

        let value = self
            .transport
            .get_json(
                &format!("/rest/api/content/{}/child/page", page_id),
                &[
                    ("limit", limit.to_string()),
                    ("start", start.to_string()),
                    ("expand", "space,metadata.labels,version".to_string()),
                ],
            )
            .await?;
        self.content_page(value)
    }

    pub async fn get_page_labels(&self, page_id: &str) -> Result<Vec<Label>> {
        Validator::validate_page_id(page_id)?;

        let value = self
            .transport
            .get_json(&format!("/rest/api/content/{}/label", page_id), &[])
            .await?;
        let raw: RawResults<Label> = decode(SERVICE, value)?;
        Ok(raw.results)
    }

    /// Pages sharing title keywords or labels with `page_id`.
    ///
    /// Fetches the source page, synthesizes CQL from its title and labels and
    /// runs it. A failed fetch returns before any search is issued. At most
    /// `limit` pages are requested and returned, never including the source.
    pub async fn find_related_pages(
        &self,
        page_id: &str,
        limit: usize,
        expand: &[String],
    ) -> Result<RelatedResultSet<Page>> {
        Validator::validate_limit(limit)?;

        let source_expand: Vec<String> = SOURCE_EXPAND.iter().map(|s| s.to_string()).collect();
        let source = self.get_page(page_id, &source_expand).await?;

        let cql = related_pages_query(&source.to_source_item()).to_string();
        debug!("Related pages CQL for {}: {}", source.id, cql);

        let options = SearchOptions::new(limit).expand(expand.iter().cloned());
        let found = self.search(&cql, &options).await?;

        let items: Vec<Page> = found
            .items
            .into_iter()
            .filter(|page| page.id != source.id)
            .take(limit)
            .collect();

        info!("Found {} pages related to {}", items.len(), source.id);

        Ok(RelatedResultSet {
            source: source.id,
            query: cql,
            items,
        })
    }

    fn content_page(&self, value: serde_json::Value) -> Result<SearchPage<Page>> {
        let raw: RawResults<RawContent> = decode(SERVICE, value)?;
        let base = raw
            .links
            .base
            .clone()
            .unwrap_or_else(|| self.transport.base_url().to_string());

        let items: Vec<Page> = raw
            .results
            .into_iter()
            .map(|content| Page::from_raw(content, Some(&base)))
            .collect();

        Ok(SearchPage {
            size: items.len(),
            items,
            start: raw.start,
            limit: raw.limit,
            total: None,
            next: raw.links.next,
        })
    }
}
