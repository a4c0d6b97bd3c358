// file: src/mcp/server.rs
// description: MCP server exposing Confluence and Jira operations as tools
// reference: https://docs.rs/rmcp

use crate::client::{ConfluenceClient, JiraClient, SearchOptions};
use crate::config::Config;
use crate::error::{ApiError, Result as ApiResult};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

const INSTRUCTIONS: &str = "Tools for Confluence pages and Jira issues.\n\
    - search_pages / search_issues run raw CQL / JQL.\n\
    - get_page / get_issue fetch one item; page bodies are returned as plain text.\n\
    - find_related_pages / find_related_issues derive a query from the item's title or \
    summary keywords and its labels and return other matching items.\n\
    - list_spaces, get_page_children, list_projects and get_issue_comments browse structure.";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchPagesParams {
    /// CQL query, e.g. `space = ENG AND title ~ "runbook"`
    pub cql: String,
    /// Maximum number of results (defaults to the configured limit)
    pub limit: Option<usize>,
    /// Offset of the first result
    pub start: Option<usize>,
    /// Properties to expand, e.g. `space`, `metadata.labels`
    pub expand: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetPageParams {
    /// Numeric page id
    pub page_id: String,
    /// Include the page body as plain text (default: true)
    pub include_body: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RelatedPagesParams {
    /// Numeric id of the source page
    pub page_id: String,
    /// Maximum number of related pages
    pub limit: Option<usize>,
    /// Properties to expand on the returned pages
    pub expand: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListParams {
    /// Maximum number of results
    pub limit: Option<usize>,
    /// Offset of the first result
    pub start: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PageChildrenParams {
    /// Numeric id of the parent page
    pub page_id: String,
    pub limit: Option<usize>,
    pub start: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchIssuesParams {
    /// JQL query, e.g. `project = OPS AND status = "In Progress"`
    pub jql: String,
    pub limit: Option<usize>,
    pub start: Option<usize>,
    /// Issue fields to return (defaults to the common core fields)
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    /// Issue key, e.g. `OPS-42`
    pub issue_key: String,
    /// Issue fields to return (all fields when omitted)
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RelatedIssuesParams {
    /// Key of the source issue
    pub issue_key: String,
    pub limit: Option<usize>,
    /// Issue fields to return on related issues
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IssueCommentsParams {
    pub issue_key: String,
    pub limit: Option<usize>,
    pub start: Option<usize>,
}

/// Tool server over explicitly constructed service clients.
#[derive(Clone)]
pub struct AtlassianMcp {
    config: Arc<Config>,
    confluence: Option<Arc<ConfluenceClient>>,
    jira: Option<Arc<JiraClient>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AtlassianMcp {
    /// Build clients for every configured service.
    pub fn new(config: Config) -> ApiResult<Self> {
        let confluence = if config.confluence.is_configured() {
            Some(ConfluenceClient::from_config(&config)?)
        } else {
            None
        };
        let jira = if config.jira.is_configured() {
            Some(JiraClient::from_config(&config)?)
        } else {
            None
        };
        Ok(Self::with_clients(config, confluence, jira))
    }

    pub fn with_clients(
        config: Config,
        confluence: Option<ConfluenceClient>,
        jira: Option<JiraClient>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            confluence: confluence.map(Arc::new),
            jira: jira.map(Arc::new),
            tool_router: Self::tool_router(),
        }
    }

    pub fn get_tool_router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    fn confluence(&self) -> ApiResult<&ConfluenceClient> {
        self.confluence
            .as_deref()
            .ok_or_else(|| ApiError::Config("Confluence is not configured".to_string()))
    }

    fn jira(&self) -> ApiResult<&JiraClient> {
        self.jira
            .as_deref()
            .ok_or_else(|| ApiError::Config("Jira is not configured".to_string()))
    }

    fn limit(&self, requested: Option<usize>) -> ApiResult<usize> {
        self.config.client.effective_limit(requested)
    }

    /// Run one tool invocation under its own span and render the outcome.
    async fn run<F, R>(&self, tool: &'static str, work: F) -> Result<CallToolResult, McpError>
    where
        F: Future<Output = ApiResult<R>>,
        R: Serialize,
    {
        let request_id = Uuid::new_v4();
        async move {
            info!("MCP: {} invoked", tool);
            match work.await {
                Ok(value) => json_result(&value),
                Err(e) => {
                    error!("MCP: {} failed: {}", tool, e);
                    Err(to_mcp_error(e))
                }
            }
        }
        .instrument(info_span!("tool", tool_name = tool, %request_id))
        .await
    }

    #[tool(description = "Search Confluence content with a CQL query")]
    async fn search_pages(
        &self,
        Parameters(params): Parameters<SearchPagesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("search_pages", async move {
            let options = SearchOptions::new(self.limit(params.limit)?)
                .start(params.start.unwrap_or(0))
                .expand(params.expand.unwrap_or_default());
            self.confluence()?.search(&params.cql, &options).await
        })
        .await
    }

    #[tool(description = "Get a Confluence page by id, with its labels and plain-text body")]
    async fn get_page(
        &self,
        Parameters(params): Parameters<GetPageParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_page", async move {
            let mut expand = vec![
                "space".to_string(),
                "version".to_string(),
                "metadata.labels".to_string(),
            ];
            if params.include_body.unwrap_or(true) {
                expand.push("body.storage".to_string());
            }
            let mut page = self.confluence()?.get_page(&params.page_id, &expand).await?;
            page.body = page.plain_text_body();
            Ok::<_, ApiError>(page)
        })
        .await
    }

    #[tool(
        description = "Find Confluence pages related to a page through shared title keywords and labels"
    )]
    async fn find_related_pages(
        &self,
        Parameters(params): Parameters<RelatedPagesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("find_related_pages", async move {
            let limit = self.limit(params.limit)?;
            let expand = params.expand.unwrap_or_default();
            self.confluence()?
                .find_related_pages(&params.page_id, limit, &expand)
                .await
        })
        .await
    }

    #[tool(description = "List Confluence spaces")]
    async fn list_spaces(
        &self,
        Parameters(params): Parameters<ListParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("list_spaces", async move {
            let limit = self.limit(params.limit)?;
            self.confluence()?
                .list_spaces(limit, params.start.unwrap_or(0))
                .await
        })
        .await
    }

    #[tool(description = "List the child pages of a Confluence page")]
    async fn get_page_children(
        &self,
        Parameters(params): Parameters<PageChildrenParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_page_children", async move {
            let limit = self.limit(params.limit)?;
            self.confluence()?
                .get_page_children(&params.page_id, limit, params.start.unwrap_or(0))
                .await
        })
        .await
    }

    #[tool(description = "Search Jira issues with a JQL query")]
    async fn search_issues(
        &self,
        Parameters(params): Parameters<SearchIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("search_issues", async move {
            let options = SearchOptions::new(self.limit(params.limit)?)
                .start(params.start.unwrap_or(0))
                .expand(params.fields.unwrap_or_default());
            self.jira()?.search(&params.jql, &options).await
        })
        .await
    }

    #[tool(description = "Get a Jira issue by key")]
    async fn get_issue(
        &self,
        Parameters(params): Parameters<GetIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_issue", async move {
            let fields = params.fields.unwrap_or_default();
            self.jira()?.get_issue(&params.issue_key, &fields).await
        })
        .await
    }

    #[tool(
        description = "Find Jira issues related to an issue through project, summary keywords and labels, most recently updated first"
    )]
    async fn find_related_issues(
        &self,
        Parameters(params): Parameters<RelatedIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("find_related_issues", async move {
            let limit = self.limit(params.limit)?;
            let fields = params.fields.unwrap_or_default();
            self.jira()?
                .find_related_issues(&params.issue_key, limit, &fields)
                .await
        })
        .await
    }

    #[tool(description = "List Jira projects visible to the configured user")]
    async fn list_projects(&self) -> Result<CallToolResult, McpError> {
        self.run("list_projects", async move { self.jira()?.list_projects().await })
            .await
    }

    #[tool(description = "List comments on a Jira issue")]
    async fn get_issue_comments(
        &self,
        Parameters(params): Parameters<IssueCommentsParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("get_issue_comments", async move {
            let limit = self.limit(params.limit)?;
            self.jira()?
                .get_issue_comments(&params.issue_key, limit, params.start.unwrap_or(0))
                .await
        })
        .await
    }
}

#[tool_handler]
impl ServerHandler for AtlassianMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

fn json_result<S: Serialize>(value: &S) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Failed to serialize result: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

pub fn to_mcp_error(err: ApiError) -> McpError {
    let message = err.to_string();
    match err {
        ApiError::Validation(_) => McpError::invalid_params(message, None),
        ApiError::NotFound { .. } => McpError::resource_not_found(message, None),
        ApiError::Config(_) => McpError::invalid_request(message, None),
        _ => McpError::internal_error(message, None),
    }
}
