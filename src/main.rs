// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use atlassian_mcp::utils::logging::{format_error, format_info, format_success, format_warning};
use atlassian_mcp::{
    Config, ConfluenceClient, Issue, JiraClient, Page, SearchOptions, Validator,
    mcp::AtlassianMcp,
};
use clap::{ArgAction, Parser, Subcommand};
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "atlassian_mcp")]
#[command(author = "cipher")]
#[command(version)]
#[command(about = "Confluence and Jira tools with related-content discovery", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE", env = "ATLASSIAN_MCP_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP (Model Context Protocol) server for agentic tool integration
    Mcp {
        #[arg(long, default_value = "stdio")]
        transport: String,
    },

    /// Search Confluence content with CQL
    SearchPages {
        cql: String,

        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(short, long, default_value_t = 0)]
        start: usize,
    },

    /// Find pages related to a page by title keywords and labels
    RelatedPages {
        page_id: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search Jira issues with JQL
    SearchIssues {
        jql: String,

        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(short, long, default_value_t = 0)]
        start: usize,
    },

    /// Find issues related to an issue by project, summary keywords and labels
    RelatedIssues {
        issue_key: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the effective configuration with secrets masked
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    atlassian_mcp::utils::logging::init_logger(cli.color, cli.verbose);

    let config_path = Config::config_path_or_default(cli.config.clone());
    let config = if config_path.exists() {
        info!("Loading configuration from: {}", config_path.display());
        Config::load(Some(config_path.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using environment only",
            config_path.display()
        );
        Config::load(None).context("Failed to load configuration from environment")?
    };

    match cli.command {
        Commands::Mcp { transport } => cmd_mcp(config, &transport).await?,
        Commands::SearchPages { cql, limit, start } => {
            cmd_search_pages(&config, &cql, limit, start).await?
        }
        Commands::RelatedPages { page_id, limit } => {
            cmd_related_pages(&config, &page_id, limit).await?
        }
        Commands::SearchIssues { jql, limit, start } => {
            cmd_search_issues(&config, &jql, limit, start).await?
        }
        Commands::RelatedIssues { issue_key, limit } => {
            cmd_related_issues(&config, &issue_key, limit).await?
        }
        Commands::Config => cmd_config(&config)?,
    }

    Ok(())
}

async fn cmd_mcp(config: Config, transport: &str) -> Result<()> {
    info!("Starting MCP server (transport: {})", transport);

    if transport != "stdio" {
        error!("Only stdio transport is currently supported");
        return Err(anyhow::anyhow!("Unsupported transport: {}", transport));
    }

    let mcp_server = AtlassianMcp::new(config).context("Failed to build service clients")?;

    info!("MCP server ready. Available tools:");
    for tool in mcp_server.get_tool_router().list_all() {
        info!(
            "  - {}: {}",
            tool.name,
            tool.description.as_deref().unwrap_or("No description")
        );
    }

    let service = mcp_server
        .serve(stdio())
        .await
        .context("Failed to start stdio transport")?;
    service.waiting().await?;

    info!("MCP server stopped");
    Ok(())
}

async fn cmd_search_pages(
    config: &Config,
    cql: &str,
    limit: Option<usize>,
    start: usize,
) -> Result<()> {
    let client = ConfluenceClient::from_config(config).context("Confluence is not configured")?;
    let limit = config.client.effective_limit(limit)?;
    let started = Instant::now();

    let options = SearchOptions::new(limit)
        .start(start)
        .expand(["space", "metadata.labels"]);
    let page = client.search(cql, &options).await.context("CQL search failed")?;

    println!("{}", format_info(&format!("CQL: {}", cql)));
    print_pages(&page.items);
    println!(
        "{}",
        format_success(&format!(
            "{} result(s) from offset {} in {:.2}s{}",
            page.size,
            page.start,
            started.elapsed().as_secs_f64(),
            if page.has_more() { ", more available" } else { "" }
        ))
    );
    Ok(())
}

async fn cmd_related_pages(config: &Config, page_id: &str, limit: Option<usize>) -> Result<()> {
    let client = ConfluenceClient::from_config(config).context("Confluence is not configured")?;
    let limit = config.client.effective_limit(limit)?;

    let expand = vec!["space".to_string(), "metadata.labels".to_string()];
    let related = match client.find_related_pages(page_id, limit, &expand).await {
        Ok(related) => related,
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            return Err(e).context("Related page lookup failed");
        }
    };

    println!("{}", format_info(&format!("CQL: {}", related.query)));
    if related.is_empty() {
        println!("{}", format_warning(&format!("No pages related to {}", page_id)));
        return Ok(());
    }
    print_pages(&related.items);
    println!(
        "{}",
        format_success(&format!("{} related page(s)", related.len()))
    );
    Ok(())
}

async fn cmd_search_issues(
    config: &Config,
    jql: &str,
    limit: Option<usize>,
    start: usize,
) -> Result<()> {
    let client = JiraClient::from_config(config).context("Jira is not configured")?;
    let limit = config.client.effective_limit(limit)?;
    let started = Instant::now();

    let page = client
        .search(jql, &SearchOptions::new(limit).start(start))
        .await
        .context("JQL search failed")?;

    println!("{}", format_info(&format!("JQL: {}", jql)));
    print_issues(&page.items);
    println!(
        "{}",
        format_success(&format!(
            "{} of {} result(s) in {:.2}s",
            page.size,
            page.total.map_or_else(|| "?".to_string(), |t| t.to_string()),
            started.elapsed().as_secs_f64()
        ))
    );
    Ok(())
}

async fn cmd_related_issues(config: &Config, issue_key: &str, limit: Option<usize>) -> Result<()> {
    let client = JiraClient::from_config(config).context("Jira is not configured")?;
    let limit = config.client.effective_limit(limit)?;

    let related = match client.find_related_issues(issue_key, limit, &[]).await {
        Ok(related) => related,
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            return Err(e).context("Related issue lookup failed");
        }
    };

    println!("{}", format_info(&format!("JQL: {}", related.query)));
    if related.is_empty() {
        println!("{}", format_warning(&format!("No issues related to {}", issue_key)));
        return Ok(());
    }
    print_issues(&related.items);
    println!(
        "{}",
        format_success(&format!("{} related issue(s)", related.len()))
    );
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    let rendered = serde_json::to_string_pretty(&config.redacted())
        .context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}

fn print_pages(pages: &[Page]) {
    println!("{}", "=".repeat(80));
    for (idx, page) in pages.iter().enumerate() {
        let space = page.space.as_ref().map(|s| s.key.as_str()).unwrap_or("-");
        println!("{}. [{}] {} (id {})", idx + 1, space, page.title, page.id);
        if !page.labels.is_empty() {
            println!("   Labels: {}", page.labels.join(", "));
        }
        if let Some(url) = &page.web_url {
            println!("   {}", url);
        }
    }
    println!("{}", "=".repeat(80));
}

fn print_issues(issues: &[Issue]) {
    println!("{}", "=".repeat(80));
    for (idx, issue) in issues.iter().enumerate() {
        println!(
            "{}. {} [{}] {}",
            idx + 1,
            issue.key,
            issue.status.as_deref().unwrap_or("-"),
            Validator::truncate_text(&issue.summary, 70)
        );
        if let Some(updated) = issue.updated {
            println!("   Updated: {}", updated.format("%Y-%m-%d %H:%M"));
        }
        if !issue.labels.is_empty() {
            println!("   Labels: {}", issue.labels.join(", "));
        }
    }
    println!("{}", "=".repeat(80));
}
