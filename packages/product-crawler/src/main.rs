//! product-crawler: one-shot crawl of a seed URL, or the long-lived control endpoint.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use product_crawler::crawl::QUICK_CRAWL_PAGE_CAP;
use product_crawler::server::build_app;
use product_crawler::supervisor::{Ack, JobOutcome};
use product_crawler::{ensure_scheme, Config, CrawlerDeps};

#[derive(Parser)]
#[command(name = "product-crawler")]
#[command(about = "Crawl a shop domain for product pages")]
struct Cli {
    /// Seed URL for a one-shot crawl
    #[arg(conflicts_with = "server")]
    url: Option<String>,

    /// Start the control endpoint instead of crawling once
    #[arg(long)]
    server: bool,

    /// Stop each session after 5 pages
    #[arg(long)]
    quick: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,product_crawler=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();

    let seed = match (&cli.url, cli.server) {
        (_, true) => None,
        (Some(url), false) => Some(validate_seed(url)?),
        (None, false) => bail!("a seed URL is required unless --server is given"),
    };

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let mut deps = CrawlerDeps::from_config(&config).await?;
    if cli.quick {
        deps = deps.with_page_cap(Some(QUICK_CRAWL_PAGE_CAP));
    }

    match seed {
        Some(seed) => crawl_once(&deps, &seed, &config.scraper_identity).await,
        None => serve(&deps, config.port).await,
    }
}

/// Normalize the scheme and require a parseable URL with a host.
fn validate_seed(raw: &str) -> Result<String> {
    let seed = ensure_scheme(raw);
    let parsed = Url::parse(&seed).with_context(|| format!("invalid seed URL: {raw}"))?;
    if parsed.host_str().is_none() {
        bail!("seed URL has no host: {raw}");
    }
    Ok(seed)
}

async fn crawl_once(deps: &CrawlerDeps, seed: &str, identity: &str) -> Result<()> {
    let supervisor = deps.supervisor();

    match supervisor.crawl_now(seed, identity).await {
        (_, Some(JobOutcome::Completed(report))) => {
            tracing::info!(
                seed = %report.seed,
                pages = report.pages_visited,
                persisted = report.pages_persisted,
                products = report.products_found,
                "Crawl complete"
            );
            Ok(())
        }
        (_, Some(JobOutcome::Failed(reason))) => bail!("crawl failed: {reason}"),
        (_, Some(JobOutcome::Crashed(reason))) => bail!("crawl crashed: {reason}"),
        (Ack::Fresh { domain, .. }, None) => {
            tracing::info!(domain = %domain, "Domain scraped recently, nothing to do");
            Ok(())
        }
        (Ack::Rejected { reason, .. }, None) => bail!("crawl rejected: {reason}"),
        (ack, None) => bail!("crawl not started: {ack:?}"),
    }
}

async fn serve(deps: &CrawlerDeps, port: u16) -> Result<()> {
    let app = build_app(Arc::new(deps.supervisor()));

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Starting control endpoint on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
