use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

use crate::crawl::debug_dump::DEFAULT_DUMP_PATH;
use crate::crawl::DEFAULT_FRESHNESS_WINDOW_DAYS;
use crate::security::ProxySettings;
use crate::supervisor::DEFAULT_MAX_CONCURRENT_CRAWLS;

pub const DEFAULT_ROUTING_SUBJECT: &str = "scraper.messages";
pub const DEFAULT_SCRAPER_IDENTITY: &str = "tycoon-scraper";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// NATS URL of the routing server; notifications are disabled without it
    pub routing_server: Option<String>,
    pub routing_subject: String,
    pub port: u16,
    pub proxy: Option<ProxySettings>,
    pub freshness_window_days: i64,
    pub quick_crawl_test: bool,
    pub max_pages: Option<usize>,
    pub debug_html: bool,
    pub debug_html_path: PathBuf,
    pub max_concurrent_crawls: usize,
    pub obey_robots: bool,
    pub accept_invalid_certs: bool,
    pub scraper_identity: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str, default: bool| {
            var(key)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(default)
        };

        let proxy = match (var("PROXY_ENDPOINT"), var("PROXY_PORT")) {
            (Some(endpoint), Some(port)) => {
                let port: u16 = port.parse().context("PROXY_PORT must be a valid port")?;
                let proxy = ProxySettings::new(endpoint, port);
                Some(match (var("PROXY_USER"), var("PROXY_PASSWORD")) {
                    (Some(user), Some(password)) => proxy.with_basic_auth(user, password),
                    _ => proxy,
                })
            }
            _ => None,
        };

        Ok(Self {
            database_url: var("DATABASE_URL").context("DATABASE_URL must be set")?,
            routing_server: var("ROUTING_SERVER"),
            routing_subject: var("ROUTING_SUBJECT")
                .unwrap_or_else(|| DEFAULT_ROUTING_SUBJECT.to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            proxy,
            freshness_window_days: var("FRESHNESS_WINDOW_DAYS")
                .map(|v| v.parse())
                .transpose()
                .context("FRESHNESS_WINDOW_DAYS must be a whole number of days")?
                .unwrap_or(DEFAULT_FRESHNESS_WINDOW_DAYS),
            quick_crawl_test: flag("QUICK_CRAWL_TEST", false),
            max_pages: var("MAX_PAGES")
                .map(|v| v.parse())
                .transpose()
                .context("MAX_PAGES must be a valid number")?,
            debug_html: flag("DEBUG_HTML", false),
            debug_html_path: var("DEBUG_HTML_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DUMP_PATH)),
            max_concurrent_crawls: var("MAX_CONCURRENT_CRAWLS")
                .map(|v| v.parse())
                .transpose()
                .context("MAX_CONCURRENT_CRAWLS must be a valid number")?
                .unwrap_or(DEFAULT_MAX_CONCURRENT_CRAWLS),
            obey_robots: flag("OBEY_ROBOTS", true),
            accept_invalid_certs: flag("ACCEPT_INVALID_CERTS", false),
            scraper_identity: var("SCRAPER_IDENTITY")
                .unwrap_or_else(|| DEFAULT_SCRAPER_IDENTITY.to_string()),
        })
    }

    /// Effective page cap: quick mode wins over `MAX_PAGES`.
    pub fn page_cap(&self) -> Option<usize> {
        if self.quick_crawl_test {
            Some(crate::crawl::QUICK_CRAWL_PAGE_CAP)
        } else {
            self.max_pages
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
