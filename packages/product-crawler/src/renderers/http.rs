//! HTTP fetch-and-render collaborator.
//!
//! Fetches pages with `reqwest` and returns the server-rendered HTML. No
//! JavaScript is executed.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use super::robots::RobotsTxt;
use crate::domain::is_login_page;
use crate::error::{CrawlerError, RenderError, RenderResult, Result};
use crate::security::ProxySettings;
use crate::traits::{PageRenderer, RenderedPage};

/// Browser-like User-Agent to avoid bot detection.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Options for [`HttpRenderer`].
#[derive(Debug, Clone)]
pub struct HttpRendererOptions {
    pub proxy: Option<ProxySettings>,
    pub obey_robots: bool,
    /// Agent token matched against robots.txt groups
    pub robots_agent: String,
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

impl Default for HttpRendererOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            obey_robots: true,
            robots_agent: "tycoon-scraper".to_string(),
            accept_invalid_certs: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Renderer backed by `reqwest`.
pub struct HttpRenderer {
    client: reqwest::Client,
    obey_robots: bool,
    robots_agent: String,
    /// Parsed robots.txt per origin
    robots: RwLock<HashMap<String, Arc<RobotsTxt>>>,
}

impl HttpRenderer {
    pub fn new(options: HttpRendererOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .danger_accept_invalid_certs(options.accept_invalid_certs);

        if let Some(proxy) = &options.proxy {
            let mut reqwest_proxy = reqwest::Proxy::all(proxy.url())
                .map_err(|e| CrawlerError::Config(format!("invalid proxy: {e}")))?;
            if let Some((user, password)) = proxy.basic_auth() {
                reqwest_proxy = reqwest_proxy.basic_auth(user, password);
            }
            builder = builder.proxy(reqwest_proxy);
        }

        let client = builder
            .build()
            .map_err(|e| CrawlerError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            obey_robots: options.obey_robots,
            robots_agent: options.robots_agent,
            robots: RwLock::new(HashMap::new()),
        })
    }

    async fn robots_for(&self, url: &Url) -> Arc<RobotsTxt> {
        let origin = url.origin().ascii_serialization();

        if let Some(robots) = self.robots.read().await.get(&origin) {
            return Arc::clone(robots);
        }

        let robots = Arc::new(self.fetch_robots(&origin).await);
        self.robots
            .write()
            .await
            .entry(origin)
            .or_insert_with(|| Arc::clone(&robots));
        robots
    }

    /// Missing or unreachable robots.txt allows everything.
    async fn fetch_robots(&self, origin: &str) -> RobotsTxt {
        let robots_url = format!("{origin}/robots.txt");

        match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(content) => RobotsTxt::parse(&content),
                Err(e) => {
                    debug!(url = %robots_url, error = %e, "Unreadable robots.txt, allowing all");
                    RobotsTxt::default()
                }
            },
            Ok(response) => {
                debug!(url = %robots_url, status = %response.status(), "No robots.txt");
                RobotsTxt::default()
            }
            Err(e) => {
                debug!(url = %robots_url, error = %e, "robots.txt fetch failed, allowing all");
                RobotsTxt::default()
            }
        }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> RenderResult<RenderedPage> {
        let parsed = Url::parse(url).map_err(|_| RenderError::InvalidUrl {
            url: url.to_string(),
        })?;

        if self.obey_robots {
            let robots = self.robots_for(&parsed).await;
            if !robots.is_allowed(&self.robots_agent, parsed.path()) {
                return Err(RenderError::RobotsDisallowed {
                    url: url.to_string(),
                });
            }
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| RenderError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::fetch(url, format!("HTTP {status}")));
        }

        let final_url = response.url().to_string();
        if final_url != url && is_login_page(&final_url) {
            return Err(RenderError::LoginPageDetected { url: final_url });
        }

        let html = response.text().await.map_err(|e| RenderError::Render {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!(url = %url, final_url = %final_url, bytes = html.len(), "Rendered page");
        Ok(RenderedPage::new(url, html)
            .with_final_url(final_url)
            .with_status(status.as_u16()))
    }

    fn name(&self) -> &str {
        "http"
    }
}
