//! HTML fixtures and mock-backed dependency sets.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use product_crawler::crawl::{NotificationEmitter, SessionDeps};
use product_crawler::error::RenderResult;
use product_crawler::messaging::TestRouter;
use product_crawler::renderers::MockRenderer;
use product_crawler::stores::MemoryUrlStore;
use product_crawler::{PageRenderer, RenderedPage};

/// A page with the given links and no product markup.
pub fn plain_page(title: &str, links: &[&str]) -> String {
    format!(
        "<html><head><title>{title}</title></head><body><h1>{title}</h1>{}</body></html>",
        anchors(links)
    )
}

/// An OpenGraph product page.
pub fn product_page(title: &str, images: &[&str], links: &[&str]) -> String {
    let image_tags: String = images
        .iter()
        .map(|src| format!(r#"<meta property="og:image" content="{src}">"#))
        .collect();

    format!(
        r#"<html><head>
        <title>{title} | Shop</title>
        <meta property="og:type" content="product">
        <meta property="og:title" content="{title}">
        {image_tags}
        <meta property="product:price:amount" content="19.99">
        <meta property="product:price:currency" content="USD">
        </head><body><h1>{title}</h1>{}</body></html>"#,
        anchors(links)
    )
}

fn anchors(links: &[&str]) -> String {
    links
        .iter()
        .map(|href| format!(r#"<a href="{href}">{href}</a>"#))
        .collect()
}

/// Mock collaborators plus the handles tests inspect.
pub struct MockDeps {
    pub renderer: Arc<MockRenderer>,
    pub store: Arc<MemoryUrlStore>,
    pub router: Arc<TestRouter>,
}

impl MockDeps {
    pub fn new(renderer: MockRenderer) -> Self {
        Self {
            renderer: Arc::new(renderer),
            store: Arc::new(MemoryUrlStore::new()),
            router: Arc::new(TestRouter::new()),
        }
    }

    pub fn session_deps(&self) -> SessionDeps {
        SessionDeps {
            renderer: self.renderer.clone(),
            store: self.store.clone(),
            notifier: NotificationEmitter::new(self.router.clone()),
            html_dump: None,
        }
    }
}

/// Renderer that delays every page, keeping sessions alive long enough to race requests.
pub struct SlowRenderer {
    pub inner: MockRenderer,
    pub delay: Duration,
}

#[async_trait]
impl PageRenderer for SlowRenderer {
    async fn render(&self, url: &str) -> RenderResult<RenderedPage> {
        tokio::time::sleep(self.delay).await;
        self.inner.render(url).await
    }

    fn name(&self) -> &str {
        "slow-mock"
    }
}
