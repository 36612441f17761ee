//! End-to-end crawl sessions against mock collaborators.

mod common;

use common::*;
use product_crawler::crawl::{CrawlSession, HtmlDump, SessionState};
use product_crawler::messaging::{ResultsPayload, RESULTS_CLIENT_TOPIC};
use product_crawler::renderers::MockRenderer;
use product_crawler::{CrawlerError, UrlStore};

const SEED: &str = "http://shop.com/";

#[tokio::test]
async fn notification_fires_once_for_first_qualifying_product() {
    let renderer = MockRenderer::new()
        .with_page(SEED, plain_page("Home", &["/p2", "/p3"]))
        .with_page(
            "http://shop.com/p2",
            product_page("Blue Shirt", &["https://cdn.shop.com/shirt.jpg"], &[]),
        )
        .with_page(
            "http://shop.com/p3",
            product_page("Red Cap", &["https://cdn.shop.com/cap.jpg"], &[]),
        );
    let mocks = MockDeps::new(renderer);

    let mut session = CrawlSession::new("shop.com", "client-7", Some("origin-1".to_string())).unwrap();
    let report = session.run(&mocks.session_deps()).await.unwrap();

    assert_eq!(report.pages_persisted, 3);
    assert_eq!(report.products_found, 2);
    assert!(report.notified);

    let sent = mocks.router.messages_for_topic(RESULTS_CLIENT_TOPIC);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].sender, "client-7");
    assert_eq!(sent[0].correlation, "client-7");

    let payload: ResultsPayload = mocks.router.deserialize_content(&sent[0]).unwrap();
    let p2 = mocks
        .store
        .get_by_url("http://shop.com/p2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payload.id, p2.id);
    assert_eq!(payload.dborigin, "origin-1");
}

#[tokio::test]
async fn product_without_images_does_not_notify() {
    let renderer = MockRenderer::new().with_page(SEED, product_page("Blue Shirt", &[], &[]));
    let mocks = MockDeps::new(renderer);

    let mut session = CrawlSession::new(SEED, "client", Some("origin".to_string())).unwrap();
    let report = session.run(&mocks.session_deps()).await.unwrap();

    assert_eq!(report.products_found, 1);
    assert!(!report.notified);
    assert_eq!(mocks.router.send_count(), 0);
}

#[tokio::test]
async fn no_origin_suppresses_notification() {
    let renderer = MockRenderer::new().with_page(
        SEED,
        product_page("Blue Shirt", &["https://cdn.shop.com/shirt.jpg"], &[]),
    );
    let mocks = MockDeps::new(renderer);

    let mut session = CrawlSession::new(SEED, "cli", None).unwrap();
    let report = session.run(&mocks.session_deps()).await.unwrap();

    assert!(!report.notified);
    assert_eq!(mocks.router.send_count(), 0);
    assert_eq!(mocks.store.record_count(), 1);
}

#[tokio::test]
async fn failed_send_is_not_retried() {
    let renderer = MockRenderer::new()
        .with_page(SEED, product_page("One", &["https://cdn.shop.com/1.jpg"], &["/two"]))
        .with_page(
            "http://shop.com/two",
            product_page("Two", &["https://cdn.shop.com/2.jpg"], &[]),
        );
    let mocks = MockDeps::new(renderer);
    mocks.router.fail_sends(true);

    let mut session = CrawlSession::new(SEED, "client", Some("origin".to_string())).unwrap();
    let report = session.run(&mocks.session_deps()).await.unwrap();

    assert!(report.notified);
    assert_eq!(report.pages_persisted, 2);
    assert_eq!(mocks.router.send_count(), 1);
}

#[tokio::test]
async fn quick_mode_caps_at_five_pages() {
    let links: Vec<String> = (1..=8).map(|i| format!("/page-{i}")).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();

    let renderer = MockRenderer::new().with_page(SEED, plain_page("Home", &link_refs));
    for link in &links {
        renderer.add_page(format!("http://shop.com{link}"), plain_page(link, &link_refs));
    }
    let mocks = MockDeps::new(renderer);

    let mut session = CrawlSession::new(SEED, "client", None).unwrap().quick();
    let report = session.run(&mocks.session_deps()).await.unwrap();

    assert_eq!(session.state(), SessionState::Done);
    assert_eq!(report.pages_visited, 5);
    assert!(mocks.renderer.call_count() <= 5);
}

#[tokio::test]
async fn frontier_exhaustion_reaches_done() {
    let renderer = MockRenderer::new()
        .with_page(SEED, plain_page("Home", &["/a", "/b#reviews", "/a"]))
        .with_page("http://shop.com/a", plain_page("A", &["/", "/b"]))
        .with_page("http://shop.com/b", plain_page("B", &["/a"]));
    let mocks = MockDeps::new(renderer);

    let mut session = CrawlSession::new(SEED, "client", None).unwrap();
    let report = session.run(&mocks.session_deps()).await.unwrap();

    assert_eq!(session.state(), SessionState::Done);
    assert_eq!(
        mocks.renderer.calls(),
        vec![SEED, "http://shop.com/a", "http://shop.com/b"]
    );
    assert_eq!(report.pages_visited, 3);
}

#[tokio::test]
async fn login_pages_are_skipped_without_expansion() {
    let renderer = MockRenderer::new()
        .with_page(SEED, plain_page("Home", &["/account/login", "/products"]))
        .with_page("http://shop.com/account/login", plain_page("Login", &["/secret"]))
        .with_page("http://shop.com/products", plain_page("Products", &[]))
        .with_page("http://shop.com/secret", plain_page("Secret", &[]));
    let mocks = MockDeps::new(renderer);

    let mut session = CrawlSession::new(SEED, "client", None).unwrap();
    let report = session.run(&mocks.session_deps()).await.unwrap();

    let calls = mocks.renderer.calls();
    assert!(!calls.iter().any(|u| u.contains("login")));
    assert!(!calls.iter().any(|u| u.contains("secret")));
    assert!(calls.contains(&"http://shop.com/products".to_string()));
    assert_eq!(report.pages_skipped, 1);
}

#[tokio::test]
async fn robots_disallowed_page_is_skipped_without_expansion() {
    let renderer = MockRenderer::new()
        .with_page(SEED, plain_page("Home", &["/cart", "/ok"]))
        .with_page("http://shop.com/cart", plain_page("Cart", &["/hidden"]))
        .with_page("http://shop.com/ok", plain_page("Ok", &[]))
        .with_page("http://shop.com/hidden", plain_page("Hidden", &[]));
    renderer.disallow_url("http://shop.com/cart");
    let mocks = MockDeps::new(renderer);

    let mut session = CrawlSession::new(SEED, "client", None).unwrap();
    let report = session.run(&mocks.session_deps()).await.unwrap();

    assert_eq!(report.pages_skipped, 1);
    assert_eq!(report.pages_persisted, 2);
    assert_eq!(session.state(), SessionState::Done);
    assert!(!mocks.renderer.calls().iter().any(|u| u.contains("hidden")));
    assert!(mocks.store.get_by_url("http://shop.com/cart").await.unwrap().is_none());
    assert!(mocks.store.get_by_url("http://shop.com/ok").await.unwrap().is_some());
}

#[tokio::test]
async fn html_dump_records_every_fetched_page() {
    let path = std::env::temp_dir()
        .join(format!("product-crawler-session-{}", uuid::Uuid::new_v4()))
        .join("pages.log");
    let renderer = MockRenderer::new()
        .with_page(SEED, plain_page("Home", &["/a", "/broken"]))
        .with_page("http://shop.com/a", plain_page("Page A", &[]));
    let mocks = MockDeps::new(renderer);
    let mut deps = mocks.session_deps();
    deps.html_dump = Some(HtmlDump::new(&path));

    let mut session = CrawlSession::new(SEED, "client", None).unwrap();
    let report = session.run(&deps).await.unwrap();

    let dumped = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(report.pages_persisted, 2);
    assert_eq!(dumped.matches("==> ").count(), 2);
    assert!(dumped.contains(&format!("==> {SEED} @ ")));
    assert!(dumped.contains("==> http://shop.com/a @ "));
    assert!(dumped.contains("<h1>Page A</h1>"));
    assert!(!dumped.contains("/broken @ "));

    if let Some(dir) = path.parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}

#[tokio::test]
async fn fetch_failure_skips_only_that_page() {
    let renderer = MockRenderer::new()
        .with_page(SEED, plain_page("Home", &["/broken", "/missing", "/ok"]))
        .with_page("http://shop.com/broken", plain_page("Broken", &[]))
        .with_page("http://shop.com/ok", plain_page("Ok", &[]));
    renderer.fail_url("http://shop.com/broken");
    let mocks = MockDeps::new(renderer);

    let mut session = CrawlSession::new(SEED, "client", None).unwrap();
    let report = session.run(&mocks.session_deps()).await.unwrap();

    assert_eq!(report.pages_skipped, 2);
    assert_eq!(report.pages_persisted, 2);
    assert!(mocks.store.get_by_url("http://shop.com/ok").await.unwrap().is_some());
    assert!(mocks.store.get_by_url("http://shop.com/broken").await.unwrap().is_none());
}

#[tokio::test]
async fn off_domain_links_are_never_fetched() {
    let renderer = MockRenderer::new()
        .with_page(
            SEED,
            plain_page(
                "Home",
                &["https://other.com/x", "http://cdn.shop.com/y", "javascript:void(0)", "/z"],
            ),
        )
        .with_page("http://shop.com/z", plain_page("Z", &[]));
    let mocks = MockDeps::new(renderer);

    let mut session = CrawlSession::new(SEED, "client", None).unwrap();
    session.run(&mocks.session_deps()).await.unwrap();

    assert_eq!(mocks.renderer.calls(), vec![SEED, "http://shop.com/z"]);
    assert!(session.has_visited("https://other.com/x"));
}

#[tokio::test]
async fn every_page_is_persisted_with_meta() {
    let renderer = MockRenderer::new()
        .with_page(SEED, plain_page("Home", &["/shirt"]))
        .with_page(
            "http://shop.com/shirt",
            product_page("Blue Shirt", &["https://cdn.shop.com/shirt.jpg"], &[]),
        );
    let mocks = MockDeps::new(renderer);

    let mut session = CrawlSession::new(SEED, "client", None).unwrap();
    session.run(&mocks.session_deps()).await.unwrap();

    let home = mocks.store.get_by_url(SEED).await.unwrap().unwrap();
    assert_eq!(home.domain, "www.shop.com");
    assert_eq!(home.meta.title.as_deref(), Some("Home"));
    assert_eq!(home.meta.headings, vec!["Home"]);
    assert!(home.product.title.is_none());
    assert!(home.images.is_empty());

    let shirt = mocks
        .store
        .get_by_url("http://shop.com/shirt")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shirt.product.title.as_deref(), Some("Blue Shirt"));
    assert_eq!(shirt.images, vec!["https://cdn.shop.com/shirt.jpg"]);
    assert_eq!(shirt.price.amount.as_deref(), Some("19.99"));
    assert_eq!(shirt.price.currency.as_deref(), Some("USD"));
}

#[tokio::test]
async fn store_unavailable_aborts_session() {
    let renderer = MockRenderer::new().with_page(SEED, plain_page("Home", &["/a"]));
    let mocks = MockDeps::new(renderer);
    mocks.store.set_unavailable(true);

    let mut session = CrawlSession::new(SEED, "client", None).unwrap();
    let err = session.run(&mocks.session_deps()).await.unwrap_err();

    assert!(matches!(err, CrawlerError::StoreUnavailable(_)));
    assert_ne!(session.state(), SessionState::Done);
    assert_eq!(mocks.renderer.call_count(), 1);
}
