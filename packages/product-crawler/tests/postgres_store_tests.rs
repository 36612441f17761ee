//! Postgres URL store against a real database.
//!
//! Run with: cargo test --test postgres_store_tests -- --ignored

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use test_context::test_context;
use uuid::Uuid;

use common::TestHarness;
use product_crawler::types::{PageMeta, PriceInfo, ProductInfo};
use product_crawler::{RecordUpdate, UrlStore};

fn unique_domain() -> String {
    format!("www.shop-{}.test", Uuid::new_v4().simple())
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

fn meta(url: &str, title: &str) -> PageMeta {
    PageMeta {
        title: Some(title.to_string()),
        url: url.to_string(),
        ..Default::default()
    }
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn upsert_overwrites_existing_record(ctx: &mut TestHarness) {
    let domain = unique_domain();
    let url = format!("http://{domain}/shirt");

    let first = ctx
        .store
        .upsert(&url, &domain, &RecordUpdate::new(at(1)).with_meta(meta(&url, "Old")))
        .await
        .unwrap();
    let second = ctx
        .store
        .upsert(&url, &domain, &RecordUpdate::new(at(2)).with_meta(meta(&url, "New")))
        .await
        .unwrap();

    assert_eq!(first, second);
    let records = ctx.store.get_by_domain(&domain).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].meta.title.as_deref(), Some("New"));
    assert_eq!(records[0].last_scrape_time, at(2));
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn meta_only_update_keeps_product_fields(ctx: &mut TestHarness) {
    let domain = unique_domain();
    let url = format!("http://{domain}/shirt");

    let product = RecordUpdate::new(at(1))
        .with_meta(meta(&url, "Blue Shirt"))
        .with_product(ProductInfo {
            title: Some("Blue Shirt".to_string()),
            ..Default::default()
        })
        .with_price(PriceInfo {
            amount: Some("19.99".to_string()),
            currency: Some("USD".to_string()),
        })
        .with_images(vec!["https://cdn.test/shirt.jpg".to_string()]);
    ctx.store.upsert(&url, &domain, &product).await.unwrap();

    let rescrape = RecordUpdate::new(at(3)).with_meta(meta(&url, "Blue Shirt v2"));
    ctx.store.upsert(&url, &domain, &rescrape).await.unwrap();

    let record = ctx.store.get_by_url(&url).await.unwrap().unwrap();
    assert_eq!(record.meta.title.as_deref(), Some("Blue Shirt v2"));
    assert_eq!(record.product.title.as_deref(), Some("Blue Shirt"));
    assert_eq!(record.price.amount.as_deref(), Some("19.99"));
    assert_eq!(record.images, vec!["https://cdn.test/shirt.jpg"]);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn insert_defaults_omitted_fields_to_empty(ctx: &mut TestHarness) {
    let domain = unique_domain();
    let url = format!("http://{domain}/");

    ctx.store
        .upsert(&url, &domain, &RecordUpdate::new(at(1)))
        .await
        .unwrap();

    let record = ctx.store.get_by_url(&url).await.unwrap().unwrap();
    assert_eq!(record.domain, domain);
    assert_eq!(record.meta, PageMeta::default());
    assert!(record.product.title.is_none());
    assert!(record.images.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn last_scrape_time_is_domain_maximum(ctx: &mut TestHarness) {
    let domain = unique_domain();

    for (path, hour) in [("a", 4), ("b", 9), ("c", 6)] {
        let url = format!("http://{domain}/{path}");
        ctx.store
            .upsert(&url, &domain, &RecordUpdate::new(at(hour)))
            .await
            .unwrap();
    }

    let last = ctx.store.last_scrape_time(&domain).await.unwrap();
    assert_eq!(last, Some(at(9)));
    assert!(ctx
        .store
        .last_scrape_time(&unique_domain())
        .await
        .unwrap()
        .is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn get_by_domain_only_returns_that_domain(ctx: &mut TestHarness) {
    let ours = unique_domain();
    let theirs = unique_domain();
    let now = Utc::now() - Duration::days(1);

    for domain in [&ours, &ours, &theirs] {
        let url = format!("http://{domain}/{}", Uuid::new_v4());
        ctx.store
            .upsert(&url, domain, &RecordUpdate::new(now))
            .await
            .unwrap();
    }

    let records = ctx.store.get_by_domain(&ours).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.domain == ours));
    assert!(ctx
        .store
        .get_by_url("http://missing.test/")
        .await
        .unwrap()
        .is_none());
}
