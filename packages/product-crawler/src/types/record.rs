//! Persisted URL records and partial updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Identifier of a persisted URL record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Page-level metadata captured for every fetched page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub title: Option<String>,
    pub url: String,
    pub paragraphs: Vec<String>,
    pub headings: Vec<String>,
    /// `product:*` meta properties with the prefix stripped
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub product_tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl ProductInfo {
    /// True when a non-blank title was extracted.
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// A persisted record, keyed by its raw URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: RecordId,
    pub raw_url: String,
    /// Always `normalize_domain(raw_url)`
    pub domain: String,
    pub last_scrape_time: DateTime<Utc>,
    pub meta: PageMeta,
    pub product: ProductInfo,
    pub price: PriceInfo,
    /// Discovery order, not deduplicated
    pub images: Vec<String>,
}

impl UrlRecord {
    /// Build a fresh record from an update; omitted fields default to empty.
    pub fn from_update(raw_url: &str, domain: &str, update: &RecordUpdate) -> Self {
        Self {
            id: RecordId::new(),
            raw_url: raw_url.to_string(),
            domain: domain.to_string(),
            last_scrape_time: update.last_scrape_time,
            meta: update.meta.clone().unwrap_or_default(),
            product: update.product.clone().unwrap_or_default(),
            price: update.price.clone().unwrap_or_default(),
            images: update.images.clone().unwrap_or_default(),
        }
    }

    /// Overwrite only the fields the update supplies.
    pub fn apply(&mut self, domain: &str, update: &RecordUpdate) {
        self.domain = domain.to_string();
        self.last_scrape_time = update.last_scrape_time;
        if let Some(meta) = &update.meta {
            self.meta = meta.clone();
        }
        if let Some(product) = &update.product {
            self.product = product.clone();
        }
        if let Some(price) = &update.price {
            self.price = price.clone();
        }
        if let Some(images) = &update.images {
            self.images = images.clone();
        }
    }
}

/// Latest crawl metadata for one URL; `None` fields leave stored values alone.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    pub last_scrape_time: DateTime<Utc>,
    pub meta: Option<PageMeta>,
    pub product: Option<ProductInfo>,
    pub price: Option<PriceInfo>,
    pub images: Option<Vec<String>>,
}

impl RecordUpdate {
    pub fn new(last_scrape_time: DateTime<Utc>) -> Self {
        Self {
            last_scrape_time,
            meta: None,
            product: None,
            price: None,
            images: None,
        }
    }

    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_product(mut self, product: ProductInfo) -> Self {
        self.product = Some(product);
        self
    }

    pub fn with_price(mut self, price: PriceInfo) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }

    /// A product with a title and at least one image qualifies for notification.
    pub fn is_qualifying_product(&self) -> bool {
        let titled = self.product.as_ref().is_some_and(ProductInfo::has_title);
        let imaged = self.images.as_ref().is_some_and(|images| !images.is_empty());
        titled && imaged
    }
}
