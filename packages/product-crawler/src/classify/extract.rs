//! Product extraction strategies, one per [`SourceType`].

use scraper::Html;
use serde_json::Value;
use tracing::debug;

use super::{first_meta_content, is_product_type, meta_contents, structured_blocks, LD_JSON};
use crate::types::{PriceInfo, ProductInfo, ProductLikelihood, SourceType};

/// `@context` values accepted on a JSON-LD product block.
const SCHEMA_ORG_CONTEXTS: &[&str] = &["http://schema.org/", "https://schema.org"];

/// Everything extracted from a product page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductExtraction {
    pub product: ProductInfo,
    pub price: PriceInfo,
    /// Discovery order, duplicates kept
    pub images: Vec<String>,
}

impl ProductExtraction {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

type ExtractFn = fn(&Html) -> ProductExtraction;

/// Strategy table keyed by source type.
const STRATEGIES: &[(SourceType, ExtractFn)] = &[
    (SourceType::OpenGraph, extract_open_graph),
    (SourceType::JsonLdProduct, extract_json_ld),
    (SourceType::GenericJson, extract_generic_json),
];

/// Run the strategy for the page's detected source type.
///
/// Unknown source types yield an empty extraction. Callers gate on
/// [`ProductLikelihood::should_extract`] before calling.
pub fn extract(document: &Html, likelihood: &ProductLikelihood) -> ProductExtraction {
    STRATEGIES
        .iter()
        .find(|(source_type, _)| *source_type == likelihood.source_type)
        .map(|(_, strategy)| strategy(document))
        .unwrap_or_default()
}

fn extract_open_graph(document: &Html) -> ProductExtraction {
    let non_blank = |s: String| if s.trim().is_empty() { None } else { Some(s) };

    ProductExtraction {
        product: ProductInfo {
            title: first_meta_content(document, "og:title").and_then(non_blank),
            description: first_meta_content(document, "og:description").and_then(non_blank),
            brand: None,
        },
        price: PriceInfo {
            amount: first_meta_content(document, "product:price:amount").and_then(non_blank),
            currency: first_meta_content(document, "product:price:currency").and_then(non_blank),
        },
        images: meta_contents(document, "og:image")
            .into_iter()
            .filter(|src| !src.trim().is_empty())
            .collect(),
    }
}

fn extract_json_ld(document: &Html) -> ProductExtraction {
    let Some(block) = structured_blocks(document, LD_JSON)
        .filter(Value::is_object)
        .find(|block| is_product_type(block) && has_schema_org_context(block))
    else {
        debug!("No schema.org Product block found");
        return ProductExtraction::default();
    };

    ProductExtraction {
        product: ProductInfo {
            title: string_field(&block, "name"),
            description: string_field(&block, "description"),
            brand: json_ld_brand(&block),
        },
        price: json_ld_price(&block).unwrap_or_default(),
        images: json_ld_images(&block),
    }
}

/// Generic JSON product blobs have no stable schema; detection only.
fn extract_generic_json(_document: &Html) -> ProductExtraction {
    ProductExtraction::default()
}

fn has_schema_org_context(block: &Value) -> bool {
    block
        .get("@context")
        .and_then(Value::as_str)
        .is_some_and(|ctx| SCHEMA_ORG_CONTEXTS.contains(&ctx))
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn json_ld_images(block: &Value) -> Vec<String> {
    // A lone string image is ignored; only lists are collected
    block
        .get("image")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn json_ld_price(block: &Value) -> Option<PriceInfo> {
    let offers = block.get("offers")?.as_array()?;

    offers.iter().find_map(|offer| {
        let amount = match offer.get("price")? {
            Value::String(s) if !s.trim().is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(PriceInfo {
            amount: Some(amount),
            currency: string_field(offer, "priceCurrency"),
        })
    })
}

fn json_ld_brand(block: &Value) -> Option<String> {
    let brand = block.get("brand")?;
    brand.get("@type")?;
    string_field(brand, "name")
}
