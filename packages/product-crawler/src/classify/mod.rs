//! Product detection and extraction.
//!
//! A rendered page is classified by the markup convention it uses to
//! describe a product, in decreasing order of trust:
//!
//! 1. OpenGraph `og:type=product` meta tag
//! 2. JSON-LD block with `"@type": "Product"`
//! 3. Generic `application/json` block carrying a `product` key
//!
//! The detected [`SourceType`] selects the extraction strategy (see [`extract`]).

pub mod extract;
pub mod page;

pub use extract::{extract, ProductExtraction};
pub use page::{analyze, PageAnalysis};

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::warn;

use crate::error::CrawlerError;
use crate::types::{ProductLikelihood, SourceType};

pub(crate) const LD_JSON: &str = "application/ld+json";
pub(crate) const PLAIN_JSON: &str = "application/json";

/// Classify a parsed document. First match wins.
pub fn classify(document: &Html) -> ProductLikelihood {
    if has_open_graph_product(document) {
        return ProductLikelihood::certain(SourceType::OpenGraph);
    }

    if structured_blocks(document, LD_JSON).any(|block| is_product_type(&block)) {
        return ProductLikelihood::certain(SourceType::JsonLdProduct);
    }

    if structured_blocks(document, PLAIN_JSON)
        .any(|block| block.get("product").is_some_and(is_truthy))
    {
        return ProductLikelihood::certain(SourceType::GenericJson);
    }

    ProductLikelihood::unknown()
}

fn has_open_graph_product(document: &Html) -> bool {
    meta_contents(document, "og:type")
        .iter()
        .any(|content| content.trim().eq_ignore_ascii_case("product"))
}

/// `content` attribute of every `<meta property=...>` with the given property, in document order.
pub(crate) fn meta_contents(document: &Html, property: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("meta[property]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|el| el.value().attr("property") == Some(property))
        .filter_map(|el| el.value().attr("content"))
        .map(|content| content.to_string())
        .collect()
}

/// First `content` for a meta property, if the tag exists.
pub(crate) fn first_meta_content(document: &Html, property: &str) -> Option<String> {
    meta_contents(document, property).into_iter().next()
}

/// Parsed JSON of every `<script type=...>` block of the given type.
///
/// Blocks that fail to parse are logged and skipped individually.
pub(crate) fn structured_blocks<'a>(
    document: &'a Html,
    script_type: &'a str,
) -> impl Iterator<Item = Value> + 'a {
    let selector = Selector::parse("script[type]").ok();

    selector
        .into_iter()
        .flat_map(move |selector| {
            document
                .select(&selector)
                .filter(|el| {
                    el.value()
                        .attr("type")
                        .is_some_and(|t| t.trim().eq_ignore_ascii_case(script_type))
                })
                .map(|el| el.text().collect::<String>())
                .collect::<Vec<_>>()
        })
        .filter_map(move |raw| match parse_block(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(script_type = %script_type, error = %e, "Skipping malformed structured-data block");
                None
            }
        })
}

fn parse_block(raw: &str) -> Result<Value, CrawlerError> {
    Ok(serde_json::from_str(raw.trim())?)
}

pub(crate) fn is_product_type(block: &Value) -> bool {
    block.get("@type").and_then(Value::as_str) == Some("Product")
}

/// JSON truthiness: present, non-null, non-empty, non-zero, non-false.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
