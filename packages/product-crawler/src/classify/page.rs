//! Per-page analysis: metadata capture, classification, extraction and link discovery.
//!
//! Everything here runs synchronously on a parsed [`Html`] that never crosses
//! an `.await`.

use std::collections::BTreeMap;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{classify, extract, ProductExtraction};
use crate::traits::RenderedPage;
use crate::types::{PageMeta, ProductLikelihood};

/// Result of analyzing one rendered page.
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    pub meta: PageMeta,
    pub likelihood: ProductLikelihood,
    /// Present only when the likelihood clears the extraction threshold
    pub extraction: Option<ProductExtraction>,
    /// Absolute hyperlink targets, in discovery order
    pub links: Vec<String>,
}

/// Analyze a rendered page in one pass over its DOM.
pub fn analyze(page: &RenderedPage) -> PageAnalysis {
    let document = page.document();

    let likelihood = if page.html.trim().is_empty() {
        debug!(url = %page.url, "Empty page, nothing to classify");
        ProductLikelihood::unknown()
    } else {
        classify(&document)
    };
    let extraction = likelihood
        .should_extract()
        .then(|| extract(&document, &likelihood));

    PageAnalysis {
        meta: capture_meta(&document, &page.final_url),
        likelihood,
        extraction,
        links: discover_links(&document, &page.final_url),
    }
}

/// Title, paragraphs, h1-h3 headings and `product:*` meta tags.
pub fn capture_meta(document: &Html, url: &str) -> PageMeta {
    PageMeta {
        title: select_texts(document, "title").into_iter().next(),
        url: url.to_string(),
        paragraphs: select_texts(document, "p"),
        headings: select_texts(document, "h1, h2, h3"),
        product_tags: product_tags(document),
    }
}

/// Resolve every `<a href>` against the page URL, dropping the fragment.
///
/// Hrefs that cannot be resolved are skipped.
pub fn discover_links(document: &Html, page_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| base.join(href).ok())
        .map(|mut url| {
            url.set_fragment(None);
            url.to_string()
        })
        .collect()
}

fn select_texts(document: &Html, css: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .collect()
}

fn product_tags(document: &Html) -> BTreeMap<String, String> {
    let Ok(selector) = Selector::parse("meta[property]") else {
        return BTreeMap::new();
    };

    document
        .select(&selector)
        .filter_map(|el| {
            let property = el.value().attr("property")?;
            let key = property.strip_prefix("product:")?;
            let content = el.value().attr("content")?;
            Some((key.to_string(), content.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceType;

    const PRODUCT_PAGE: &str = r#"<html><head>
        <title> Blue   Shirt | Shop </title>
        <meta property="og:type" content="product">
        <meta property="og:title" content="Blue Shirt">
        <meta property="og:image" content="https://cdn.shop.com/shirt.jpg">
        <meta property="product:price:amount" content="19.99">
        </head><body>
        <h1>Blue Shirt</h1><h2>Details</h2><h4>ignored</h4>
        <p>Soft cotton.</p><p>  </p>
        <a href="/collections/shirts#top">Shirts</a>
        <a href="javascript:void(0)">Menu</a>
        <a href="https://other.com/x">Elsewhere</a>
        <a href="">Empty</a>
        </body></html>"#;

    #[test]
    fn test_analyze_empty_page() {
        let page = RenderedPage::new("https://www.shop.com/", "   ");
        let analysis = analyze(&page);

        assert_eq!(analysis.likelihood, ProductLikelihood::unknown());
        assert!(analysis.extraction.is_none());
        assert!(analysis.links.is_empty());
        assert_eq!(analysis.meta.url, "https://www.shop.com/");
    }

    #[test]
    fn test_analyze_product_page() {
        let page = RenderedPage::new("https://www.shop.com/products/shirt", PRODUCT_PAGE);
        let analysis = analyze(&page);

        assert_eq!(analysis.likelihood.source_type, SourceType::OpenGraph);
        let extraction = analysis.extraction.expect("product page is extracted");
        assert_eq!(extraction.product.title.as_deref(), Some("Blue Shirt"));
        assert_eq!(extraction.images, vec!["https://cdn.shop.com/shirt.jpg"]);

        assert_eq!(analysis.meta.title.as_deref(), Some("Blue Shirt | Shop"));
        assert_eq!(analysis.meta.headings, vec!["Blue Shirt", "Details"]);
        assert_eq!(analysis.meta.paragraphs, vec!["Soft cotton."]);
        assert_eq!(
            analysis.meta.product_tags.get("price:amount").map(String::as_str),
            Some("19.99")
        );
    }

    #[test]
    fn test_links_are_absolute_without_fragment() {
        let page = RenderedPage::new("https://www.shop.com/products/shirt", PRODUCT_PAGE);
        let links = analyze(&page).links;

        assert_eq!(
            links,
            vec![
                "https://www.shop.com/collections/shirts",
                "javascript:void(0)",
                "https://other.com/x",
            ]
        );
    }

    #[test]
    fn test_links_resolve_against_final_url() {
        let page = RenderedPage::new(
            "https://www.shop.com/old",
            r#"<a href="next">next</a>"#,
        )
        .with_final_url("https://www.shop.com/new/index.html");

        assert_eq!(analyze(&page).links, vec!["https://www.shop.com/new/next"]);
    }

    #[test]
    fn test_non_product_page_has_no_extraction() {
        let page = RenderedPage::new("https://www.shop.com/about", "<p>About us</p>");
        let analysis = analyze(&page);
        assert!(analysis.extraction.is_none());
        assert_eq!(analysis.likelihood, ProductLikelihood::unknown());
    }
}
