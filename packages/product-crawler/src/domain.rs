//! Domain normalization.
//!
//! Every lookup and insert keys records by the same canonical domain, so
//! freshness checks and upserts always agree. The rule: strip the protocol,
//! keep everything up to the first `/`, lowercase it, and force a `www.` prefix.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::error::{CrawlerError, Result};

lazy_static! {
    // (protocol://)?host(/...)?
    static ref HOST_PATTERN: Regex =
        Regex::new(r"^\s*(?:[A-Za-z][A-Za-z0-9+.\-]*://)?([^/?#\s]+)").expect("valid host pattern");
}

const WWW_PREFIX: &str = "www.";

/// Derive the canonical domain key for any URL form.
///
/// ```
/// use product_crawler::domain::normalize_domain;
///
/// assert_eq!(normalize_domain("https://shop.example.com/p/1").unwrap(), "www.shop.example.com");
/// assert_eq!(normalize_domain("www.example.com").unwrap(), "www.example.com");
/// ```
pub fn normalize_domain(url: &str) -> Result<String> {
    let host = HOST_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .ok_or_else(|| CrawlerError::malformed(url))?;

    // A bare "www." or a scheme with nothing after it carries no host
    if host.trim_start_matches(WWW_PREFIX).is_empty() || host.ends_with(':') {
        return Err(CrawlerError::malformed(url));
    }

    if host.starts_with(WWW_PREFIX) {
        Ok(host)
    } else {
        Ok(format!("{WWW_PREFIX}{host}"))
    }
}

/// Prefix `http://` onto seeds that carry neither `http://` nor `https://`.
///
/// The scheme check ignores case.
pub fn ensure_scheme(url: &str) -> String {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Canonical form of a seed URL: scheme defaulted, parsed, fragment dropped.
///
/// `shop.com`, `http://shop.com` and `HTTP://shop.com/#top` all become
/// `http://shop.com/`. Input that does not parse is returned scheme-normalized.
pub fn canonical_seed(url: &str) -> String {
    let seed = ensure_scheme(url);
    match Url::parse(&seed) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => seed,
    }
}

/// Log-in and authentication pages are skipped by URL substring.
pub fn is_login_page(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("login") || lower.contains("auth")
}
