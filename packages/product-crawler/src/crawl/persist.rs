//! Persistence upsert keyed by raw URL.

use tracing::debug;

use crate::domain::normalize_domain;
use crate::error::Result;
use crate::traits::UrlStore;
use crate::types::{RecordId, RecordUpdate};

/// Upsert a page record, deriving its domain from the raw URL.
///
/// Fails with `MalformedUrl` when no domain can be derived, and with
/// `StoreUnavailable` when the store fails.
pub async fn persist_page(
    store: &dyn UrlStore,
    raw_url: &str,
    update: &RecordUpdate,
) -> Result<RecordId> {
    let domain = normalize_domain(raw_url)?;
    let id = store.upsert(raw_url, &domain, update).await?;
    debug!(raw_url = %raw_url, domain = %domain, id = %id, "Persisted page");
    Ok(id)
}
