//! Notification emitter: at most one results message per session.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::CrawlSession;
use crate::messaging::MessageEnvelope;
use crate::traits::MessageRouter;
use crate::types::{RecordId, RecordUpdate};

/// Sends the results notification for the first qualifying product of a session.
#[derive(Clone)]
pub struct NotificationEmitter {
    router: Arc<dyn MessageRouter>,
}

impl NotificationEmitter {
    pub fn new(router: Arc<dyn MessageRouter>) -> Self {
        Self { router }
    }

    /// Notify when `update` is a qualifying product and the session has not
    /// notified yet. Returns true when a send was attempted.
    ///
    /// The session is marked notified before sending. Send failures are
    /// logged and never retried.
    pub async fn notify_if_qualifying(
        &self,
        session: &mut CrawlSession,
        record_id: RecordId,
        update: &RecordUpdate,
    ) -> bool {
        if session.notified() || !update.is_qualifying_product() {
            return false;
        }

        let Some(origin_id) = session.origin_id().map(str::to_string) else {
            debug!(seed = %session.seed(), "No origin id, notification suppressed");
            return false;
        };
        let requester = session.requester().to_string();

        session.mark_notified();

        let envelope = match MessageEnvelope::results(record_id, &origin_id, &requester) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(record_id = %record_id, error = %e, "Failed to encode results notification");
                return true;
            }
        };

        match self.router.send(&envelope).await {
            Ok(_) => info!(
                seed = %session.seed(),
                record_id = %record_id,
                dborigin = %origin_id,
                "Results notification sent"
            ),
            Err(e) => warn!(
                seed = %session.seed(),
                record_id = %record_id,
                error = %e,
                "Results notification failed, not retrying"
            ),
        }
        true
    }
}
