//! Wire shapes exchanged with the routing server.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::types::RecordId;

/// Inbound start-crawl request topic.
pub const NEW_URL_TOPIC: &str = "Scraper: New URL";

/// Reply topic for an accepted start-crawl request.
pub const BEGIN_SCRAPE_RESPONSE_TOPIC: &str = "Scraper: Begin Scrape Response";

/// Outbound notification topic for the first qualifying product of a session.
pub const RESULTS_CLIENT_TOPIC: &str = "Scraper: Results Client";

/// Message envelope shared by control requests and notifications.
///
/// `content` is itself a JSON document, carried as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub topic: String,
    pub content: String,
    pub sender: String,
    pub time: String,
    /// Caller correlation identity
    #[serde(rename = "match")]
    pub correlation: String,
}

impl MessageEnvelope {
    pub fn new(
        topic: impl Into<String>,
        content: impl Into<String>,
        sender: impl Into<String>,
        correlation: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            content: content.into(),
            sender: sender.into(),
            time: timestamp(Utc::now()),
            correlation: correlation.into(),
        }
    }

    /// The results notification for a persisted product record.
    pub fn results(
        record_id: RecordId,
        origin_id: &str,
        requester: &str,
    ) -> serde_json::Result<Self> {
        let content = serde_json::to_string(&ResultsPayload {
            id: record_id,
            dborigin: origin_id.to_string(),
        })?;
        Ok(Self::new(RESULTS_CLIENT_TOPIC, content, requester, requester))
    }
}

/// Routing server's answer to a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub success: bool,
}

/// Response to a control message.
///
/// Irrelevant or malformed requests get a bare `{"success": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl ControlResponse {
    pub fn bare() -> Self {
        Self {
            topic: None,
            success: true,
            content: None,
            time: None,
        }
    }

    pub fn begin_scrape(message: &str, url: &str) -> serde_json::Result<Self> {
        let content = serde_json::to_string(&BeginScrapePayload {
            message: message.to_string(),
            url: url.to_string(),
        })?;
        Ok(Self {
            topic: Some(BEGIN_SCRAPE_RESPONSE_TOPIC.to_string()),
            success: true,
            content: Some(content),
            time: Some(timestamp(Utc::now())),
        })
    }
}

/// `content` of a `Scraper: New URL` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUrlRequest {
    pub url: String,
    #[serde(default)]
    pub dborigin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsPayload {
    pub id: RecordId,
    pub dborigin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginScrapePayload {
    pub message: String,
    pub url: String,
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
