//! Messaging with the routing server.

pub mod envelope;
pub mod nats;

pub use envelope::{
    BeginScrapePayload, ControlResponse, MessageEnvelope, NewUrlRequest, ResultsPayload,
    SendReceipt, BEGIN_SCRAPE_RESPONSE_TOPIC, NEW_URL_TOPIC, RESULTS_CLIENT_TOPIC,
};
pub use nats::{DisabledRouter, NatsRouter, TestRouter};
