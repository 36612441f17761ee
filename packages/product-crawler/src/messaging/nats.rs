//! Routing server clients for production and testing.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::debug;

use super::{MessageEnvelope, SendReceipt};
use crate::error::{MessagingError, MessagingResult};
use crate::traits::MessageRouter;

/// Routing server reached over NATS request/reply.
pub struct NatsRouter {
    client: async_nats::Client,
    subject: String,
}

impl NatsRouter {
    pub fn new(client: async_nats::Client, subject: impl Into<String>) -> Self {
        Self {
            client,
            subject: subject.into(),
        }
    }

    /// Connect to the routing server.
    pub async fn connect(server: &str, subject: impl Into<String>) -> MessagingResult<Self> {
        let client = async_nats::connect(server)
            .await
            .map_err(|e| MessagingError::Transport(Box::new(e)))?;
        Ok(Self::new(client, subject))
    }
}

#[async_trait]
impl MessageRouter for NatsRouter {
    async fn send(&self, message: &MessageEnvelope) -> MessagingResult<SendReceipt> {
        let payload = Bytes::from(serde_json::to_vec(message)?);

        let reply = self
            .client
            .request(self.subject.clone(), payload)
            .await
            .map_err(|e| MessagingError::Transport(Box::new(e)))?;

        let receipt: SendReceipt = serde_json::from_slice(&reply.payload)?;
        debug!(subject = %self.subject, topic = %message.topic, success = receipt.success, "Routing server replied");

        if !receipt.success {
            return Err(MessagingError::Rejected {
                topic: message.topic.clone(),
            });
        }
        Ok(receipt)
    }
}

/// Router used when no routing server is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRouter;

#[async_trait]
impl MessageRouter for DisabledRouter {
    async fn send(&self, _message: &MessageEnvelope) -> MessagingResult<SendReceipt> {
        Err(MessagingError::NotConfigured)
    }
}

/// Router that records every envelope for test inspection.
#[derive(Default)]
pub struct TestRouter {
    sent: RwLock<Vec<MessageEnvelope>>,
    fail_sends: AtomicBool,
}

impl TestRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail after recording the envelope.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Get all sent messages.
    pub fn sent_messages(&self) -> Vec<MessageEnvelope> {
        self.sent.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Get sent messages for a topic.
    pub fn messages_for_topic(&self, topic: &str) -> Vec<MessageEnvelope> {
        self.sent
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    pub fn send_count(&self) -> usize {
        self.sent.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Deserialize a message's content as JSON.
    pub fn deserialize_content<T: serde::de::DeserializeOwned>(
        &self,
        msg: &MessageEnvelope,
    ) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_str(&msg.content)
    }
}

#[async_trait]
impl MessageRouter for TestRouter {
    async fn send(&self, message: &MessageEnvelope) -> MessagingResult<SendReceipt> {
        self.sent
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());

        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(MessagingError::Transport("routing server unreachable".into()));
        }
        Ok(SendReceipt { success: true })
    }
}
