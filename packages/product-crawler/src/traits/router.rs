//! Messaging collaborator for the routing server.

use async_trait::async_trait;

use crate::error::MessagingResult;
use crate::messaging::{MessageEnvelope, SendReceipt};

#[async_trait]
pub trait MessageRouter: Send + Sync {
    /// Send one envelope and wait for the routing server's receipt.
    async fn send(&self, message: &MessageEnvelope) -> MessagingResult<SendReceipt>;
}
