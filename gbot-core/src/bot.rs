//! Bot abstraction for message-level actions.
//!
//! [`Bot`] is transport-agnostic; `groupme_client::GroupMeClient` implements it over the REST API.

use async_trait::async_trait;

use crate::error::Result;

/// Message actions a handler may take. Each returns `Ok(true)` when the platform accepted it.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Posts `text` to the group the bot belongs to.
    async fn send_message(&self, text: &str) -> Result<bool>;
    async fn delete_message(&self, group_id: &str, message_id: &str) -> Result<bool>;
    async fn like_message(&self, conversation_id: &str, message_id: &str) -> Result<bool>;
    async fn unlike_message(&self, conversation_id: &str, message_id: &str) -> Result<bool>;
}
