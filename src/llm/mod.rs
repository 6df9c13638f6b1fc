//! Language model client
//!
//! A single `send(messages) -> text` seam sits between the orchestration
//! logic and the model provider, so the Planner and Mapper stages stay pure
//! request/response transforms and tests can inject scripted responses.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::LlmConfig;

pub mod openai;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Chat-completion endpoint abstraction. Implementations enforce their own
/// request timeout but perform no retries; retry policy belongs to callers.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send an ordered list of role-tagged messages and return the assistant
    /// text. Erroring, timing out, or receiving a contentless response all
    /// fail with a descriptive error.
    async fn send(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Build the configured provider client.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>> {
    Ok(Arc::new(openai::OpenAiChatClient::new(config.clone())?))
}
