pub mod openai;
pub mod types;

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

pub use openai::{OpenAiProvider, ProviderErrorKind};
pub use types::*;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse>;
}

/// Provider that answers from a fixed queue of replies and records every
/// request it receives. Used for offline runs and tests.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for reply in replies {
            provider.push_reply(reply);
        }
        provider
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.lock_replies().push_back(Ok(reply.into()));
    }

    /// Queue a transport-level failure instead of a reply.
    pub fn push_error(&self, message: impl Into<String>) {
        self.lock_replies().push_back(Err(message.into()));
    }

    pub fn calls(&self) -> usize {
        self.lock_requests().len()
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.lock_requests().clone()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, String>>> {
        self.replies.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<LlmRequest>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.lock_requests().push(request);
        match self.lock_replies().pop_front() {
            Some(Ok(text)) => Ok(LlmResponse::text(text)),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted provider has no reply queued")),
        }
    }
}
