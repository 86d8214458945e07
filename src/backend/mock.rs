//! Mock backend for exercising the generation path without a server.

use super::CompletionBackend;
use crate::error::BackendError;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

enum Behavior {
    Respond(String),
    Fail,
    Panic,
}

/// Returns a canned response (or a canned failure) and records prompts.
pub struct MockBackend {
    behavior: Behavior,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Backend that always answers with `response`.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Respond(response.into()))
    }

    /// Backend whose every request fails with a connection error.
    pub fn failing() -> Self {
        Self::with_behavior(Behavior::Fail)
    }

    /// Backend that panics mid-request.
    pub fn panicking() -> Self {
        Self::with_behavior(Behavior::Panic)
    }

    /// `(prompt, model)` pairs received so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<String, BackendError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((prompt.to_string(), model.to_string()));

        // Yield once so concurrent analyzers actually interleave.
        tokio::task::yield_now().await;

        match &self.behavior {
            Behavior::Respond(text) => Ok(text.clone()),
            Behavior::Fail => Err(BackendError::Connect("mock://offline".to_string())),
            Behavior::Panic => panic!("mock backend exploded"),
        }
    }
}
