//! Optional generative completion backends.
//!
//! Analyzers run their local heuristics unless a [`Generator`] is handed
//! to them, in which case they delegate extraction to the backend.

#[cfg(test)]
pub mod mock;
pub mod ollama;

pub use ollama::{OllamaBackend, OllamaConfig};

use crate::error::BackendError;
use async_trait::async_trait;
use std::sync::Arc;

/// A service that turns a prompt into generated text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short identifier of the backend, used in logs.
    fn name(&self) -> &str;

    /// Generate a completion for `prompt` using `model`.
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, BackendError>;
}

/// A configured backend together with the model it should use.
///
/// `Option<Generator>` is the only representation of "backend or not".
#[derive(Clone)]
pub struct Generator {
    backend: Arc<dyn CompletionBackend>,
    model: String,
}

impl Generator {
    pub fn new(backend: Arc<dyn CompletionBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Model name passed to every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt to the backend.
    pub async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        tracing::debug!(
            "Sending {} char prompt to {} ({})",
            prompt.chars().count(),
            self.backend.name(),
            self.model
        );
        self.backend.generate(prompt, &self.model).await
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("backend", &self.backend.name())
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockBackend;
    use super::*;

    #[tokio::test]
    async fn test_generator_forwards_model() {
        let mock = Arc::new(MockBackend::with_response("hello"));
        let generator = Generator::new(mock.clone(), "llama3");

        let out = generator.generate("prompt text").await.unwrap();

        assert_eq!(out, "hello");
        assert_eq!(generator.model(), "llama3");
        assert_eq!(mock.calls(), vec![("prompt text".to_string(), "llama3".to_string())]);
    }

    #[test]
    fn test_generator_debug_hides_backend_internals() {
        let generator = Generator::new(Arc::new(MockBackend::with_response("x")), "m");
        let debug = format!("{:?}", generator);
        assert!(debug.contains("mock"));
        assert!(debug.contains("\"m\""));
    }
}
