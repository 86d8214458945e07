//! Error types for analyzers and completion backends.

use thiserror::Error;

/// Errors raised by a completion backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request exceeded the configured timeout.
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// The backend could not be reached.
    #[error("Cannot connect to Ollama at {0}. Is Ollama running?")]
    Connect(String),

    /// The backend answered with a non-success status.
    #[error("Ollama API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The request failed for another transport reason.
    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("Failed to parse Ollama response: {0}")]
    InvalidResponse(String),
}

/// Errors that can occur inside an analyzer.
///
/// These never escape `TextAnalyzer::analyze`; they are turned into
/// `error`-status results.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The completion backend failed.
    #[error("completion backend failed: {0}")]
    Backend(#[from] BackendError),

    /// The backend returned nothing usable.
    #[error("completion backend returned an empty response")]
    EmptyResponse,

    /// The extraction code panicked.
    #[error("analyzer panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_messages() {
        assert_eq!(
            BackendError::Timeout(30).to_string(),
            "Request timed out after 30s"
        );
        let err = BackendError::Api {
            status: 500,
            body: "oops".to_string(),
        };
        assert_eq!(err.to_string(), "Ollama API error 500: oops");
    }

    #[test]
    fn test_analyzer_error_wraps_backend() {
        let err: AnalyzerError = BackendError::Connect("http://x".to_string()).into();
        assert!(err.to_string().starts_with("completion backend failed"));
        assert!(err.to_string().contains("http://x"));
    }
}
