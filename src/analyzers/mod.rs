//! Document analyzers.
//!
//! Every analyzer implements [`TextAnalyzer`]: it owns its keyword tables
//! and extraction algorithm and shares only the status lifecycle with the
//! others. `analyze` never fails; internal errors become `error` results.

pub mod decision;
pub mod risk;
pub mod summary;
pub mod text;

pub use decision::DecisionAnalyzer;
pub use risk::RiskAnalyzer;
pub use summary::SummaryAnalyzer;

use crate::backend::Generator;
use crate::error::AnalyzerError;
use crate::models::{AnalyzerStatus, StatusSnapshot};
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, warn};

/// Model label reported when no completion backend is configured.
pub const HEURISTIC_MODEL: &str = "heuristic";

/// Lock-free status slot owned by a single analyzer.
#[derive(Debug, Default)]
pub struct StatusCell(AtomicU8);

impl StatusCell {
    pub fn get(&self) -> AnalyzerStatus {
        match self.0.load(Ordering::Acquire) {
            1 => AnalyzerStatus::Analyzing,
            2 => AnalyzerStatus::Completed,
            3 => AnalyzerStatus::Error,
            _ => AnalyzerStatus::Ready,
        }
    }

    pub fn set(&self, status: AnalyzerStatus) {
        let raw = match status {
            AnalyzerStatus::Ready => 0,
            AnalyzerStatus::Analyzing => 1,
            AnalyzerStatus::Completed => 2,
            AnalyzerStatus::Error => 3,
        };
        self.0.store(raw, Ordering::Release);
    }
}

/// A named unit of analysis over document text.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// Result produced by one run.
    type Output: Send;

    /// Display name, e.g. "Red Flag Detector".
    fn name(&self) -> &'static str;

    fn status_cell(&self) -> &StatusCell;

    /// Completion backend, if one was configured.
    fn generator(&self) -> Option<&Generator>;

    /// Run the extraction. Errors are converted by [`TextAnalyzer::analyze`].
    async fn extract(&self, text: &str) -> Result<Self::Output, AnalyzerError>;

    /// Build the `error`-status result carrying `message`.
    fn failure(&self, message: String) -> Self::Output;

    /// Analyze `text`, driving the status lifecycle. Never fails.
    ///
    /// A panic in `extract` (or in the backend it awaits) is contained here
    /// and reported like any other analyzer error.
    async fn analyze(&self, text: &str) -> Self::Output {
        let status = self.status_cell();
        status.set(AnalyzerStatus::Ready);
        status.set(AnalyzerStatus::Analyzing);

        let outcome = AssertUnwindSafe(self.extract(text))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(AnalyzerError::Panicked(panic_message(payload.as_ref())))
            });

        match outcome {
            Ok(output) => {
                status.set(AnalyzerStatus::Completed);
                debug!("{} completed", self.name());
                output
            }
            Err(e) => {
                status.set(AnalyzerStatus::Error);
                warn!("{} failed: {}", self.name(), e);
                self.failure(e.to_string())
            }
        }
    }

    /// Reset the status to `ready`.
    fn reset(&self) {
        self.status_cell().set(AnalyzerStatus::Ready);
    }

    /// Snapshot of `{name, status, model}`.
    fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            name: self.name().to_string(),
            status: self.status_cell().get(),
            model: self
                .generator()
                .map_or(HEURISTIC_MODEL, Generator::model)
                .to_string(),
        }
    }
}

/// Text of a panic payload, for error messages.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Ask the backend and reject blank answers.
pub(crate) async fn generate_nonempty(
    generator: &Generator,
    prompt: &str,
) -> Result<String, AnalyzerError> {
    let response = generator.generate(prompt).await?;
    if response.trim().is_empty() {
        return Err(AnalyzerError::EmptyResponse);
    }
    Ok(response)
}
