//! Document analysis.
//!
//! [`Orchestrator`] fans a document out to the three analyzers and the
//! [`aggregator`] folds their results into one report.

pub mod aggregator;
pub mod orchestrator;

pub use orchestrator::Orchestrator;
