//! Multi-analyzer orchestration.
//!
//! The orchestrator owns one analyzer of each kind, runs them concurrently
//! over the same text, and folds their results into an
//! [`AggregatedReport`]. Results are always read in the order summary,
//! risk, decision, whatever order the analyzers finish in.

use super::aggregator::aggregate;
use crate::analyzers::{
    panic_message, DecisionAnalyzer, RiskAnalyzer, SummaryAnalyzer, TextAnalyzer,
};
use crate::backend::Generator;
use crate::models::{
    AggregatedReport, AnalyzerStatus, DecisionResult, RiskResult, StatusSnapshot, SummaryResult,
};
use futures::FutureExt;
use std::collections::{BTreeMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info};

/// Number of past reports kept in memory.
pub const HISTORY_LIMIT: usize = 10;

/// Folds the three analyzer results (and the original text) into a report.
type AggregateFn = fn(&SummaryResult, &RiskResult, &DecisionResult, &str) -> AggregatedReport;

pub struct Orchestrator {
    summary: SummaryAnalyzer,
    risk: RiskAnalyzer,
    decision: DecisionAnalyzer,
    aggregate: AggregateFn,
    history: Mutex<VecDeque<AggregatedReport>>,
}

impl Orchestrator {
    /// Build the analyzer set. `None` selects the heuristic path everywhere.
    pub fn new(generator: Option<Generator>) -> Self {
        match &generator {
            Some(g) => info!("Analyzers will delegate to model {}", g.model()),
            None => debug!("No completion backend configured, using heuristics"),
        }

        Self {
            summary: SummaryAnalyzer::new(generator.clone()),
            risk: RiskAnalyzer::new(generator.clone()),
            decision: DecisionAnalyzer::new(generator),
            aggregate,
            history: Mutex::new(VecDeque::with_capacity(HISTORY_LIMIT)),
        }
    }

    #[cfg(test)]
    fn with_aggregator(generator: Option<Generator>, aggregate: AggregateFn) -> Self {
        Self {
            aggregate,
            ..Self::new(generator)
        }
    }

    /// Analyze one document with every analyzer and aggregate the results.
    ///
    /// Never fails. Analyzer errors and panics stay inside their analyzer
    /// and show up as `error` entries in [`AggregatedReport::analyzers`].
    /// A fault in the orchestration itself (joining or aggregating) yields
    /// a report with `status = error`.
    pub async fn analyze_document(&self, text: &str) -> AggregatedReport {
        info!(
            "Analyzing document ({} chars) with 3 analyzers",
            text.chars().count()
        );

        self.summary.reset();
        self.risk.reset();
        self.decision.reset();

        match AssertUnwindSafe(self.run(text)).catch_unwind().await {
            Ok(report) => {
                self.record(report.clone());
                report
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Analysis failed: {}", message);
                self.abandon_in_flight();
                AggregatedReport::failed(message)
            }
        }
    }

    async fn run(&self, text: &str) -> AggregatedReport {
        let (summary, risk, decision) = futures::join!(
            self.summary.analyze(text),
            self.risk.analyze(text),
            self.decision.analyze(text),
        );

        debug!(
            "Analyzer results: summary={} risk={} ({} flags) decision={} ({} decisions)",
            summary.status, risk.status, risk.total_flags, decision.status, decision.total_decisions
        );

        let report = (self.aggregate)(&summary, &risk, &decision, text);

        if let Some(insights) = &report.collaborative_insights {
            info!(
                "Aggregated: risk {} | urgency {} | complexity {} | confidence {:.2}",
                insights.risk_level, insights.urgency, insights.complexity, insights.confidence_score
            );
        }

        report
    }

    /// Append to history, dropping the oldest past the limit.
    fn record(&self, report: AggregatedReport) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.push_back(report);
        while history.len() > HISTORY_LIMIT {
            history.pop_front();
        }
    }

    /// Analyzers interrupted by an orchestration fault end in `error`.
    fn abandon_in_flight(&self) {
        for cell in [
            self.summary.status_cell(),
            self.risk.status_cell(),
            self.decision.status_cell(),
        ] {
            if matches!(cell.get(), AnalyzerStatus::Ready | AnalyzerStatus::Analyzing) {
                cell.set(AnalyzerStatus::Error);
            }
        }
    }

    /// Snapshot of every analyzer's `{name, status, model}`.
    pub fn status(&self) -> BTreeMap<&'static str, StatusSnapshot> {
        BTreeMap::from([
            ("summary", self.summary.status()),
            ("risk", self.risk.status()),
            ("decision", self.decision.status()),
        ])
    }

    /// The most recent reports, oldest first.
    pub fn history(&self) -> Vec<AggregatedReport> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::backend::CompletionBackend;
    use crate::error::BackendError;
    use crate::models::{Complexity, RiskLevel, Urgency};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;

    const FILLER: &str = " Members of the garden club spent the afternoon planting tulips along the northern path near the old stone bridge. ";

    const QUIET_DOC: &str = "The garden club met on a sunny afternoon in spring. \
        Members planted tulips along the northern path of the park. \
        Several volunteers brought tools from their own sheds. \
        The children painted small wooden signs for each flower bed. \
        Lunch was served under the old oak tree near the pond. \
        Everyone went home tired but happy after the long day.";

    fn risky_doc() -> String {
        let cycle = format!(
            "A lawsuit was filed.{f}A breach was found.{f}It is critical.{f}",
            f = FILLER
        );
        cycle.repeat(3)
    }

    /// Panics on the summary prompt and answers the others normally.
    struct SummaryPanicBackend;

    #[async_trait]
    impl CompletionBackend for SummaryPanicBackend {
        fn name(&self) -> &str {
            "summary-panic"
        }

        async fn generate(&self, prompt: &str, _model: &str) -> Result<String, BackendError> {
            if prompt.starts_with("Write a concise") {
                panic!("summary backend blew up");
            }
            Ok("- Decision: sign the lease\nRisk: none flagged".to_string())
        }
    }

    fn exploding_aggregate(
        _summary: &SummaryResult,
        _risk: &RiskResult,
        _decision: &DecisionResult,
        _text: &str,
    ) -> AggregatedReport {
        panic!("aggregation exploded")
    }

    /// Answers only once all three analyzers are waiting, so it deadlocks
    /// unless the analyzers run concurrently.
    struct BarrierBackend {
        barrier: Barrier,
    }

    #[async_trait]
    impl CompletionBackend for BarrierBackend {
        fn name(&self) -> &str {
            "barrier"
        }

        async fn generate(&self, _prompt: &str, _model: &str) -> Result<String, BackendError> {
            self.barrier.wait().await;
            Ok("- Action: proceed with the plan".to_string())
        }
    }

    #[tokio::test]
    async fn test_plain_text_scenario() {
        let orchestrator = Orchestrator::new(None);
        let report = orchestrator.analyze_document("Members planted tulips.").await;

        assert!(report.is_completed());
        assert!(report.red_flags.is_empty());
        assert!(report.decisions.is_empty());

        let insights = report.collaborative_insights.unwrap();
        assert_eq!(insights.risk_level, RiskLevel::Low);
        assert_eq!(insights.urgency, Urgency::Normal);
        assert_eq!(insights.complexity, Complexity::Low);
        assert!(!insights.requires_attention);
        assert!(!insights.has_action_items);
        assert_eq!(insights.confidence_score, 0.7);
    }

    #[tokio::test]
    async fn test_risky_document_scenario() {
        let orchestrator = Orchestrator::new(None);
        let report = orchestrator.analyze_document(&risky_doc()).await;

        assert!(report.red_flags.len() > 5);
        assert!(report.decisions.is_empty());
        assert_eq!(report.severity_breakdown.high, report.red_flags.len());

        let insights = report.collaborative_insights.unwrap();
        assert_eq!(insights.risk_level, RiskLevel::High);
        assert_eq!(insights.urgency, Urgency::High);
        assert_eq!(insights.confidence_score, 0.9);
    }

    #[tokio::test]
    async fn test_deadline_scenario() {
        let orchestrator = Orchestrator::new(None);
        let report = orchestrator
            .analyze_document("The deadline is 12/31/2024. The team must deliver the report.")
            .await;

        assert!(report
            .decisions
            .iter()
            .any(|d| d.contains("The team must deliver the report")));
        assert_eq!(report.deadlines, vec!["📅 Deadline: 12/31/2024"]);
        assert_eq!(
            report.collaborative_insights.unwrap().urgency,
            Urgency::High
        );
    }

    #[tokio::test]
    async fn test_quiet_long_document_scenario() {
        let orchestrator = Orchestrator::new(None);
        let report = orchestrator.analyze_document(QUIET_DOC).await;

        assert_eq!(
            report.summary,
            "The garden club met on a sunny afternoon in spring. \
             Several volunteers brought tools from their own sheds. \
             The children painted small wooden signs for each flower bed. \
             Everyone went home tired but happy after the long day."
        );
        assert!(report.red_flags.is_empty());
        assert!(report.decisions.is_empty());
        let insights = report.collaborative_insights.unwrap();
        assert_eq!(insights.complexity, Complexity::Low);
        assert_eq!(insights.confidence_score, 0.8);
    }

    #[tokio::test]
    async fn test_same_text_twice_gives_identical_reports() {
        let orchestrator = Orchestrator::new(None);
        let text = risky_doc();

        let first = orchestrator.analyze_document(&text).await;
        let second = orchestrator.analyze_document(&text).await;

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_history_keeps_last_ten() {
        let orchestrator = Orchestrator::new(None);

        for i in 1..=12 {
            let text = "word ".repeat(i);
            orchestrator.analyze_document(&text).await;
        }

        let history = orchestrator.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        let word_counts: Vec<usize> = history
            .iter()
            .map(|r| r.statistics.as_ref().unwrap().word_count)
            .collect();
        assert_eq!(word_counts, (3..=12).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_status_after_run() {
        let orchestrator = Orchestrator::new(None);
        assert!(orchestrator
            .status()
            .values()
            .all(|s| s.status == AnalyzerStatus::Ready));

        orchestrator.analyze_document("Some text.").await;

        let status = orchestrator.status();
        assert_eq!(status.len(), 3);
        assert_eq!(status["risk"].name, "Red Flag Detector");
        assert_eq!(status["decision"].model, "heuristic");
        assert!(status.values().all(|s| s.status == AnalyzerStatus::Completed));
    }

    #[tokio::test]
    async fn test_analyzers_run_concurrently() {
        let backend = Arc::new(BarrierBackend {
            barrier: Barrier::new(3),
        });
        let orchestrator = Orchestrator::new(Some(Generator::new(backend, "llama3")));

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            orchestrator.analyze_document("Please proceed."),
        )
        .await
        .expect("analyzers did not run concurrently");

        assert!(report.is_completed());
        assert_eq!(report.summary, "- Action: proceed with the plan");
        assert_eq!(report.decisions, vec!["- Action: proceed with the plan"]);
        assert!(report.red_flags.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_is_isolated_per_analyzer() {
        let generator = Generator::new(Arc::new(MockBackend::failing()), "llama3");
        let orchestrator = Orchestrator::new(Some(generator));

        let report = orchestrator
            .analyze_document("The deadline is 12/31/2024.")
            .await;

        assert!(report.is_completed());
        assert!(report
            .analyzers
            .iter()
            .all(|a| a.status == AnalyzerStatus::Error && a.error.is_some()));
        assert!(report.summary.is_empty());
        assert!(report.red_flags.is_empty());
        assert!(report.decisions.is_empty());
        assert_eq!(orchestrator.history().len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_analyzer_keeps_other_results() {
        let generator = Generator::new(Arc::new(SummaryPanicBackend), "llama3");
        let orchestrator = Orchestrator::new(Some(generator));

        let report = orchestrator
            .analyze_document("We decided to sign the lease.")
            .await;

        assert!(report.is_completed());
        assert!(report.summary.is_empty());
        assert_eq!(report.decisions, vec!["- Decision: sign the lease"]);
        assert_eq!(report.red_flags, vec!["Risk: none flagged"]);

        let statuses: Vec<AnalyzerStatus> = report.analyzers.iter().map(|a| a.status).collect();
        assert_eq!(
            statuses,
            vec![
                AnalyzerStatus::Error,
                AnalyzerStatus::Completed,
                AnalyzerStatus::Completed
            ]
        );
        assert!(report.analyzers[0]
            .error
            .as_deref()
            .unwrap()
            .contains("summary backend blew up"));
        assert_eq!(orchestrator.status()["summary"].status, AnalyzerStatus::Error);
        assert_eq!(orchestrator.history().len(), 1);
    }

    #[tokio::test]
    async fn test_aggregation_fault_yields_error_report() {
        let orchestrator = Orchestrator::with_aggregator(None, exploding_aggregate);

        let report = orchestrator.analyze_document("A lawsuit was filed.").await;

        assert_eq!(report.status, AnalyzerStatus::Error);
        assert_eq!(report.error.as_deref(), Some("aggregation exploded"));
        assert!(report.summary.is_empty());
        assert!(report.red_flags.is_empty());
        assert!(report.decisions.is_empty());
        assert!(report.collaborative_insights.is_none());
        assert!(orchestrator.history().is_empty());
        assert!(orchestrator
            .status()
            .values()
            .all(|s| s.status == AnalyzerStatus::Completed));
    }

    #[tokio::test]
    async fn test_board_minutes_fixture() {
        let text = include_str!("../../fixtures/board_minutes.txt");
        let orchestrator = Orchestrator::new(None);
        let report = orchestrator.analyze_document(text).await;

        assert!(report.is_completed());
        assert!(!report.summary.is_empty());
        assert!(report.red_flags[0].starts_with("⚠️ Lawsuit:"));
        assert!(report.risk_level().unwrap() >= RiskLevel::Medium);
        assert!(report
            .decisions
            .contains(&"✅ Action: Circulate the revised budget to all directors".to_string()));
        assert!(!report.action_items.is_empty());
        assert_eq!(
            report.deadlines,
            vec!["📅 Deadline: 06/30/2025", "📅 Deadline: 30 days"]
        );
    }

    #[test]
    fn test_runs_on_a_plain_executor() {
        let orchestrator = Orchestrator::new(None);
        let report = tokio_test::block_on(orchestrator.analyze_document(""));

        assert!(report.is_completed());
        let stats = report.statistics.unwrap();
        assert_eq!(stats.document_length, 0);
        assert_eq!(stats.word_count, 0);
        assert_eq!(report.collaborative_insights.unwrap().confidence_score, 0.7);
    }
}
