//! Data models for document analysis.
//!
//! This module contains the result types produced by each analyzer, the
//! aggregated report built by the orchestrator, and the derived
//! collaborative insights.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an analyzer (and of a whole run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerStatus {
    /// Idle, waiting for input.
    #[default]
    Ready,
    /// An analysis is in flight.
    Analyzing,
    /// The last analysis finished normally.
    Completed,
    /// The last analysis failed; the result carries the message.
    Error,
}

impl fmt::Display for AnalyzerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerStatus::Ready => write!(f, "ready"),
            AnalyzerStatus::Analyzing => write!(f, "analyzing"),
            AnalyzerStatus::Completed => write!(f, "completed"),
            AnalyzerStatus::Error => write!(f, "error"),
        }
    }
}

impl AnalyzerStatus {
    /// Returns an emoji representation of the status.
    pub fn emoji(&self) -> &'static str {
        match self {
            AnalyzerStatus::Ready => "⚪",
            AnalyzerStatus::Analyzing => "🔵",
            AnalyzerStatus::Completed => "✅",
            AnalyzerStatus::Error => "❌",
        }
    }
}

/// Snapshot returned by the status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Display name of the analyzer.
    pub name: String,
    /// Current lifecycle status.
    pub status: AnalyzerStatus,
    /// Model used for generation, or `heuristic`.
    pub model: String,
}

/// Basic statistics about a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStatistics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub character_count: usize,
    pub avg_words_per_sentence: f64,
}

/// Output of the summary analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Display name of the analyzer that produced this result.
    pub analyzer: String,
    pub status: AnalyzerStatus,
    /// Summary text (empty on error).
    pub summary: String,
    pub statistics: DocumentStatistics,
    /// Up to five frequent topics, title-cased.
    pub key_topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Red flags bucketed by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityBreakdown {
    /// Total number of categorized flags.
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Output of the red-flag (risk) analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub analyzer: String,
    pub status: AnalyzerStatus,
    pub red_flags: Vec<String>,
    pub total_flags: usize,
    pub severity_breakdown: SeverityBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Output of the decision analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub analyzer: String,
    pub status: AnalyzerStatus,
    pub decisions: Vec<String>,
    pub total_decisions: usize,
    /// Subset of `decisions` that read like action items.
    pub action_items: Vec<String>,
    pub deadlines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Risk level derived from the red-flag count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

impl RiskLevel {
    /// Returns an emoji representation of the risk level.
    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Low => "🟢",
            RiskLevel::Medium => "🟡",
            RiskLevel::High => "🔴",
        }
    }
}

/// Urgency derived from urgency keywords in flags and decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Normal,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Normal => write!(f, "Normal"),
            Urgency::High => write!(f, "High"),
        }
    }
}

/// Complexity derived from the combined flag and decision count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Low => write!(f, "Low"),
            Complexity::Medium => write!(f, "Medium"),
            Complexity::High => write!(f, "High"),
        }
    }
}

/// Judgments derived from the combined analyzer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborativeInsights {
    pub risk_level: RiskLevel,
    pub urgency: Urgency,
    pub complexity: Complexity,
    pub requires_attention: bool,
    pub has_action_items: bool,
    /// Always within `[0.7, 1.0]`.
    pub confidence_score: f64,
}

/// Statistics block of the aggregated report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportStatistics {
    /// Document length in characters.
    pub document_length: usize,
    pub word_count: usize,
    pub total_red_flags: usize,
    pub total_decisions: usize,
    pub key_topics: Vec<String>,
}

/// Per-analyzer outcome recorded in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerOutcome {
    pub name: String,
    pub status: AnalyzerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The merged result of one full analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedReport {
    /// `completed`, or `error` when the run itself failed.
    pub status: AnalyzerStatus,
    /// Set only for failed runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub summary: String,
    pub red_flags: Vec<String>,
    pub decisions: Vec<String>,
    pub action_items: Vec<String>,
    pub deadlines: Vec<String>,
    pub severity_breakdown: SeverityBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ReportStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_statistics: Option<DocumentStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborative_insights: Option<CollaborativeInsights>,
    pub analyzers: Vec<AnalyzerOutcome>,
}

impl AggregatedReport {
    /// Creates the top-level report for a run that failed as a whole.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: AnalyzerStatus::Error,
            error: Some(message.into()),
            summary: String::new(),
            red_flags: Vec::new(),
            decisions: Vec::new(),
            action_items: Vec::new(),
            deadlines: Vec::new(),
            severity_breakdown: SeverityBreakdown::default(),
            statistics: None,
            document_statistics: None,
            collaborative_insights: None,
            analyzers: Vec::new(),
        }
    }

    /// Returns true if the run completed.
    pub fn is_completed(&self) -> bool {
        self.status == AnalyzerStatus::Completed
    }

    /// Risk level of the run, if insights were computed.
    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.collaborative_insights.as_ref().map(|i| i.risk_level)
    }
}
