//! Report aggregation and collaborative scoring.
//!
//! Fuses the three analyzer results into one report and derives the
//! risk, urgency, complexity and confidence judgments from them.

use crate::analyzers::text::{char_len, contains_any};
use crate::models::{
    AggregatedReport, AnalyzerOutcome, AnalyzerStatus, CollaborativeInsights, Complexity,
    DecisionResult, ReportStatistics, RiskLevel, RiskResult, SummaryResult, Urgency,
};

const URGENCY_KEYWORDS: &[&str] = &["urgent", "immediate", "critical", "emergency", "deadline"];

/// Summaries longer than this raise confidence.
const SUBSTANTIAL_SUMMARY_CHARS: usize = 50;

/// Build the report for one run. Pure: depends only on its arguments.
pub fn aggregate(
    summary: &SummaryResult,
    risk: &RiskResult,
    decision: &DecisionResult,
    original_text: &str,
) -> AggregatedReport {
    AggregatedReport {
        status: AnalyzerStatus::Completed,
        error: None,
        summary: summary.summary.clone(),
        red_flags: risk.red_flags.clone(),
        decisions: decision.decisions.clone(),
        action_items: decision.action_items.clone(),
        deadlines: decision.deadlines.clone(),
        severity_breakdown: risk.severity_breakdown,
        statistics: Some(ReportStatistics {
            document_length: char_len(original_text),
            word_count: original_text.split_whitespace().count(),
            total_red_flags: risk.total_flags,
            total_decisions: decision.total_decisions,
            key_topics: summary.key_topics.clone(),
        }),
        document_statistics: Some(summary.statistics.clone()),
        collaborative_insights: Some(generate_insights(summary, risk, decision)),
        analyzers: vec![
            outcome(&summary.analyzer, summary.status, &summary.error),
            outcome(&risk.analyzer, risk.status, &risk.error),
            outcome(&decision.analyzer, decision.status, &decision.error),
        ],
    }
}

fn outcome(name: &str, status: AnalyzerStatus, error: &Option<String>) -> AnalyzerOutcome {
    AnalyzerOutcome {
        name: name.to_string(),
        status,
        error: error.clone(),
    }
}

/// Derive the collaborative insights block.
pub fn generate_insights(
    summary: &SummaryResult,
    risk: &RiskResult,
    decision: &DecisionResult,
) -> CollaborativeInsights {
    let flag_count = risk.red_flags.len();
    let decision_count = decision.decisions.len();

    CollaborativeInsights {
        risk_level: risk_level(flag_count),
        urgency: urgency(&risk.red_flags, &decision.decisions),
        complexity: complexity(flag_count + decision_count),
        requires_attention: flag_count > 0,
        has_action_items: decision_count > 0,
        confidence_score: confidence_score(&summary.summary, flag_count, decision_count),
    }
}

pub fn risk_level(flag_count: usize) -> RiskLevel {
    if flag_count > 5 {
        RiskLevel::High
    } else if flag_count > 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// High if an urgency keyword appears anywhere in flags or decisions.
pub fn urgency(red_flags: &[String], decisions: &[String]) -> Urgency {
    let combined = red_flags
        .iter()
        .chain(decisions)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if contains_any(&combined, URGENCY_KEYWORDS) {
        Urgency::High
    } else {
        Urgency::Normal
    }
}

pub fn complexity(total_items: usize) -> Complexity {
    if total_items > 10 {
        Complexity::High
    } else if total_items > 5 {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

/// 0.7 base plus 0.1 per corroborating signal, capped at 1.0.
///
/// Counted in tenths so the result is an exact decimal.
pub fn confidence_score(summary: &str, flag_count: usize, decision_count: usize) -> f64 {
    let mut tenths: u32 = 7;

    if !summary.is_empty() && char_len(summary) > SUBSTANTIAL_SUMMARY_CHARS {
        tenths += 1;
    }
    if flag_count > 0 {
        tenths += 1;
    }
    if decision_count > 0 {
        tenths += 1;
    }

    f64::from(tenths.min(10)) / 10.0
}
