//! Report rendering.
//!
//! Turns an [`AggregatedReport`] into Markdown, pretty JSON or a plain-text
//! export, and renders the orchestrator history as a Markdown table.

use crate::models::{
    AggregatedReport, AnalyzerOutcome, AnalyzerStatus, CollaborativeInsights, DocumentStatistics,
    ReportStatistics, RiskLevel, SeverityBreakdown,
};
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Where a report came from. Rendered in the metadata section.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    /// Input path, or `stdin`.
    pub source: String,
    pub generated_at: DateTime<Utc>,
    /// Model name, or `heuristic`.
    pub model: String,
}

/// Optional Markdown sections.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub include_statistics: bool,
    pub include_analyzer_status: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_statistics: true,
            include_analyzer_status: true,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(
    report: &AggregatedReport,
    meta: &ReportMeta,
    options: ReportOptions,
) -> String {
    let mut output = String::new();

    output.push_str("# Document Intelligence Report\n\n");
    output.push_str(&generate_metadata_section(meta));

    if !report.is_completed() {
        output.push_str(&generate_error_section(report));
        output.push_str(&generate_footer());
        return output;
    }

    output.push_str(&generate_summary_section(&report.summary));

    if let Some(insights) = &report.collaborative_insights {
        output.push_str(&generate_insights_section(insights));
    }

    if options.include_statistics {
        output.push_str(&generate_statistics_section(
            report.statistics.as_ref(),
            report.document_statistics.as_ref(),
        ));
    }

    output.push_str(&generate_red_flags_section(
        &report.red_flags,
        &report.severity_breakdown,
    ));
    output.push_str(&generate_list_section(
        "Decisions",
        &report.decisions,
        "No decisions were found.",
    ));
    output.push_str(&generate_list_section(
        "Action Items",
        &report.action_items,
        "No action items were found.",
    ));
    output.push_str(&generate_list_section(
        "Deadlines",
        &report.deadlines,
        "No deadlines were found.",
    ));

    if options.include_analyzer_status {
        output.push_str(&generate_analyzers_section(&report.analyzers));
    }

    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(meta: &ReportMeta) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", meta.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model:** `{}`\n\n", meta.model));

    section
}

fn generate_error_section(report: &AggregatedReport) -> String {
    let mut section = String::new();

    section.push_str("## Error\n\n");
    section.push_str(&format!(
        "{} The analysis did not complete: {}\n\n",
        AnalyzerStatus::Error.emoji(),
        report.error.as_deref().unwrap_or("unknown error")
    ));

    section
}

fn generate_summary_section(summary: &str) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    if summary.is_empty() {
        section.push_str("*No summary could be produced.*\n\n");
    } else {
        section.push_str(summary);
        section.push_str("\n\n");
    }

    section
}

fn generate_insights_section(insights: &CollaborativeInsights) -> String {
    let mut section = String::new();

    section.push_str("## Collaborative Insights\n\n");
    section.push_str("| Risk | Urgency | Complexity | Attention | Action Items | Confidence |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} {} | {} | {} | {} | {} | {:.0}% |\n\n",
        insights.risk_level.emoji(),
        insights.risk_level,
        insights.urgency,
        insights.complexity,
        yes_no(insights.requires_attention),
        yes_no(insights.has_action_items),
        insights.confidence_score * 100.0
    ));

    section
}

fn generate_statistics_section(
    stats: Option<&ReportStatistics>,
    document: Option<&DocumentStatistics>,
) -> String {
    let mut section = String::new();

    section.push_str("## Statistics\n\n");
    section.push_str("| Metric | Value |\n");
    section.push_str("|:---|:---:|\n");

    if let Some(stats) = stats {
        section.push_str(&format!("| Characters | {} |\n", stats.document_length));
        section.push_str(&format!("| Words | {} |\n", stats.word_count));
    }
    if let Some(doc) = document {
        section.push_str(&format!("| Sentences | {} |\n", doc.sentence_count));
        section.push_str(&format!("| Paragraphs | {} |\n", doc.paragraph_count));
        section.push_str(&format!(
            "| Words per sentence | {:.1} |\n",
            doc.avg_words_per_sentence
        ));
    }
    section.push('\n');

    if let Some(stats) = stats {
        if !stats.key_topics.is_empty() {
            section.push_str(&format!(
                "**Key topics:** {}\n\n",
                stats.key_topics.join(", ")
            ));
        }
    }

    section
}

fn generate_red_flags_section(flags: &[String], severity: &SeverityBreakdown) -> String {
    let mut section = String::new();

    section.push_str("## Red Flags\n\n");

    if flags.is_empty() {
        section.push_str("No red flags were detected.\n\n");
        return section;
    }

    section.push_str(&format!(
        "| {} High | {} Medium | {} Low | **Total** |\n",
        RiskLevel::High.emoji(),
        RiskLevel::Medium.emoji(),
        RiskLevel::Low.emoji(),
    ));
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | **{}** |\n\n",
        severity.high,
        severity.medium,
        severity.low,
        severity.total()
    ));

    for flag in flags {
        section.push_str(&format!("- {}\n", flag));
    }
    section.push('\n');

    section
}

fn generate_list_section(title: &str, items: &[String], empty: &str) -> String {
    let mut section = format!("## {}\n\n", title);

    if items.is_empty() {
        section.push_str(empty);
        section.push_str("\n\n");
        return section;
    }

    for item in items {
        section.push_str(&format!("- {}\n", item));
    }
    section.push('\n');

    section
}

fn generate_analyzers_section(analyzers: &[AnalyzerOutcome]) -> String {
    let mut section = String::new();

    section.push_str("## Analyzers\n\n");
    section.push_str("| Analyzer | Status | Error |\n");
    section.push_str("|:---|:---:|:---|\n");

    for outcome in analyzers {
        section.push_str(&format!(
            "| {} | {} {} | {} |\n",
            outcome.name,
            outcome.status.emoji(),
            outcome.status,
            outcome.error.as_deref().unwrap_or("-")
        ));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by docintel*\n".to_string()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &AggregatedReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Plain-text export: summary, then numbered red flags and decisions.
pub fn generate_text_report(report: &AggregatedReport) -> String {
    let mut output = String::new();

    if let Some(error) = &report.error {
        output.push_str(&format!("ANALYSIS FAILED: {}\n", error));
        return output;
    }

    output.push_str("SUMMARY\n");
    output.push_str(&report.summary);
    output.push_str("\n\n");

    output.push_str(&format!("RED FLAGS ({})\n", report.red_flags.len()));
    push_numbered(&mut output, &report.red_flags);

    output.push_str(&format!("\nDECISIONS ({})\n", report.decisions.len()));
    push_numbered(&mut output, &report.decisions);

    output
}

fn push_numbered(output: &mut String, items: &[String]) {
    for (i, item) in items.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, item));
    }
}

/// Markdown table of past runs, oldest first.
pub fn generate_history_table(history: &[AggregatedReport]) -> String {
    let mut table = String::new();

    table.push_str("## Analysis History\n\n");

    if history.is_empty() {
        table.push_str("No analyses have been run yet.\n");
        return table;
    }

    table.push_str("| # | Status | Risk | Urgency | Red Flags | Decisions | Words | Confidence |\n");
    table.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|:---:|:---:|\n");

    for (i, report) in history.iter().enumerate() {
        let (risk, urgency, confidence) = match &report.collaborative_insights {
            Some(insights) => (
                format!("{} {}", insights.risk_level.emoji(), insights.risk_level),
                insights.urgency.to_string(),
                format!("{:.2}", insights.confidence_score),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        let words = report
            .statistics
            .as_ref()
            .map_or_else(|| "-".to_string(), |s| s.word_count.to_string());

        table.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            i + 1,
            report.status,
            risk,
            urgency,
            report.red_flags.len(),
            report.decisions.len(),
            words,
            confidence
        ));
    }

    table
}
