//! Red-flag detection.
//!
//! Looks for legal, financial, operational, contractual and time-sensitive
//! keywords, quotes the text around each hit, and buckets the resulting
//! flags by severity.

use super::text::{contains_any, title_case, truncate_chars};
use super::{generate_nonempty, StatusCell, TextAnalyzer};
use crate::backend::Generator;
use crate::error::AnalyzerError;
use crate::models::{AnalyzerStatus, RiskResult, SeverityBreakdown};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

const NAME: &str = "Red Flag Detector";

const PROMPT_CHAR_LIMIT: usize = 3000;

const MAX_FLAGS: usize = 10;

/// Context windows quoted per keyword.
const MATCHES_PER_KEYWORD: usize = 2;

/// Characters of context on either side of a keyword.
const CONTEXT_CHARS: usize = 50;

// Each keyword is listed once; a repeat would quote the same windows twice.
const RED_FLAG_KEYWORDS: &[&str] = &[
    // Legal / compliance
    "lawsuit",
    "litigation",
    "violation",
    "breach",
    "penalty",
    "fine",
    "non-compliance",
    "illegal",
    "unauthorized",
    "fraud",
    "corruption",
    // Financial
    "debt",
    "bankruptcy",
    "loss",
    "deficit",
    "overdue",
    "unpaid",
    "financial distress",
    "cash flow",
    "insolvency",
    // Operational
    "security breach",
    "data leak",
    "system failure",
    "outage",
    "safety incident",
    "accident",
    "injury",
    "emergency",
    // Contractual
    "termination",
    "cancellation",
    "default",
    "dispute",
    "conflict",
    "disagreement",
    "renegotiation",
    "amendment",
    // Time-sensitive
    "urgent",
    "immediate",
    "deadline",
    "expires",
    "critical",
    "asap",
];

const HIGH_SEVERITY: &[&str] = &[
    "lawsuit",
    "breach",
    "violation",
    "fraud",
    "bankruptcy",
    "critical",
    "emergency",
];

const MEDIUM_SEVERITY: &[&str] = &["risk", "issue", "concern", "deadline", "dispute"];

static FINANCIAL_FIGURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[\d,]+|\d+\.\d+%").expect("valid financial regex"));

static DEADLINE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:deadline|due|expires?|by)\s+(?:(?:is|on)\s+)?(?:\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\w+\s+\d{1,2},?\s+\d{4})",
    )
    .expect("valid deadline date regex")
});

/// One context-window pattern per keyword, in keyword order.
static KEYWORD_WINDOWS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    RED_FLAG_KEYWORDS
        .iter()
        .map(|&keyword| {
            let window = Regex::new(&format!(
                "(?i).{{0,{n}}}{}.{{0,{n}}}",
                regex::escape(keyword),
                n = CONTEXT_CHARS
            ))
            .expect("escaped keyword forms a valid regex");
            (keyword, window)
        })
        .collect()
});

const CONFIDENTIAL_FLAG: &str = "🔒 Confidential Information: Document contains confidential data";
const FINANCIAL_FLAG: &str = "💰 Financial Data: Document contains financial figures";
const TIME_SENSITIVE_FLAG: &str = "⏰ Time Sensitive: Document contains deadline information";

pub struct RiskAnalyzer {
    generator: Option<Generator>,
    status: StatusCell,
}

impl RiskAnalyzer {
    pub fn new(generator: Option<Generator>) -> Self {
        Self {
            generator,
            status: StatusCell::default(),
        }
    }
}

#[async_trait]
impl TextAnalyzer for RiskAnalyzer {
    type Output = RiskResult;

    fn name(&self) -> &'static str {
        NAME
    }

    fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    fn generator(&self) -> Option<&Generator> {
        self.generator.as_ref()
    }

    async fn extract(&self, text: &str) -> Result<RiskResult, AnalyzerError> {
        let red_flags = match &self.generator {
            Some(generator) => {
                let prompt = build_prompt(truncate_chars(text, PROMPT_CHAR_LIMIT));
                parse_generated_flags(&generate_nonempty(generator, &prompt).await?)
            }
            None => detect_red_flags(text),
        };

        Ok(RiskResult {
            analyzer: NAME.to_string(),
            status: AnalyzerStatus::Completed,
            total_flags: red_flags.len(),
            severity_breakdown: categorize_severity(&red_flags),
            red_flags,
            error: None,
        })
    }

    fn failure(&self, message: String) -> RiskResult {
        RiskResult {
            analyzer: NAME.to_string(),
            status: AnalyzerStatus::Error,
            error: Some(format!("Error in analysis: {}", message)),
            ..RiskResult::default()
        }
    }
}

/// Keyword hits first (in keyword order), then the fixed checks.
fn detect_red_flags(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut flags = Vec::new();

    for (keyword, window) in KEYWORD_WINDOWS.iter() {
        if !lowered.contains(keyword) {
            continue;
        }

        for m in window.find_iter(text).take(MATCHES_PER_KEYWORD) {
            flags.push(format!(
                "⚠️ {}: ...{}...",
                title_case(keyword),
                m.as_str().trim()
            ));
        }
    }

    if lowered.contains("confidential") {
        flags.push(CONFIDENTIAL_FLAG.to_string());
    }

    if FINANCIAL_FIGURE.is_match(text) {
        flags.push(FINANCIAL_FLAG.to_string());
    }

    if DEADLINE_DATE.is_match(text) {
        flags.push(TIME_SENSITIVE_FLAG.to_string());
    }

    flags.truncate(MAX_FLAGS);
    flags
}

/// Keep completion lines that talk about red flags, risks or issues.
fn parse_generated_flags(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| {
            let lower = line.to_lowercase();
            !line.is_empty() && contains_any(&lower, &["red flag", "risk", "issue"])
        })
        .take(MAX_FLAGS)
        .map(String::from)
        .collect()
}

/// High if any high-severity word appears, else medium, else low.
fn categorize_severity(flags: &[String]) -> SeverityBreakdown {
    let mut breakdown = SeverityBreakdown::default();

    for flag in flags {
        let lower = flag.to_lowercase();
        if contains_any(&lower, HIGH_SEVERITY) {
            breakdown.high += 1;
        } else if contains_any(&lower, MEDIUM_SEVERITY) {
            breakdown.medium += 1;
        } else {
            breakdown.low += 1;
        }
    }

    breakdown
}

fn build_prompt(excerpt: &str) -> String {
    format!(
        r#"Review the document below for red flags, risks and issues that need attention:

1. Legal or compliance issues
2. Financial risks
3. Operational risks
4. Contractual disputes
5. Time-sensitive matters
6. Safety or security concerns
7. Anything else unusual or concerning

Write one line per red flag giving its type, severity (High/Medium/Low),
a brief description and a recommended action.

Document text:
{}

Red flags:"#,
        excerpt
    )
}
