//! Decision and action-item extraction.
//!
//! Collects sentences that read like decisions, bulleted or numbered list
//! entries, the subset that are action items, and any deadlines.

use super::text::{char_len, contains_any, split_sentences, truncate_chars};
use super::{generate_nonempty, StatusCell, TextAnalyzer};
use crate::backend::Generator;
use crate::error::AnalyzerError;
use crate::models::{AnalyzerStatus, DecisionResult};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

const NAME: &str = "Decision Extractor";

const PROMPT_CHAR_LIMIT: usize = 3000;

const MAX_DECISIONS: usize = 15;

const MAX_DEADLINES: usize = 5;

/// Sentences and list items shorter than this are ignored.
const MIN_ITEM_CHARS: usize = 10;

const DECISION_INDICATORS: &[&str] = &[
    "decided",
    "resolved",
    "agreed",
    "approved",
    "authorized",
    "action item",
    "next step",
    "follow up",
    "shall",
    "will",
    "must",
    "required",
    "mandatory",
    "deadline",
    "due date",
    "assign",
    "responsible",
    "task",
    "deliverable",
];

const ACTION_KEYWORDS: &[&str] = &["action", "task", "follow up", "next step", "assign"];

/// Bulleted (`•`, `-`, `*`) or numbered (`1.`) lines.
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|\n)\s*(?:\d+\.|•|-|\*)\s*(.+)").expect("valid list item regex")
});

/// Searched in order; the first capture group is the deadline text.
static DEADLINE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"(?i)\b(?:deadline|due|expires?|by)\s+(?:(?:is|on)\s+)?(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
        r"(?i)\b(?:deadline|due|expires?|by)\s+(\w+\s+\d{1,2},?\s+\d{4})",
        r"(?i)\b(?:within|in)\s+(\d+\s+(?:days?|weeks?|months?))",
    ]
    .map(|pattern| Regex::new(pattern).expect("valid deadline regex"))
});

pub struct DecisionAnalyzer {
    generator: Option<Generator>,
    status: StatusCell,
}

impl DecisionAnalyzer {
    pub fn new(generator: Option<Generator>) -> Self {
        Self {
            generator,
            status: StatusCell::default(),
        }
    }
}

#[async_trait]
impl TextAnalyzer for DecisionAnalyzer {
    type Output = DecisionResult;

    fn name(&self) -> &'static str {
        NAME
    }

    fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    fn generator(&self) -> Option<&Generator> {
        self.generator.as_ref()
    }

    async fn extract(&self, text: &str) -> Result<DecisionResult, AnalyzerError> {
        let decisions = match &self.generator {
            Some(generator) => {
                let prompt = build_prompt(truncate_chars(text, PROMPT_CHAR_LIMIT));
                parse_generated_decisions(&generate_nonempty(generator, &prompt).await?)
            }
            None => extract_decisions(text),
        };

        Ok(DecisionResult {
            analyzer: NAME.to_string(),
            status: AnalyzerStatus::Completed,
            total_decisions: decisions.len(),
            action_items: filter_action_items(&decisions),
            deadlines: extract_deadlines(text),
            decisions,
            error: None,
        })
    }

    fn failure(&self, message: String) -> DecisionResult {
        DecisionResult {
            analyzer: NAME.to_string(),
            status: AnalyzerStatus::Error,
            error: Some(format!("Error extracting decisions: {}", message)),
            ..DecisionResult::default()
        }
    }
}

/// Indicator sentences first, then list entries, capped.
fn extract_decisions(text: &str) -> Vec<String> {
    let mut decisions: Vec<String> = split_sentences(text)
        .into_iter()
        .filter(|sentence| char_len(sentence) >= MIN_ITEM_CHARS)
        .filter(|sentence| contains_any(&sentence.to_lowercase(), DECISION_INDICATORS))
        .map(|sentence| format!("📋 {}", sentence))
        .collect();

    for caps in LIST_ITEM.captures_iter(text) {
        let item = caps.get(1).map_or("", |m| m.as_str()).trim();
        if char_len(item) >= MIN_ITEM_CHARS {
            decisions.push(format!("✅ Action: {}", item));
        }
    }

    decisions.truncate(MAX_DECISIONS);
    decisions
}

/// Decisions mentioning an action keyword. A view, not a new extraction.
fn filter_action_items(decisions: &[String]) -> Vec<String> {
    decisions
        .iter()
        .filter(|d| contains_any(&d.to_lowercase(), ACTION_KEYWORDS))
        .cloned()
        .collect()
}

fn extract_deadlines(text: &str) -> Vec<String> {
    let mut deadlines = Vec::new();

    for re in DEADLINE_PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                deadlines.push(format!("📅 Deadline: {}", m.as_str()));
            }
        }
    }

    deadlines.truncate(MAX_DEADLINES);
    deadlines
}

/// Keep list lines and lines that mention a decision or action.
fn parse_generated_decisions(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && (line.starts_with('-')
                    || line.starts_with('•')
                    || contains_any(&line.to_lowercase(), &["decision", "action"]))
        })
        .take(MAX_DECISIONS)
        .map(String::from)
        .collect()
}

fn build_prompt(excerpt: &str) -> String {
    format!(
        r#"List every decision, action item and next step in the document below.
For each one give:

1. Decision/Action: what was decided or must be done
2. Responsible party, if named
3. Timeline or deadline, if any
4. Priority (High/Medium/Low), if it can be told
5. Status (Completed/Pending/Future)

Document text:
{}

Decisions and actions:"#,
        excerpt
    )
}
