//! Summary analyzer.
//!
//! Builds an extractive summary (first, middle and last sentences),
//! basic document statistics and a short list of frequent topics.

use super::text::{char_len, split_sentences, title_case, truncate_chars};
use super::{generate_nonempty, StatusCell, TextAnalyzer};
use crate::backend::Generator;
use crate::error::AnalyzerError;
use crate::models::{AnalyzerStatus, DocumentStatistics, SummaryResult};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

const NAME: &str = "Summary Analyzer";

/// Characters of the document sent to the completion backend.
const PROMPT_CHAR_LIMIT: usize = 4000;

/// Fragments shorter than this are not summary material.
const MIN_SENTENCE_CHARS: usize = 20;

const MAX_KEY_TOPICS: usize = 5;

static TOPIC_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{4,}\b").expect("valid topic word regex"));

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "a", "an", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "will", "would", "could", "should",
];

pub struct SummaryAnalyzer {
    generator: Option<Generator>,
    status: StatusCell,
}

impl SummaryAnalyzer {
    pub fn new(generator: Option<Generator>) -> Self {
        Self {
            generator,
            status: StatusCell::default(),
        }
    }
}

#[async_trait]
impl TextAnalyzer for SummaryAnalyzer {
    type Output = SummaryResult;

    fn name(&self) -> &'static str {
        NAME
    }

    fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    fn generator(&self) -> Option<&Generator> {
        self.generator.as_ref()
    }

    async fn extract(&self, text: &str) -> Result<SummaryResult, AnalyzerError> {
        let summary = match &self.generator {
            Some(generator) => {
                let prompt = build_prompt(truncate_chars(text, PROMPT_CHAR_LIMIT));
                generate_nonempty(generator, &prompt).await?.trim().to_string()
            }
            None => heuristic_summary(text),
        };

        Ok(SummaryResult {
            analyzer: NAME.to_string(),
            status: AnalyzerStatus::Completed,
            summary,
            statistics: document_statistics(text),
            key_topics: key_topics(text),
            error: None,
        })
    }

    fn failure(&self, message: String) -> SummaryResult {
        SummaryResult {
            analyzer: NAME.to_string(),
            status: AnalyzerStatus::Error,
            error: Some(format!("Error generating summary: {}", message)),
            ..SummaryResult::default()
        }
    }
}

/// Pick the first sentence, two from a third of the way in, and the last.
fn heuristic_summary(text: &str) -> String {
    let sentences: Vec<&str> = split_sentences(text)
        .into_iter()
        .filter(|s| char_len(s) >= MIN_SENTENCE_CHARS)
        .collect();

    if sentences.is_empty() {
        return String::new();
    }

    let picked: Vec<&str> = if sentences.len() <= 3 {
        sentences
    } else {
        let n = sentences.len();
        let middle = n / 3;
        let mut picked = vec![sentences[0]];
        picked.extend_from_slice(&sentences[middle..(middle + 2).min(n)]);
        picked.push(sentences[n - 1]);
        picked
    };

    format!("{}.", picked.join(". "))
}

fn document_statistics(text: &str) -> DocumentStatistics {
    let word_count = text.split_whitespace().count();
    let sentence_count = split_sentences(text).len();
    let paragraph_count = text
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .count();

    DocumentStatistics {
        word_count,
        sentence_count,
        paragraph_count,
        character_count: char_len(text),
        avg_words_per_sentence: word_count as f64 / sentence_count.max(1) as f64,
    }
}

/// Most frequent non-stopword words of four or more letters.
fn key_topics(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();

    // First-seen order is kept so the stable sort breaks ties by it.
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for m in TOPIC_WORD.find_iter(&lowered) {
        let w = m.as_str();
        if STOP_WORDS.contains(&w) {
            continue;
        }
        match index.get(w) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(w, counts.len());
                counts.push((w, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(MAX_KEY_TOPICS)
        .map(|(w, _)| title_case(w))
        .collect()
}

fn build_prompt(excerpt: &str) -> String {
    format!(
        r#"Write a concise, professional summary of the document below. Cover:

1. Main purpose: what the document is about
2. Key points: the three to five most important points
3. Stakeholders: the main parties involved
4. Context: when and why it was written, if stated
5. Outcomes: expected results or next steps

Document text:
{}

Summary:"#,
        excerpt
    )
}
