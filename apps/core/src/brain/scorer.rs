//! Rule-based email scorer.
//!
//! Combines three deterministic signals into a binary decision with a
//! confidence value:
//!
//! 1. weighted keyword counts from the lexicon tables,
//! 2. regex pattern matches for structural phrasing cues,
//! 3. structural features of the text (questions, length).
//!
//! Keyword matching is plain substring counting, not token matching. That
//! over-counts keywords embedded in longer words ("ação" inside
//! "informação") and the confidence thresholds were tuned against exactly
//! that behavior, so it must not be replaced with word-boundary matching.

use regex::Regex;
use std::sync::LazyLock;

use super::lexicon::{ProductiveCategory, UnproductiveCategory};
use crate::models::Classification;

/// Fixed weight contributed by each regex pattern match.
const PATTERN_WEIGHT: f64 = 2.0;

/// Structural weight per question mark.
const QUESTION_MARK_WEIGHT: f64 = 2.0;

/// Emails under this many words lose one structural point.
const SHORT_EMAIL_WORDS: usize = 20;

/// Emails over this many words gain one structural point.
const LONG_EMAIL_WORDS: usize = 200;

const BASE_CONFIDENCE: f64 = 0.6;
const CONFIDENCE_STEP: f64 = 0.05;
const MAX_RULE_CONFIDENCE: f64 = 0.95;
const MIN_CONFIDENCE: f64 = 0.5;

// Compiled once at startup. An invalid pattern is a programming error, so
// expect() is acceptable here.
static STRIP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s?!]").expect("Invalid regex: normalization strip pattern")
});

static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace pattern"));

static PRODUCTIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Deadlines and scheduling questions
        Regex::new(r"(?i)\b(quando|até quando|prazo|deadline)\b")
            .expect("Invalid regex: deadline pattern"),
        // Modal request phrasing ("pode revisar", "poderia enviar")
        Regex::new(r"(?i)\b(pode|poderia|consegue)\s+\w+")
            .expect("Invalid regex: modal request pattern"),
        // Direct questions
        Regex::new(r"\?").expect("Invalid regex: question mark pattern"),
        Regex::new(r"(?i)\b(solicito|preciso|necessário)\b")
            .expect("Invalid regex: request pattern"),
        Regex::new(r"(?i)\b(urgente|importante|prioridade)\b")
            .expect("Invalid regex: urgency pattern"),
    ]
});

static UNPRODUCTIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Gratitude phrasing, including inflections ("obrigado", "agradeço")
        Regex::new(r"(?i)\b(obrigad[oa]|agradec)\w*")
            .expect("Invalid regex: gratitude pattern"),
        Regex::new(r"(?i)\b(parabéns|felicitações)\b")
            .expect("Invalid regex: congratulations pattern"),
        Regex::new(r"(?i)\b(para conhecimento|fyi)\b").expect("Invalid regex: fyi pattern"),
        Regex::new(r"(?i)\b(newsletter|boletim)\b")
            .expect("Invalid regex: newsletter pattern"),
    ]
});

/// Per-signal totals accumulated while scoring a single email.
///
/// `pattern_unproductive` is computed and reported but deliberately excluded
/// from `unproductive_total`; the decision thresholds were tuned with that
/// asymmetry in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub keyword_productive: f64,
    pub keyword_unproductive: f64,
    pub pattern_productive: f64,
    pub pattern_unproductive: f64,
    pub structure: f64,
    pub productive_total: f64,
    pub unproductive_total: f64,
}

/// Outcome of rule-based scoring.
#[derive(Debug, Clone)]
pub struct RuleVerdict {
    pub classification: Classification,
    pub confidence: f64,
    pub breakdown: ScoreBreakdown,
}

/// Deterministic keyword/pattern/structure scorer.
///
/// Pure function of its input: no state is read or written across calls, so
/// one instance can be shared freely between in-flight requests.
pub struct RuleScorer;

impl Default for RuleScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleScorer {
    pub fn new() -> Self {
        Self
    }

    /// Lowercases the text, strips everything except word characters,
    /// whitespace, `?` and `!`, and collapses runs of whitespace. Shared by
    /// keyword, pattern and structure scoring.
    fn normalize(text: &str) -> String {
        let lowered = text.to_lowercase();
        let stripped = STRIP_PATTERN.replace_all(&lowered, " ");
        WHITESPACE_PATTERN
            .replace_all(&stripped, " ")
            .trim()
            .to_string()
    }

    /// Counts weighted keyword occurrences for both classes.
    fn keyword_scores(normalized: &str) -> (f64, f64) {
        let mut productive = 0.0;
        let mut unproductive = 0.0;

        for category in ProductiveCategory::ALL {
            for keyword in category.keywords() {
                let count = normalized.matches(keyword).count() as f64;
                productive += count * category.weight();
            }
        }

        for category in UnproductiveCategory::ALL {
            for keyword in category.keywords() {
                let count = normalized.matches(keyword).count() as f64;
                unproductive += count * category.weight();
            }
        }

        (productive, unproductive)
    }

    /// Counts non-overlapping regex matches for both pattern lists.
    fn pattern_scores(normalized: &str) -> (f64, f64) {
        let productive = PRODUCTIVE_PATTERNS
            .iter()
            .map(|pattern| pattern.find_iter(normalized).count() as f64)
            .sum::<f64>()
            * PATTERN_WEIGHT;

        let unproductive = UNPRODUCTIVE_PATTERNS
            .iter()
            .map(|pattern| pattern.find_iter(normalized).count() as f64)
            .sum::<f64>()
            * PATTERN_WEIGHT;

        (productive, unproductive)
    }

    /// Structural signal, contributed to the productive side only.
    fn structure_score(normalized: &str) -> f64 {
        let mut score = normalized.matches('?').count() as f64 * QUESTION_MARK_WEIGHT;

        let word_count = normalized.split_whitespace().count();
        if word_count < SHORT_EMAIL_WORDS {
            score -= 1.0;
        }
        if word_count > LONG_EMAIL_WORDS {
            score += 1.0;
        }

        score
    }

    /// Maps an absolute score difference onto the confidence scale.
    pub(crate) fn confidence(difference: f64) -> f64 {
        (BASE_CONFIDENCE + difference * CONFIDENCE_STEP)
            .min(MAX_RULE_CONFIDENCE)
            .max(MIN_CONFIDENCE)
    }

    /// Scores an email and returns the classification, confidence and the
    /// per-signal breakdown.
    pub fn score(&self, content: &str) -> RuleVerdict {
        let normalized = Self::normalize(content);

        let (keyword_productive, keyword_unproductive) = Self::keyword_scores(&normalized);
        let (pattern_productive, pattern_unproductive) = Self::pattern_scores(&normalized);
        let structure = Self::structure_score(&normalized);

        let productive_total = keyword_productive + pattern_productive + structure;
        let unproductive_total = keyword_unproductive;

        let (classification, difference) = if productive_total > unproductive_total {
            (Classification::Productive, productive_total - unproductive_total)
        } else {
            // Ties favor the unproductive class.
            (Classification::Unproductive, unproductive_total - productive_total)
        };

        RuleVerdict {
            classification,
            confidence: Self::confidence(difference),
            breakdown: ScoreBreakdown {
                keyword_productive,
                keyword_unproductive,
                pattern_productive,
                pattern_unproductive,
                structure,
                productive_total,
                unproductive_total,
            },
        }
    }
}
