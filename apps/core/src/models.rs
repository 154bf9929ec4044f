use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// The two triage classes an email can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Requires an action, decision or reply.
    Productive,
    /// Informational or courtesy content requiring no action.
    Unproductive,
}

impl Classification {
    /// Returns the wire label for the class.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Productive => "productive",
            Classification::Unproductive => "unproductive",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Request body for text-based analysis.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzeRequest {
    /// The email content to classify. Whitespace-only content is rejected.
    #[validate(length(min = 10, max = 10000), custom(function = "non_blank"))]
    pub content: String,
    /// Name of the originating file, when the caller has one.
    #[serde(default)]
    pub file_name: Option<String>,
}

fn non_blank(content: &str) -> Result<(), validator::ValidationError> {
    if content.trim().is_empty() {
        return Err(validator::ValidationError::new("blank_content"));
    }
    Ok(())
}

/// The canonical outcome of one classification call.
///
/// Produced by exactly one scoring path (remote or rule-based) and never
/// mutated afterwards; the store keeps its own clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAnalysis {
    /// Unique identifier for this analysis.
    pub id: String,
    /// Assigned triage class.
    pub classification: Classification,
    /// Heuristic certainty in [0.5, 1.0], rounded to two decimals.
    pub confidence: f64,
    /// Ready-to-send reply suggestion.
    pub suggested_response: String,
    /// Instant the analysis was produced.
    pub analysis_timestamp: DateTime<Utc>,
    /// Name of the analyzed file, carried through unchanged from the caller.
    pub file_name: Option<String>,
}

/// A history view of an analysis, with the content truncated for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// Truncated copy of the analyzed content.
    pub content: String,
    pub classification: Classification,
    pub confidence: f64,
    pub suggested_response: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub file_name: Option<String>,
}

/// Aggregate counters over every analysis since startup (or the last clear).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_processed: u64,
    pub productive_count: u64,
    pub unproductive_count: u64,
    /// Mean confidence across all processed emails, rounded to two decimals.
    pub average_confidence: f64,
}

/// Health check payload.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app_name: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
