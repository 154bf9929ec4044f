//! In-memory analysis store.
//!
//! Keeps full records by id, a bounded recent-history view with truncated
//! content, and running statistics. Everything lives for the lifetime of the
//! process only; `clear` resets all of it.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::info;

use crate::extract::truncate_at_word_boundary;
use crate::models::{Classification, EmailAnalysis, HistoryEntry, StatsResponse};

/// Number of entries kept in the history view.
const HISTORY_CAP: usize = 100;

/// Maximum characters of content stored per history entry.
const HISTORY_SNIPPET_LENGTH: usize = 200;

#[derive(Default)]
struct Totals {
    processed: u64,
    productive: u64,
    unproductive: u64,
    confidence_sum: f64,
}

#[derive(Default)]
struct StoreInner {
    analyses: HashMap<String, EmailAnalysis>,
    history: Vec<HistoryEntry>,
    totals: Totals,
}

/// Thread-safe store shared across request handlers.
///
/// A poisoned lock is recovered rather than propagated: losing a write from
/// a panicked thread is preferable to taking the whole store down.
#[derive(Default)]
pub struct AnalysisStore {
    inner: RwLock<StoreInner>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an analysis together with a truncated copy of the content it
    /// was produced from.
    pub fn store(&self, analysis: &EmailAnalysis, content: &str) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        inner
            .analyses
            .insert(analysis.id.clone(), analysis.clone());

        inner.history.push(HistoryEntry {
            id: analysis.id.clone(),
            content: truncate_at_word_boundary(content, HISTORY_SNIPPET_LENGTH),
            classification: analysis.classification,
            confidence: analysis.confidence,
            suggested_response: analysis.suggested_response.clone(),
            analysis_timestamp: analysis.analysis_timestamp,
            file_name: analysis.file_name.clone(),
        });
        let overflow = inner.history.len().saturating_sub(HISTORY_CAP);
        if overflow > 0 {
            inner.history.drain(..overflow);
        }

        inner.totals.processed += 1;
        inner.totals.confidence_sum += analysis.confidence;
        match analysis.classification {
            Classification::Productive => inner.totals.productive += 1,
            Classification::Unproductive => inner.totals.unproductive += 1,
        }
    }

    /// Fetches one analysis by id.
    pub fn get(&self, id: &str) -> Option<EmailAnalysis> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.analyses.get(id).cloned()
    }

    /// Returns up to `limit` history entries, most recent first, optionally
    /// filtered by classification.
    pub fn history(
        &self,
        limit: usize,
        classification: Option<Classification>,
    ) -> Vec<HistoryEntry> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);

        let mut entries: Vec<HistoryEntry> = inner
            .history
            .iter()
            .filter(|entry| classification.map_or(true, |c| entry.classification == c))
            .cloned()
            .collect();

        if entries.len() > limit {
            entries.drain(..entries.len() - limit);
        }
        entries.reverse();
        entries
    }

    /// Aggregate statistics since startup or the last clear.
    pub fn stats(&self) -> StatsResponse {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let totals = &inner.totals;

        let average_confidence = if totals.processed > 0 {
            let mean = totals.confidence_sum / totals.processed as f64;
            (mean * 100.0).round() / 100.0
        } else {
            0.0
        };

        StatsResponse {
            total_processed: totals.processed,
            productive_count: totals.productive,
            unproductive_count: totals.unproductive,
            average_confidence,
        }
    }

    /// Drops every record and resets the counters.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.analyses.clear();
        inner.history.clear();
        inner.totals = Totals::default();
        info!("Analysis history and statistics cleared");
    }
}
