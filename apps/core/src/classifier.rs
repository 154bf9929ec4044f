//! Classification orchestrator.
//!
//! Single entry point for classifying an email. Chooses between the remote
//! adapter and the local rule engine and degrades in three tiers:
//!
//! 1. remote classifier, when configured and enabled by policy;
//! 2. on remote failure, a simplified indicator-word heuristic;
//! 3. when the remote path is off, the full rule scorer + reply synthesizer;
//!    and if anything still goes wrong, a fixed emergency result.
//!
//! `classify` never returns an error: the worst case is a low-confidence
//! emergency record.

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::brain::{responder, RuleScorer};
use crate::error::AppError;
use crate::models::{Classification, EmailAnalysis};
use crate::remote::RemoteScorer;

const EMERGENCY_REPLY: &str =
    "Obrigado pelo seu email. Analisaremos o conteúdo e retornaremos em breve.";

const FALLBACK_PRODUCTIVE_REPLY: &str = "Obrigado pelo seu email. Recebi sua solicitação e retornarei em breve com as informações necessárias.";
const FALLBACK_UNPRODUCTIVE_REPLY: &str = "Obrigado pelo seu email. Recebi a informação e fico à disposição se precisar de algo mais.";

// Indicator lists for the simplified heuristic used when the remote call
// fails mid-flight. Presence counts (one point per listed word found), not
// occurrence counts like the full scorer.
const FALLBACK_PRODUCTIVE_INDICATORS: &[&str] = &[
    "solicito",
    "preciso",
    "pode",
    "poderia",
    "quando",
    "prazo",
    "deadline",
    "urgente",
    "importante",
    "reunião",
    "meeting",
    "projeto",
    "tarefa",
    "problema",
    "erro",
    "bug",
    "aprovação",
];

const FALLBACK_UNPRODUCTIVE_INDICATORS: &[&str] = &[
    "obrigado",
    "obrigada",
    "parabéns",
    "felicitações",
    "informação",
    "comunicado",
    "fyi",
    "newsletter",
    "boletim",
];

const FALLBACK_QUESTION_BONUS: f64 = 2.0;
const FALLBACK_MAX_CONFIDENCE: f64 = 0.85;
const BASE_CONFIDENCE: f64 = 0.6;
const CONFIDENCE_STEP: f64 = 0.05;
const MIN_CONFIDENCE: f64 = 0.5;

/// Orchestrates the remote and rule-based scoring paths.
///
/// Generic over the remote seam so tests can drive it with stub scorers, the
/// same way the production instance wraps the real adapter.
pub struct EmailClassifier<R: RemoteScorer> {
    remote: R,
    rules: RuleScorer,
    use_remote: bool,
}

impl<R: RemoteScorer> EmailClassifier<R> {
    /// Builds the orchestrator. `use_remote` is the configuration policy
    /// flag; the adapter's own availability is checked per call on top.
    pub fn new(remote: R, use_remote: bool) -> Self {
        Self {
            remote,
            rules: RuleScorer::new(),
            use_remote,
        }
    }

    /// Classifies one email. Always returns a well-formed record.
    pub async fn classify(&self, content: &str, file_name: Option<String>) -> EmailAnalysis {
        match self.try_classify(content, file_name.as_deref()).await {
            Ok(analysis) => analysis,
            Err(e) => {
                error!("Classification failed unexpectedly: {}", e);
                self.emergency_result(file_name)
            }
        }
    }

    async fn try_classify(
        &self,
        content: &str,
        file_name: Option<&str>,
    ) -> Result<EmailAnalysis, AppError> {
        if self.use_remote && self.remote.is_available() {
            return match self.remote.classify(content).await {
                Ok(verdict) => {
                    info!(
                        classification = %verdict.classification,
                        confidence = verdict.confidence,
                        "Remote classification succeeded"
                    );
                    debug!(reasoning = %verdict.reasoning, "Remote classifier reasoning");
                    Ok(new_record(
                        verdict.classification,
                        // The adapter already clamps, but this boundary owns
                        // the [0.5, 1.0] invariant for stub implementations too.
                        verdict.confidence.clamp(MIN_CONFIDENCE, 1.0),
                        verdict.suggested_response,
                        file_name,
                    ))
                }
                Err(e) => {
                    warn!("Remote classification failed, using local fallback: {}", e);
                    Ok(self.quick_fallback(content, file_name))
                }
            };
        }

        let verdict = self.rules.score(content);
        if !(0.0..=1.0).contains(&verdict.confidence) {
            // A confidence outside [0, 1] means the scorer itself is broken;
            // the caller turns this into the emergency result.
            return Err(AppError::Internal(format!(
                "rule scorer produced out-of-range confidence {}",
                verdict.confidence
            )));
        }
        let reply = responder::synthesize(verdict.classification, content);
        Ok(new_record(
            verdict.classification,
            verdict.confidence,
            reply,
            file_name,
        ))
    }

    /// Simplified keyword-presence heuristic for the remote-failure tier.
    /// Intentionally coarser than the full rule scorer and capped at a lower
    /// confidence ceiling.
    fn quick_fallback(&self, content: &str, file_name: Option<&str>) -> EmailAnalysis {
        let content_lower = content.to_lowercase();

        let productive_hits = FALLBACK_PRODUCTIVE_INDICATORS
            .iter()
            .filter(|word| content_lower.contains(**word))
            .count() as f64;
        let unproductive_hits = FALLBACK_UNPRODUCTIVE_INDICATORS
            .iter()
            .filter(|word| content_lower.contains(**word))
            .count() as f64;

        let productive_score = if content.contains('?') {
            productive_hits + FALLBACK_QUESTION_BONUS
        } else {
            productive_hits
        };

        let (classification, difference, reply) = if productive_score > unproductive_hits {
            (
                Classification::Productive,
                productive_score - unproductive_hits,
                FALLBACK_PRODUCTIVE_REPLY,
            )
        } else {
            (
                Classification::Unproductive,
                unproductive_hits - productive_score,
                FALLBACK_UNPRODUCTIVE_REPLY,
            )
        };

        let confidence = (BASE_CONFIDENCE + difference * CONFIDENCE_STEP)
            .min(FALLBACK_MAX_CONFIDENCE)
            .max(MIN_CONFIDENCE);

        new_record(classification, confidence, reply.to_string(), file_name)
    }

    /// Last-resort record returned when every scoring path failed.
    fn emergency_result(&self, file_name: Option<String>) -> EmailAnalysis {
        EmailAnalysis {
            id: Uuid::new_v4().to_string(),
            classification: Classification::Unproductive,
            confidence: MIN_CONFIDENCE,
            suggested_response: EMERGENCY_REPLY.to_string(),
            analysis_timestamp: Utc::now(),
            file_name,
        }
    }
}

fn new_record(
    classification: Classification,
    confidence: f64,
    suggested_response: String,
    file_name: Option<&str>,
) -> EmailAnalysis {
    EmailAnalysis {
        id: Uuid::new_v4().to_string(),
        classification,
        confidence: round_confidence(confidence),
        suggested_response,
        analysis_timestamp: Utc::now(),
        file_name: file_name.map(|name| name.to_string()),
    }
}

fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
