//! Remote classifier adapter.
//!
//! Wraps an OpenAI-compatible `/chat/completions` endpoint and turns its
//! JSON-structured answer into a [`RemoteVerdict`]. Construction fails
//! closed: with no API key (or a client that cannot initialize) the adapter
//! reports itself unavailable instead of erroring, and the orchestrator
//! routes around it. The adapter never retries; any transport or protocol
//! failure surfaces as a single [`RemoteError`] for the caller to absorb.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::models::Classification;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Low temperature for near-deterministic answers.
const COMPLETION_TEMPERATURE: f64 = 0.1;

/// Output token budget for the structured verdict.
const COMPLETION_MAX_TOKENS: u32 = 500;

const SYSTEM_PROMPT: &str = r#"Você é um assistente especializado em classificar emails corporativos.

Sua tarefa é analisar emails e classificá-los em duas categorias:

1. **PRODUTIVO**: Emails que requerem uma ação, resposta ou decisão específica:
   - Solicitações de trabalho, projetos ou tarefas
   - Perguntas que precisam de resposta
   - Reuniões que precisam ser agendadas
   - Problemas que precisam ser resolvidos
   - Decisões que precisam ser tomadas
   - Prazos e deadlines
   - Pedidos de aprovação ou autorização

2. **IMPRODUTIVO**: Emails informativos que não requerem ação imediata:
   - Mensagens de cortesia (obrigado, parabéns)
   - Comunicados informativos gerais
   - Newsletters e boletins
   - Mensagens sociais (aniversários, eventos)
   - Confirmações automáticas do sistema
   - FYI (apenas para conhecimento)

Retorne sua resposta no formato JSON seguindo exatamente esta estrutura:
{
    "classification": "productive" ou "unproductive",
    "confidence": número entre 0.5 e 1.0,
    "reasoning": "breve explicação da classificação",
    "suggested_response": "resposta sugerida apropriada em português"
}

Seja preciso e considere o contexto corporativo brasileiro."#;

/// Failure kinds surfaced by the adapter. The orchestrator matches on these
/// explicitly instead of relying on exception-style control flow.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// Not configured, or the underlying client failed to initialize.
    #[error("remote classifier is not available")]
    Unavailable,

    /// The service answered, but not with the required structure.
    #[error("malformed remote response: {0}")]
    Protocol(String),

    /// Network-level failure or a non-success HTTP status.
    #[error("remote transport failure: {0}")]
    Transport(String),
}

/// Validated verdict returned by the remote service.
#[derive(Debug, Clone)]
pub struct RemoteVerdict {
    pub classification: Classification,
    /// Clamped into [0.5, 1.0].
    pub confidence: f64,
    /// Model-provided explanation; logged, never stored.
    pub reasoning: String,
    pub suggested_response: String,
}

/// Seam for the remote scoring path, so the orchestrator can be exercised
/// with stub implementations in tests.
#[async_trait]
pub trait RemoteScorer: Send + Sync + 'static {
    /// Whether the adapter was configured successfully.
    fn is_available(&self) -> bool;

    /// Classifies one email. One blocking network call, no retry.
    async fn classify(&self, content: &str) -> Result<RemoteVerdict, RemoteError>;
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageBody,
}

#[derive(Deserialize)]
struct MessageBody {
    content: Option<String>,
}

/// The verdict shape the model is instructed to emit. Deserialization fails
/// on any missing key, which the adapter reports as a protocol error.
#[derive(Deserialize)]
struct RawVerdict {
    classification: String,
    confidence: f64,
    reasoning: String,
    suggested_response: String,
}

/// Production adapter over the configured OpenAI-compatible endpoint.
pub struct RemoteClassifier {
    client: Option<Client>,
    api_key: String,
    model: String,
    base_url: String,
}

impl RemoteClassifier {
    /// Builds the adapter from settings. Never fails: a missing credential or
    /// client initialization error leaves the adapter unavailable.
    pub fn from_settings(settings: &Settings) -> Self {
        let base_url = settings
            .openai_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = settings.openai_model.clone();

        let Some(api_key) = settings.openai_api_key.clone() else {
            warn!("Remote classifier credential not configured, falling back to local scoring");
            return Self {
                client: None,
                api_key: String::new(),
                model,
                base_url,
            };
        };

        match Client::builder().build() {
            Ok(client) => {
                info!(model = %model, "Remote classifier initialized");
                Self {
                    client: Some(client),
                    api_key,
                    model,
                    base_url,
                }
            }
            Err(e) => {
                warn!("Failed to initialize remote classifier client: {}", e);
                Self {
                    client: None,
                    api_key: String::new(),
                    model,
                    base_url,
                }
            }
        }
    }

    fn user_prompt(content: &str) -> String {
        format!(
            "Analise o seguinte email e classifique-o:\n\nEMAIL:\n{}\n\nClassifique este email como \"productive\" ou \"unproductive\" e forneça uma resposta sugerida adequada.",
            content
        )
    }
}

#[async_trait]
impl RemoteScorer for RemoteClassifier {
    fn is_available(&self) -> bool {
        self.client.is_some()
    }

    async fn classify(&self, content: &str) -> Result<RemoteVerdict, RemoteError> {
        let client = self.client.as_ref().ok_or(RemoteError::Unavailable)?;
        let url = format!("{}/chat/completions", self.base_url);

        let request = CompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::user_prompt(content),
                },
            ],
            max_tokens: COMPLETION_MAX_TOKENS,
            temperature: COMPLETION_TEMPERATURE,
            response_format: ResponseFormat { kind: "json_object" },
        };

        debug!(url = %url, chars = content.len(), "Sending remote classification request");

        let response = client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RemoteError::Transport(format!(
                "completion request failed with status {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteError::Protocol(format!("invalid completion payload: {}", e)))?;

        let verdict_json = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RemoteError::Protocol("completion contained no choices".to_string()))?;

        parse_verdict(&verdict_json)
    }
}

/// Validates the model's JSON answer and clamps the confidence.
fn parse_verdict(raw: &str) -> Result<RemoteVerdict, RemoteError> {
    let raw: RawVerdict = serde_json::from_str(raw)
        .map_err(|e| RemoteError::Protocol(format!("invalid verdict JSON: {}", e)))?;

    let classification = match raw.classification.as_str() {
        "productive" => Classification::Productive,
        "unproductive" => Classification::Unproductive,
        other => {
            return Err(RemoteError::Protocol(format!(
                "unknown classification value {:?}",
                other
            )))
        }
    };

    Ok(RemoteVerdict {
        classification,
        confidence: raw.confidence.clamp(0.5, 1.0),
        reasoning: raw.reasoning,
        suggested_response: raw.suggested_response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server_url: &str) -> Settings {
        Settings {
            openai_api_key: Some("test-key".to_string()),
            openai_base_url: Some(server_url.to_string()),
            ..Settings::default()
        }
    }

    fn completion_body(verdict: serde_json::Value) -> serde_json::Value {
        json!({
            "choices": [
                { "message": { "role": "assistant", "content": verdict.to_string() } }
            ]
        })
    }

    #[test]
    fn test_missing_credential_fails_closed() {
        let settings = Settings {
            openai_api_key: None,
            ..Settings::default()
        };
        let adapter = RemoteClassifier::from_settings(&settings);
        assert!(!adapter.is_available());
    }

    #[tokio::test]
    async fn test_unavailable_adapter_returns_unavailable_error() {
        let settings = Settings {
            openai_api_key: None,
            ..Settings::default()
        };
        let adapter = RemoteClassifier::from_settings(&settings);

        let result = adapter.classify("qualquer conteúdo").await;
        assert!(matches!(result, Err(RemoteError::Unavailable)));
    }

    #[tokio::test]
    async fn test_successful_classification() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(json!({
                "classification": "productive",
                "confidence": 0.92,
                "reasoning": "pede aprovação com prazo",
                "suggested_response": "Vou revisar e aprovar hoje."
            }))))
            .mount(&server)
            .await;

        let adapter = RemoteClassifier::from_settings(&settings_for(&server.uri()));
        let verdict = adapter
            .classify("Preciso da aprovação até amanhã")
            .await
            .expect("classification should succeed");

        assert_eq!(verdict.classification, Classification::Productive);
        assert!((verdict.confidence - 0.92).abs() < 1e-9);
        assert_eq!(verdict.suggested_response, "Vou revisar e aprovar hoje.");
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_clamped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(json!({
                "classification": "productive",
                "confidence": 1.4,
                "reasoning": "r",
                "suggested_response": "s"
            }))))
            .mount(&server)
            .await;

        let adapter = RemoteClassifier::from_settings(&settings_for(&server.uri()));
        let verdict = adapter.classify("conteúdo").await.unwrap();
        assert!((verdict.confidence - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_key_is_a_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(json!({
                "classification": "productive",
                "confidence": 0.8
            }))))
            .mount(&server)
            .await;

        let adapter = RemoteClassifier::from_settings(&settings_for(&server.uri()));
        let result = adapter.classify("conteúdo").await;
        assert!(matches!(result, Err(RemoteError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_unknown_classification_is_a_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(json!({
                "classification": "maybe",
                "confidence": 0.8,
                "reasoning": "r",
                "suggested_response": "s"
            }))))
            .mount(&server)
            .await;

        let adapter = RemoteClassifier::from_settings(&settings_for(&server.uri()));
        let result = adapter.classify("conteúdo").await;
        assert!(matches!(result, Err(RemoteError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let adapter = RemoteClassifier::from_settings(&settings_for(&server.uri()));
        let result = adapter.classify("conteúdo").await;

        match result {
            Err(RemoteError::Transport(msg)) => {
                assert!(msg.contains("500"));
            }
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_verdict_is_a_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [ { "message": { "role": "assistant", "content": "sem estrutura" } } ]
            })))
            .mount(&server)
            .await;

        let adapter = RemoteClassifier::from_settings(&settings_for(&server.uri()));
        let result = adapter.classify("conteúdo").await;
        assert!(matches!(result, Err(RemoteError::Protocol(_))));
    }

    #[test]
    fn test_parse_verdict_accepts_integer_confidence() {
        let verdict = parse_verdict(
            r#"{"classification":"unproductive","confidence":1,"reasoning":"r","suggested_response":"s"}"#,
        )
        .unwrap();
        assert_eq!(verdict.classification, Classification::Unproductive);
        assert!((verdict.confidence - 1.0).abs() < 1e-9);
    }
}
