//! Gemini narrator client (generateContent API).
//!
//! Every failure mode degrades to a sentinel reply string so callers never
//! have to handle narrator errors - a degraded reply is still a valid
//! transcript line.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::infrastructure::ports::NarratorPort;

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used for narrator replies.
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Reply when no API key is configured.
pub const MISSING_KEY_REPLY: &str = "Error: No se ha configurado la API key de Gemini";

/// Reply when the API answers without any candidate text.
pub const THINKING_REPLY: &str = "El Dungeon Master está pensando...";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Gemini generateContent endpoint.
///
/// The credential lives behind a lock so the setup endpoint can install it at
/// runtime without restarting the engine.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: RwLock<Option<String>>,
}

#[derive(Debug, thiserror::Error)]
enum NarratorError {
    #[error("status {0}")]
    BadStatus(u16),
    #[error("{0}")]
    Transport(String),
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: RwLock::new(api_key),
        }
    }

    async fn request_completion(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> Result<Option<String>, NarratorError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, GEMINI_MODEL
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| NarratorError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NarratorError::BadStatus(response.status().as_u16()));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| NarratorError::Transport(e.to_string()))?;

        Ok(first_candidate_text(api_response))
    }
}

#[async_trait]
impl NarratorPort for GeminiClient {
    async fn narrate(&self, context: &str, player_message: &str) -> String {
        let Some(api_key) = self.api_key.read().await.clone() else {
            return MISSING_KEY_REPLY.to_string();
        };

        let prompt = build_prompt(context, player_message);

        match self.request_completion(&api_key, &prompt).await {
            Ok(Some(text)) => text,
            Ok(None) => THINKING_REPLY.to_string(),
            Err(NarratorError::BadStatus(status)) => {
                tracing::warn!(status, "Gemini returned a non-success status");
                format!("Error en la API de Gemini: {status}")
            }
            Err(NarratorError::Transport(msg)) => {
                tracing::warn!(error = %msg, "Gemini request failed");
                format!("Error al comunicarse con Gemini: {msg}")
            }
        }
    }

    async fn has_credential(&self) -> bool {
        self.api_key.read().await.is_some()
    }

    async fn set_credential(&self, api_key: Option<String>) {
        *self.api_key.write().await = api_key;
    }
}

/// Fixed narrator prompt embedding the session context and the player's
/// latest message.
fn build_prompt(context: &str, player_message: &str) -> String {
    format!(
        r#"Eres el Dungeon Master de un juego de rol llamado "Dungeon and Scrum" donde los jugadores son roles de metodologías ágiles.

Contexto del juego:
{context}

Último mensaje del jugador: {player_message}

Responde como Dungeon Master, creando una narrativa creativa y contextual basada en la acción del jugador.
Mantén un tono divertido y relacionado con el mundo del desarrollo de software y metodologías ágiles.
Tu respuesta debe ser de 2-4 oraciones máximo."#
    )
}

fn first_candidate_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .filter(|text| !text.is_empty())
}

// =============================================================================
// Gemini API types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_context_and_player_message() {
        let prompt = build_prompt("Jugadores en la partida: []", "abro el backlog");
        assert!(prompt.contains("Dungeon and Scrum"));
        assert!(prompt.contains("Jugadores en la partida: []"));
        assert!(prompt.contains("Último mensaje del jugador: abro el backlog"));
        assert!(prompt.contains("2-4 oraciones"));
    }

    #[tokio::test]
    async fn missing_credential_short_circuits_without_network() {
        let client = GeminiClient::new(DEFAULT_GEMINI_BASE_URL, None);
        let reply = client.narrate("contexto", "hola").await;
        assert_eq!(reply, MISSING_KEY_REPLY);
    }

    #[tokio::test]
    async fn credential_can_be_installed_at_runtime() {
        let client = GeminiClient::new(DEFAULT_GEMINI_BASE_URL, None);
        assert!(!client.has_credential().await);
        client.set_credential(Some("test-key".into())).await;
        assert!(client.has_credential().await);
    }

    #[test]
    fn extracts_first_candidate_text() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "El sprint comienza."}]}}
            ]
        }))
        .expect("valid response");
        assert_eq!(
            first_candidate_text(response).as_deref(),
            Some("El sprint comienza.")
        );
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({})).expect("valid response");
        assert_eq!(first_candidate_text(response), None);

        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": ""}]}}]
        }))
        .expect("valid response");
        assert_eq!(first_candidate_text(response), None);
    }
}
