//! Chat turn: append a player message, ask the narrator, append the reply.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::json;
use tokio::sync::Mutex;

use dungeonscrum_domain::{ChatMessage, Player, SessionToken};

use crate::infrastructure::ports::{
    ClockPort, MessageRepo, NarratorPort, PlayerRepo, RepoError,
};
use crate::use_cases::validation::{require_non_empty, ValidationError};

/// How many recent messages are serialized into the narrator's context.
const CONTEXT_MESSAGE_LIMIT: i64 = 5;

/// Use case for one full chat turn.
///
/// Writes for a given session are serialized through a per-session lock, so
/// the read-max-sequence-then-insert pair can never interleave between
/// concurrent turns of the same game.
pub struct SendMessage {
    players: Arc<dyn PlayerRepo>,
    messages: Arc<dyn MessageRepo>,
    narrator: Arc<dyn NarratorPort>,
    clock: Arc<dyn ClockPort>,
    session_locks: DashMap<String, Arc<Mutex<()>>>,
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub sequence: i64,
    pub author: String,
    pub text: String,
    pub narrator_reply: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SendMessageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl SendMessage {
    pub fn new(
        players: Arc<dyn PlayerRepo>,
        messages: Arc<dyn MessageRepo>,
        narrator: Arc<dyn NarratorPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            players,
            messages,
            narrator,
            clock,
            session_locks: DashMap::new(),
        }
    }

    pub async fn execute(
        &self,
        token: &SessionToken,
        author: &str,
        text: &str,
    ) -> Result<SentMessage, SendMessageError> {
        require_non_empty(author, "autor")?;
        require_non_empty(text, "texto")?;

        let lock = self
            .session_locks
            .entry(token.as_str().to_string())
            .or_default()
            .value()
            .clone();
        let _guard = lock.lock().await;

        let sequence = self.messages.max_sequence(token).await? + 1;
        let player_message =
            ChatMessage::new(sequence, author, text, token.clone(), self.clock.now());
        self.messages.insert(&player_message).await?;

        let roster = self.players.list_in_session(token).await?;
        let mut recent = self.messages.recent(token, CONTEXT_MESSAGE_LIMIT).await?;
        // recent() returns newest first; the prompt wants chronological order.
        recent.reverse();
        let context = build_context(&roster, &recent);

        // Narrator failures degrade to sentinel text; the turn still succeeds.
        let narrator_reply = self.narrator.narrate(&context, text).await;

        let reply_message = ChatMessage::from_narrator(
            sequence + 1,
            narrator_reply.clone(),
            token.clone(),
            self.clock.now(),
        );
        self.messages.insert(&reply_message).await?;

        tracing::debug!(token = %token, sequence, "Chat turn appended");
        Ok(SentMessage {
            sequence,
            author: author.to_string(),
            text: text.to_string(),
            narrator_reply,
        })
    }
}

/// Serialize roster and recent messages for the narrator prompt.
fn build_context(roster: &[Player], recent: &[ChatMessage]) -> String {
    let jugadores: Vec<_> = roster
        .iter()
        .map(|p| {
            json!({
                "nombre": p.name,
                "clase": p.class.to_string(),
                "nivel": p.rank,
                "energia": p.energy,
                "sp": p.action_points,
                "experiencia": p.experience,
            })
        })
        .collect();

    let ultimos_mensajes: Vec<_> = recent
        .iter()
        .map(|m| json!({ "autor": m.author, "texto": m.text }))
        .collect();

    format!(
        "Jugadores en la partida: {}\nÚltimos mensajes: {}",
        json!(jugadores),
        json!(ultimos_mensajes)
    )
}
