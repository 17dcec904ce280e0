//! Core entities: game sessions, players, and transcript messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MessageId, PlayerClass, PlayerId, SessionToken};

/// Fixed author identity for messages produced by the narrator.
pub const NARRATOR_AUTHOR: &str = "IA";

/// One shared game instance, addressed by its token.
///
/// Immutable once created; sessions are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub token: SessionToken,
    pub created_at: DateTime<Utc>,
}

impl GameSession {
    pub fn new(token: SessionToken, created_at: DateTime<Utc>) -> Self {
        Self { token, created_at }
    }
}

/// A named participant in exactly one session.
///
/// `(session_token, name)` is unique, case-sensitive. Stats are assigned from
/// the class catalog at creation and not otherwise mutated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub class: PlayerClass,
    pub rank: String,
    pub energy: i64,
    pub action_points: i64,
    pub experience: i64,
    pub session_token: SessionToken,
}

impl Player {
    /// Create a player with class defaults: first rank, base stats, zero XP.
    pub fn new(name: impl Into<String>, class: PlayerClass, session_token: SessionToken) -> Self {
        let spec = class.spec();
        Self {
            id: PlayerId::new(),
            name: name.into(),
            class,
            rank: class.starting_rank().to_string(),
            energy: spec.energy,
            action_points: spec.action_points,
            experience: 0,
            session_token,
        }
    }
}

/// One line of a session's transcript.
///
/// Ordering authority is `sequence`; `timestamp` is informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub sequence: i64,
    pub author: String,
    pub text: String,
    pub session_token: SessionToken,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(
        sequence: i64,
        author: impl Into<String>,
        text: impl Into<String>,
        session_token: SessionToken,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            sequence,
            author: author.into(),
            text: text.into(),
            session_token,
            timestamp,
        }
    }

    /// A message authored by the narrator identity.
    pub fn from_narrator(
        sequence: i64,
        text: impl Into<String>,
        session_token: SessionToken,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(sequence, NARRATOR_AUTHOR, text, session_token, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> SessionToken {
        "a1b2c3d4".parse().expect("valid token")
    }

    #[test]
    fn new_player_gets_class_defaults() {
        let player = Player::new("Ana", PlayerClass::Desarrollador, token());
        assert_eq!(player.rank, "Junior");
        assert_eq!(player.energy, 10);
        assert_eq!(player.action_points, 4);
        assert_eq!(player.experience, 0);
    }

    #[test]
    fn narrator_messages_carry_the_fixed_author() {
        let msg = ChatMessage::from_narrator(1, "¡Bienvenidos!", token(), Utc::now());
        assert_eq!(msg.author, NARRATOR_AUTHOR);
        assert_eq!(msg.sequence, 1);
    }
}
