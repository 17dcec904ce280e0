//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete
//! types. Ports exist for:
//! - Database access (could swap SQLite -> Postgres)
//! - Narrator calls (could swap Gemini -> Ollama/OpenAI)
//! - Clock (for testing)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dungeonscrum_domain::{ChatMessage, GameSession, Player, SessionToken};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    pub fn database(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Database(format!("{context}: {err}"))
    }
}

// =============================================================================
// Database Ports (one per entity type)
// =============================================================================

#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn insert(&self, session: &GameSession) -> Result<(), RepoError>;
    async fn get(&self, token: &SessionToken) -> Result<Option<GameSession>, RepoError>;
}

#[async_trait]
pub trait PlayerRepo: Send + Sync {
    async fn insert(&self, player: &Player) -> Result<(), RepoError>;
    /// All players of a session in insertion order.
    async fn list_in_session(&self, token: &SessionToken) -> Result<Vec<Player>, RepoError>;
    /// Exact-match lookup, case-sensitive.
    async fn find_by_name(
        &self,
        token: &SessionToken,
        name: &str,
    ) -> Result<Option<Player>, RepoError>;
}

#[async_trait]
pub trait MessageRepo: Send + Sync {
    async fn insert(&self, message: &ChatMessage) -> Result<(), RepoError>;
    /// Full transcript ordered by sequence ascending.
    async fn list_in_session(&self, token: &SessionToken) -> Result<Vec<ChatMessage>, RepoError>;
    /// Highest sequence in the session, 0 when the transcript is empty.
    async fn max_sequence(&self, token: &SessionToken) -> Result<i64, RepoError>;
    /// The most recent `limit` messages, newest first.
    async fn recent(&self, token: &SessionToken, limit: i64)
        -> Result<Vec<ChatMessage>, RepoError>;
}

/// Schema initialization at an arbitrary storage location (setup endpoint).
#[async_trait]
pub trait StorageInit: Send + Sync {
    async fn initialize(&self, db_path: &str) -> Result<(), RepoError>;
}

// =============================================================================
// Narrator Port
// =============================================================================

/// External text generation behind the narrator identity.
///
/// `narrate` is infallible by contract: every failure mode of the underlying
/// service degrades to a sentinel reply so the transcript's append-only flow
/// never breaks on collaborator errors.
#[async_trait]
pub trait NarratorPort: Send + Sync {
    async fn narrate(&self, context: &str, player_message: &str) -> String;
    async fn has_credential(&self) -> bool;
    async fn set_credential(&self, api_key: Option<String>);
}

// =============================================================================
// Clock Port
// =============================================================================

pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
