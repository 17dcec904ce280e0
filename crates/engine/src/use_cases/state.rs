//! Read-only session state: roster and transcript queries.

use std::sync::Arc;

use dungeonscrum_domain::{ChatMessage, Player, SessionToken};

use crate::infrastructure::ports::{MessageRepo, PlayerRepo, RepoError};

/// Current player roster of a session, in join order.
pub struct GetRoster {
    players: Arc<dyn PlayerRepo>,
}

impl GetRoster {
    pub fn new(players: Arc<dyn PlayerRepo>) -> Self {
        Self { players }
    }

    /// An unknown or empty session yields an empty roster, not an error.
    pub async fn execute(&self, token: &SessionToken) -> Result<Vec<Player>, RepoError> {
        self.players.list_in_session(token).await
    }
}

/// Full chat transcript of a session, ordered by sequence.
pub struct GetTranscript {
    messages: Arc<dyn MessageRepo>,
}

impl GetTranscript {
    pub fn new(messages: Arc<dyn MessageRepo>) -> Self {
        Self { messages }
    }

    pub async fn execute(&self, token: &SessionToken) -> Result<Vec<ChatMessage>, RepoError> {
        self.messages.list_in_session(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::ports::ClockPort;
    use crate::infrastructure::sqlite::SqliteRepositories;
    use dungeonscrum_domain::{GameSession, PlayerClass};

    #[tokio::test]
    async fn unknown_session_yields_empty_collections() {
        let repos = Arc::new(SqliteRepositories::in_memory().await.expect("in-memory db"));
        let token: SessionToken = "zzzzzzzz".parse().expect("token shape");

        let roster = GetRoster::new(repos.clone())
            .execute(&token)
            .await
            .expect("roster");
        assert!(roster.is_empty());

        let transcript = GetTranscript::new(repos)
            .execute(&token)
            .await
            .expect("transcript");
        assert!(transcript.is_empty());
    }

    #[tokio::test]
    async fn roster_reports_class_stats() {
        let repos = Arc::new(SqliteRepositories::in_memory().await.expect("in-memory db"));
        let clock = SystemClock::new();
        let token: SessionToken = "0a1b2c3d".parse().expect("token shape");

        crate::infrastructure::ports::SessionRepo::insert(
            &*repos,
            &GameSession::new(token.clone(), clock.now()),
        )
        .await
        .expect("insert session");
        crate::infrastructure::ports::PlayerRepo::insert(
            &*repos,
            &Player::new("Ana", PlayerClass::Disenador, token.clone()),
        )
        .await
        .expect("insert player");

        let roster = GetRoster::new(repos).execute(&token).await.expect("roster");
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].energy, 30);
        assert_eq!(roster[0].action_points, 2);
        assert_eq!(roster[0].experience, 0);
    }
}
