//! Session lifecycle: creating a game and joining an existing one.

use std::sync::Arc;

use dungeonscrum_domain::{
    ChatMessage, GameSession, Player, PlayerClass, SessionToken, NARRATOR_AUTHOR,
};

use crate::infrastructure::ports::{ClockPort, MessageRepo, PlayerRepo, RepoError, SessionRepo};
use crate::use_cases::validation::{require_non_empty, ValidationError};

/// Narrator-authored opening line of every new session.
pub const WELCOME_MESSAGE: &str = "¡Bienvenidos a Dungeon and Scrum! El equipo ágil se encuentra en la entrada de la oficina digital. ¿Qué harán primero?";

/// Use case for starting a new game session.
pub struct CreateGame {
    sessions: Arc<dyn SessionRepo>,
    players: Arc<dyn PlayerRepo>,
    messages: Arc<dyn MessageRepo>,
    clock: Arc<dyn ClockPort>,
}

#[derive(Debug, Clone)]
pub struct CreatedGame {
    pub session: GameSession,
    pub player: Player,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateGameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl CreateGame {
    pub fn new(
        sessions: Arc<dyn SessionRepo>,
        players: Arc<dyn PlayerRepo>,
        messages: Arc<dyn MessageRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            sessions,
            players,
            messages,
            clock,
        }
    }

    /// Create a session, its first player, and the welcome message at
    /// sequence 1.
    pub async fn execute(
        &self,
        name: &str,
        class: PlayerClass,
    ) -> Result<CreatedGame, CreateGameError> {
        require_non_empty(name, "nombre")?;

        let now = self.clock.now();
        let token = SessionToken::generate();

        let session = GameSession::new(token.clone(), now);
        self.sessions.insert(&session).await?;

        let player = Player::new(name, class, token.clone());
        self.players.insert(&player).await?;

        let welcome = ChatMessage::from_narrator(1, WELCOME_MESSAGE, token, now);
        self.messages.insert(&welcome).await?;

        tracing::info!(token = %session.token, player = %player.name, "Game session created");
        Ok(CreatedGame { session, player })
    }
}

/// Use case for joining an existing game session.
pub struct JoinGame {
    sessions: Arc<dyn SessionRepo>,
    players: Arc<dyn PlayerRepo>,
    messages: Arc<dyn MessageRepo>,
    clock: Arc<dyn ClockPort>,
}

#[derive(Debug, Clone)]
pub struct JoinedGame {
    pub token: SessionToken,
    pub player: Player,
}

#[derive(Debug, thiserror::Error)]
pub enum JoinGameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Partida no encontrada")]
    GameNotFound,
    #[error("Ya existe un jugador con ese nombre en la partida")]
    DuplicateName,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl JoinGame {
    pub fn new(
        sessions: Arc<dyn SessionRepo>,
        players: Arc<dyn PlayerRepo>,
        messages: Arc<dyn MessageRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            sessions,
            players,
            messages,
            clock,
        }
    }

    /// Add a player to an existing session and announce the join in the
    /// transcript.
    pub async fn execute(
        &self,
        name: &str,
        class: PlayerClass,
        token: &SessionToken,
    ) -> Result<JoinedGame, JoinGameError> {
        require_non_empty(name, "nombre")?;

        self.sessions
            .get(token)
            .await?
            .ok_or(JoinGameError::GameNotFound)?;

        if self.players.find_by_name(token, name).await?.is_some() {
            return Err(JoinGameError::DuplicateName);
        }

        let player = Player::new(name, class, token.clone());
        self.players.insert(&player).await?;

        let next_sequence = self.messages.max_sequence(token).await? + 1;
        let announcement = ChatMessage::from_narrator(
            next_sequence,
            format!("¡{name} se ha unido a la aventura!"),
            token.clone(),
            self.clock.now(),
        );
        self.messages.insert(&announcement).await?;

        tracing::info!(token = %token, player = %player.name, "Player joined session");
        Ok(JoinedGame {
            token: token.clone(),
            player,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::sqlite::SqliteRepositories;

    async fn use_cases() -> (CreateGame, JoinGame, Arc<SqliteRepositories>) {
        let repos = Arc::new(SqliteRepositories::in_memory().await.expect("in-memory db"));
        let clock = Arc::new(SystemClock::new());
        let create = CreateGame::new(
            repos.clone(),
            repos.clone(),
            repos.clone(),
            clock.clone(),
        );
        let join = JoinGame::new(repos.clone(), repos.clone(), repos.clone(), clock);
        (create, join, repos)
    }

    #[tokio::test]
    async fn create_game_seeds_player_and_welcome_message() {
        let (create, _join, repos) = use_cases().await;

        let created = create
            .execute("Ana", PlayerClass::Desarrollador)
            .await
            .expect("create game");

        assert_eq!(created.session.token.as_str().len(), 8);
        assert_eq!(created.player.name, "Ana");
        assert_eq!(created.player.rank, "Junior");

        let roster = PlayerRepo::list_in_session(&*repos, &created.session.token)
            .await
            .expect("roster");
        assert_eq!(roster.len(), 1);

        let transcript = MessageRepo::list_in_session(&*repos, &created.session.token)
            .await
            .expect("transcript");
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].sequence, 1);
        assert_eq!(transcript[0].author, NARRATOR_AUTHOR);
        assert!(transcript[0].text.starts_with("¡Bienvenidos"));
    }

    #[tokio::test]
    async fn create_game_issues_fresh_tokens() {
        let (create, _join, _repos) = use_cases().await;

        let first = create
            .execute("Ana", PlayerClass::Tester)
            .await
            .expect("first game");
        let second = create
            .execute("Ana", PlayerClass::Tester)
            .await
            .expect("second game");
        assert_ne!(first.session.token, second.session.token);
    }

    #[tokio::test]
    async fn create_game_rejects_blank_names() {
        let (create, _join, _repos) = use_cases().await;
        let err = create
            .execute("  ", PlayerClass::Tester)
            .await
            .expect_err("blank name");
        assert!(matches!(err, CreateGameError::Validation(_)));
    }

    #[tokio::test]
    async fn join_announces_at_next_sequence() {
        let (create, join, repos) = use_cases().await;
        let created = create
            .execute("Ana", PlayerClass::Desarrollador)
            .await
            .expect("create game");

        let joined = join
            .execute("Bob", PlayerClass::Tester, &created.session.token)
            .await
            .expect("join game");
        assert_eq!(joined.player.energy, 15);

        let transcript = MessageRepo::list_in_session(&*repos, &created.session.token)
            .await
            .expect("transcript");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].sequence, 2);
        assert_eq!(transcript[1].text, "¡Bob se ha unido a la aventura!");
    }

    #[tokio::test]
    async fn join_rejects_unknown_session() {
        let (_create, join, _repos) = use_cases().await;
        let token: SessionToken = "zzzzzzzz".parse().expect("token shape");

        let err = join
            .execute("Bob", PlayerClass::Tester, &token)
            .await
            .expect_err("unknown session");
        assert!(matches!(err, JoinGameError::GameNotFound));
    }

    #[tokio::test]
    async fn join_rejects_duplicate_name_in_same_session_only() {
        let (create, join, _repos) = use_cases().await;
        let first = create
            .execute("Ana", PlayerClass::Desarrollador)
            .await
            .expect("first game");
        let second = create
            .execute("Ana", PlayerClass::Desarrollador)
            .await
            .expect("second game");

        let err = join
            .execute("Ana", PlayerClass::Tester, &first.session.token)
            .await
            .expect_err("duplicate in same session");
        assert!(matches!(err, JoinGameError::DuplicateName));

        // Same name in a different session is fine.
        join.execute("Bob", PlayerClass::Tester, &second.session.token)
            .await
            .expect("join other session");
    }
}
