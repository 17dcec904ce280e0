//! SQLite-backed storage for sessions, players, and messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use dungeonscrum_domain::{
    ChatMessage, GameSession, MessageId, Player, PlayerClass, PlayerId, SessionToken,
};

use crate::infrastructure::ports::{
    MessageRepo, PlayerRepo, RepoError, SessionRepo, StorageInit,
};

/// All three entity repositories over one shared pool.
pub struct SqliteRepositories {
    pool: SqlitePool,
}

impl SqliteRepositories {
    /// Open (creating if needed) the database at `db_path` and ensure the
    /// schema exists.
    pub async fn connect(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{db_path}?mode=rwc"))
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// In-memory database for tests. Single connection so every query sees
    /// the same database.
    pub async fn in_memory() -> Result<Self, RepoError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }
}

/// Create the tables if they do not exist yet.
async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepoError::database("schema", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS players (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            class TEXT NOT NULL,
            rank TEXT NOT NULL,
            energy INTEGER NOT NULL,
            action_points INTEGER NOT NULL,
            experience INTEGER NOT NULL,
            session_token TEXT NOT NULL REFERENCES sessions (token),
            UNIQUE (session_token, name)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepoError::database("schema", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            sequence INTEGER NOT NULL,
            author TEXT NOT NULL,
            text TEXT NOT NULL,
            session_token TEXT NOT NULL REFERENCES sessions (token),
            timestamp TEXT NOT NULL,
            UNIQUE (session_token, sequence)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepoError::database("schema", e))?;

    Ok(())
}

/// Schema initializer for the setup endpoint - creates the database file and
/// tables at an arbitrary path, then drops the connection.
pub struct SqliteInitializer;

#[async_trait]
impl StorageInit for SqliteInitializer {
    async fn initialize(&self, db_path: &str) -> Result<(), RepoError> {
        let repos = SqliteRepositories::connect(db_path).await?;
        repos.pool.close().await;
        Ok(())
    }
}

// =============================================================================
// Row mapping
// =============================================================================

fn parse_token(raw: &str) -> Result<SessionToken, RepoError> {
    raw.parse()
        .map_err(|e| RepoError::Serialization(format!("session token: {e}")))
}

fn parse_uuid(raw: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(raw).map_err(|e| RepoError::Serialization(format!("uuid: {e}")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::Serialization(format!("timestamp: {e}")))
}

fn player_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Player, RepoError> {
    let id: String = row.get("id");
    let class: String = row.get("class");
    let token: String = row.get("session_token");

    Ok(Player {
        id: PlayerId::from_uuid(parse_uuid(&id)?),
        name: row.get("name"),
        class: class
            .parse::<PlayerClass>()
            .map_err(|e| RepoError::Serialization(e.to_string()))?,
        rank: row.get("rank"),
        energy: row.get("energy"),
        action_points: row.get("action_points"),
        experience: row.get("experience"),
        session_token: parse_token(&token)?,
    })
}

fn message_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ChatMessage, RepoError> {
    let id: String = row.get("id");
    let token: String = row.get("session_token");
    let timestamp: String = row.get("timestamp");

    Ok(ChatMessage {
        id: MessageId::from_uuid(parse_uuid(&id)?),
        sequence: row.get("sequence"),
        author: row.get("author"),
        text: row.get("text"),
        session_token: parse_token(&token)?,
        timestamp: parse_timestamp(&timestamp)?,
    })
}

// =============================================================================
// Port implementations
// =============================================================================

#[async_trait]
impl SessionRepo for SqliteRepositories {
    async fn insert(&self, session: &GameSession) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO sessions (token, created_at) VALUES (?, ?)")
            .bind(session.token.as_str())
            .bind(session.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("sessions", e))?;
        Ok(())
    }

    async fn get(&self, token: &SessionToken) -> Result<Option<GameSession>, RepoError> {
        let row = sqlx::query("SELECT token, created_at FROM sessions WHERE token = ?")
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("sessions", e))?;

        match row {
            Some(row) => {
                let raw_token: String = row.get("token");
                let created_at: String = row.get("created_at");
                Ok(Some(GameSession::new(
                    parse_token(&raw_token)?,
                    parse_timestamp(&created_at)?,
                )))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PlayerRepo for SqliteRepositories {
    async fn insert(&self, player: &Player) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO players (id, name, class, rank, energy, action_points, experience, session_token)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(player.id.to_string())
        .bind(&player.name)
        .bind(player.class.to_string())
        .bind(&player.rank)
        .bind(player.energy)
        .bind(player.action_points)
        .bind(player.experience)
        .bind(player.session_token.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("players", e))?;
        Ok(())
    }

    async fn list_in_session(&self, token: &SessionToken) -> Result<Vec<Player>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, class, rank, energy, action_points, experience, session_token
            FROM players
            WHERE session_token = ?
            ORDER BY rowid
            "#,
        )
        .bind(token.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("players", e))?;

        rows.iter().map(player_from_row).collect()
    }

    async fn find_by_name(
        &self,
        token: &SessionToken,
        name: &str,
    ) -> Result<Option<Player>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, class, rank, energy, action_points, experience, session_token
            FROM players
            WHERE session_token = ? AND name = ?
            "#,
        )
        .bind(token.as_str())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("players", e))?;

        row.as_ref().map(player_from_row).transpose()
    }
}

#[async_trait]
impl MessageRepo for SqliteRepositories {
    async fn insert(&self, message: &ChatMessage) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sequence, author, text, session_token, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.id.to_string())
        .bind(message.sequence)
        .bind(&message.author)
        .bind(&message.text)
        .bind(message.session_token.as_str())
        .bind(message.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("messages", e))?;
        Ok(())
    }

    async fn list_in_session(&self, token: &SessionToken) -> Result<Vec<ChatMessage>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sequence, author, text, session_token, timestamp
            FROM messages
            WHERE session_token = ?
            ORDER BY sequence ASC
            "#,
        )
        .bind(token.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("messages", e))?;

        rows.iter().map(message_from_row).collect()
    }

    async fn max_sequence(&self, token: &SessionToken) -> Result<i64, RepoError> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(sequence), 0) AS max_sequence FROM messages WHERE session_token = ?",
        )
        .bind(token.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::database("messages", e))?;

        Ok(row.get("max_sequence"))
    }

    async fn recent(
        &self,
        token: &SessionToken,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sequence, author, text, session_token, timestamp
            FROM messages
            WHERE session_token = ?
            ORDER BY sequence DESC
            LIMIT ?
            "#,
        )
        .bind(token.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("messages", e))?;

        rows.iter().map(message_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn repos_with_session(token: &SessionToken) -> SqliteRepositories {
        let repos = SqliteRepositories::in_memory().await.expect("in-memory db");
        SessionRepo::insert(&repos, &GameSession::new(token.clone(), Utc::now()))
            .await
            .expect("insert session");
        repos
    }

    fn token(raw: &str) -> SessionToken {
        raw.parse().expect("valid token")
    }

    #[tokio::test]
    async fn session_roundtrip() {
        let t = token("0a1b2c3d");
        let repos = repos_with_session(&t).await;

        let found = SessionRepo::get(&repos, &t).await.expect("get session");
        assert_eq!(found.expect("exists").token, t);

        let missing = SessionRepo::get(&repos, &token("zzzzzzzz"))
            .await
            .expect("get session");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn players_keep_insertion_order_and_unique_names() {
        let t = token("0a1b2c3d");
        let repos = repos_with_session(&t).await;

        let ana = Player::new("Ana", PlayerClass::Desarrollador, t.clone());
        let bob = Player::new("Bob", PlayerClass::Tester, t.clone());
        PlayerRepo::insert(&repos, &ana).await.expect("insert Ana");
        PlayerRepo::insert(&repos, &bob).await.expect("insert Bob");

        let roster = PlayerRepo::list_in_session(&repos, &t)
            .await
            .expect("list players");
        assert_eq!(
            roster.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            ["Ana", "Bob"]
        );

        // Same name, same session: constraint violation.
        let dup = Player::new("Ana", PlayerClass::Disenador, t.clone());
        assert!(matches!(
            PlayerRepo::insert(&repos, &dup).await,
            Err(RepoError::Database(_))
        ));

        let found = repos.find_by_name(&t, "Ana").await.expect("find");
        assert_eq!(found.expect("Ana exists").class, PlayerClass::Desarrollador);
        // Case-sensitive exact match.
        assert!(repos.find_by_name(&t, "ana").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn messages_are_ordered_by_sequence() {
        let t = token("0a1b2c3d");
        let repos = repos_with_session(&t).await;
        let now = Utc::now();

        for (sequence, text) in [(1, "uno"), (2, "dos"), (3, "tres")] {
            MessageRepo::insert(
                &repos,
                &ChatMessage::new(sequence, "Ana", text, t.clone(), now),
            )
            .await
            .expect("insert message");
        }

        let transcript = MessageRepo::list_in_session(&repos, &t)
            .await
            .expect("list messages");
        assert_eq!(
            transcript.iter().map(|m| m.sequence).collect::<Vec<_>>(),
            [1, 2, 3]
        );

        assert_eq!(repos.max_sequence(&t).await.expect("max"), 3);
        assert_eq!(
            repos.max_sequence(&token("eeeeeeee")).await.expect("max"),
            0
        );

        let recent = repos.recent(&t, 2).await.expect("recent");
        assert_eq!(
            recent.iter().map(|m| m.sequence).collect::<Vec<_>>(),
            [3, 2]
        );
    }

    #[tokio::test]
    async fn utf8_text_is_preserved() {
        let t = token("0a1b2c3d");
        let repos = repos_with_session(&t).await;
        let text = "¡Señoría! — «déjà vu» 🎲";

        MessageRepo::insert(
            &repos,
            &ChatMessage::new(1, "Ana", text, t.clone(), Utc::now()),
        )
        .await
        .expect("insert message");

        let transcript = MessageRepo::list_in_session(&repos, &t)
            .await
            .expect("list messages");
        assert_eq!(transcript[0].text, text);
    }

    #[tokio::test]
    async fn initializer_creates_schema_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("game.db");
        let db_path = db_path.to_string_lossy();

        SqliteInitializer
            .initialize(&db_path)
            .await
            .expect("initialize");

        // Reopening sees the schema and an empty sessions table.
        let repos = SqliteRepositories::connect(&db_path)
            .await
            .expect("reconnect");
        let missing = SessionRepo::get(&repos, &token("0a1b2c3d"))
            .await
            .expect("query");
        assert!(missing.is_none());
    }
}
