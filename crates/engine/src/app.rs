//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::ports::{
    ClockPort, MessageRepo, NarratorPort, PlayerRepo, SessionRepo, StorageInit,
};
use crate::infrastructure::{clock::SystemClock, sqlite::SqliteRepositories};
use crate::use_cases;

/// Main application state.
///
/// Holds all use cases, wired over shared repository ports. Passed to HTTP
/// handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub create_game: use_cases::CreateGame,
    pub join_game: use_cases::JoinGame,
    pub get_roster: use_cases::GetRoster,
    pub get_transcript: use_cases::GetTranscript,
    pub send_message: use_cases::SendMessage,
    pub check_config: use_cases::CheckConfig,
    pub setup_config: use_cases::SetupConfig,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        repos: Arc<SqliteRepositories>,
        narrator: Arc<dyn NarratorPort>,
        storage_init: Arc<dyn StorageInit>,
        config: &EngineConfig,
    ) -> Self {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

        let session_repo: Arc<dyn SessionRepo> = repos.clone();
        let player_repo: Arc<dyn PlayerRepo> = repos.clone();
        let message_repo: Arc<dyn MessageRepo> = repos;

        let config_state = Arc::new(use_cases::ConfigState::new(&config.db_path));

        let use_cases = UseCases {
            create_game: use_cases::CreateGame::new(
                session_repo.clone(),
                player_repo.clone(),
                message_repo.clone(),
                clock.clone(),
            ),
            join_game: use_cases::JoinGame::new(
                session_repo,
                player_repo.clone(),
                message_repo.clone(),
                clock.clone(),
            ),
            get_roster: use_cases::GetRoster::new(player_repo.clone()),
            get_transcript: use_cases::GetTranscript::new(message_repo.clone()),
            send_message: use_cases::SendMessage::new(
                player_repo,
                message_repo,
                narrator.clone(),
                clock,
            ),
            check_config: use_cases::CheckConfig::new(config_state.clone(), narrator.clone()),
            setup_config: use_cases::SetupConfig::new(config_state, narrator, storage_init, ".env"),
        };

        Self { use_cases }
    }
}
