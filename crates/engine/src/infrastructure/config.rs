//! Engine configuration, collected once from the environment at startup and
//! injected explicitly - no global mutable state.

use crate::infrastructure::gemini::DEFAULT_GEMINI_BASE_URL;

/// Default SQLite database location.
pub const DEFAULT_DB_PATH: &str = "dungeon_and_scrum.db";

/// Default listen port.
pub const DEFAULT_SERVER_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub db_path: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub server_host: String,
    pub server_port: u16,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Self {
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.into()),
            gemini_api_key,
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.into()),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: std::env::var("SERVER_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.into(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.into(),
            server_host: "0.0.0.0".into(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}
