//! Configuration check and first-run setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::infrastructure::ports::{NarratorPort, RepoError, StorageInit};

/// Mutable configuration shared between the check and setup use cases.
///
/// Only the storage path lives here; the narrator credential is owned by the
/// narrator client itself.
pub struct ConfigState {
    db_path: RwLock<PathBuf>,
}

impl ConfigState {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: RwLock::new(db_path.into()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigStatus {
    pub db_exists: bool,
    pub has_api_key: bool,
    pub config_complete: bool,
}

/// Reports whether the engine is ready to play.
pub struct CheckConfig {
    state: Arc<ConfigState>,
    narrator: Arc<dyn NarratorPort>,
}

impl CheckConfig {
    pub fn new(state: Arc<ConfigState>, narrator: Arc<dyn NarratorPort>) -> Self {
        Self { state, narrator }
    }

    pub async fn execute(&self) -> ConfigStatus {
        let db_exists = self.state.db_path.read().await.exists();
        let has_api_key = self.narrator.has_credential().await;
        ConfigStatus {
            db_exists,
            has_api_key,
            config_complete: db_exists && has_api_key,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SetupConfigError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Could not persist configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// First-run setup: persist the configuration, initialize storage, and
/// install the narrator credential into the running client.
///
/// A changed storage path only affects the serving pool on next start; the
/// schema is still created immediately so `check-config` reports readiness.
pub struct SetupConfig {
    state: Arc<ConfigState>,
    narrator: Arc<dyn NarratorPort>,
    storage: Arc<dyn StorageInit>,
    env_file: PathBuf,
}

impl SetupConfig {
    pub fn new(
        state: Arc<ConfigState>,
        narrator: Arc<dyn NarratorPort>,
        storage: Arc<dyn StorageInit>,
        env_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            state,
            narrator,
            storage,
            env_file: env_file.into(),
        }
    }

    pub async fn execute(&self, db_path: &str, api_key: &str) -> Result<(), SetupConfigError> {
        let contents = format!("DB_PATH={db_path}\nGEMINI_API_KEY={api_key}\n");
        tokio::fs::write(&self.env_file, contents).await?;

        self.storage.initialize(db_path).await?;

        let credential = Some(api_key.to_string()).filter(|key| !key.trim().is_empty());
        self.narrator.set_credential(credential).await;

        *self.state.db_path.write().await = Path::new(db_path).to_path_buf();

        tracing::info!(db_path, "Configuration saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::gemini::{GeminiClient, DEFAULT_GEMINI_BASE_URL};
    use crate::infrastructure::sqlite::SqliteInitializer;

    #[tokio::test]
    async fn setup_persists_env_and_completes_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("game.db");
        let db_path = db_path.to_string_lossy().to_string();
        let env_file = dir.path().join(".env");

        let state = Arc::new(ConfigState::new(&db_path));
        let narrator = Arc::new(GeminiClient::new(DEFAULT_GEMINI_BASE_URL, None));

        let check = CheckConfig::new(state.clone(), narrator.clone());
        let before = check.execute().await;
        assert!(!before.db_exists);
        assert!(!before.has_api_key);
        assert!(!before.config_complete);

        let setup = SetupConfig::new(
            state,
            narrator,
            Arc::new(SqliteInitializer),
            &env_file,
        );
        setup.execute(&db_path, "test-key").await.expect("setup");

        let after = check.execute().await;
        assert!(after.db_exists);
        assert!(after.has_api_key);
        assert!(after.config_complete);

        let written = std::fs::read_to_string(&env_file).expect("env file");
        assert!(written.contains(&format!("DB_PATH={db_path}")));
        assert!(written.contains("GEMINI_API_KEY=test-key"));
    }

    #[tokio::test]
    async fn empty_api_key_leaves_credential_unset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("game.db");
        let db_path = db_path.to_string_lossy().to_string();

        let state = Arc::new(ConfigState::new(&db_path));
        let narrator = Arc::new(GeminiClient::new(DEFAULT_GEMINI_BASE_URL, None));

        let setup = SetupConfig::new(
            state.clone(),
            narrator.clone(),
            Arc::new(SqliteInitializer),
            dir.path().join(".env"),
        );
        setup.execute(&db_path, "").await.expect("setup");

        let status = CheckConfig::new(state, narrator).execute().await;
        assert!(status.db_exists);
        assert!(!status.has_api_key);
        assert!(!status.config_complete);
    }
}
