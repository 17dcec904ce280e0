//! Use cases - one struct per exposed operation.

pub mod chat;
pub mod config;
pub mod session;
pub mod state;
pub mod validation;

pub use chat::{SendMessage, SendMessageError, SentMessage};
pub use config::{CheckConfig, ConfigState, ConfigStatus, SetupConfig, SetupConfigError};
pub use session::{
    CreateGame, CreateGameError, CreatedGame, JoinGame, JoinGameError, JoinedGame,
};
pub use state::{GetRoster, GetTranscript};
pub use validation::ValidationError;
