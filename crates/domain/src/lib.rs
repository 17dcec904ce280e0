pub mod classes;
pub mod entities;
pub mod error;
pub mod ids;
pub mod token;

pub use classes::{ClassSpec, PlayerClass};
pub use entities::{ChatMessage, GameSession, Player, NARRATOR_AUTHOR};
pub use error::DomainError;
pub use ids::{MessageId, PlayerId};
pub use token::SessionToken;
