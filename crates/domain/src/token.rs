//! Session token value object.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

/// Length of a session token in characters.
pub const TOKEN_LENGTH: usize = 8;

/// Short, unguessable identifier for a game session.
///
/// Generated as the first 8 hex characters of a fresh UUIDv4. Tokens arriving
/// over the wire only need to be 8 alphanumeric characters; whether they name
/// an existing session is decided by a lookup, not by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a new random token.
    ///
    /// Collision probability over 8 hex characters is accepted as negligible;
    /// the sessions table primary key is the backstop.
    pub fn generate() -> Self {
        let mut hex = Uuid::new_v4().simple().to_string();
        hex.truncate(TOKEN_LENGTH);
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionToken {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != TOKEN_LENGTH || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::parse(format!("Invalid session token: {s}")));
        }
        Ok(Self(s.to_string()))
    }
}
