//! Infrastructure: SQLite persistence, the Gemini narrator client, clock,
//! and environment configuration.

pub mod clock;
pub mod config;
pub mod gemini;
pub mod ports;
pub mod sqlite;
