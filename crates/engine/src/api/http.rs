//! HTTP routes and wire types.
//!
//! Field names stay in Spanish to match the front end.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use dungeonscrum_domain::{ChatMessage, DomainError, Player, PlayerClass, SessionToken};

use crate::app::App;
use crate::infrastructure::config::DEFAULT_DB_PATH;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::validation::require_present;
use crate::use_cases::{
    CreateGameError, JoinGameError, SendMessageError, SetupConfigError, ValidationError,
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/crear", post(create_game))
        .route("/unirse", post(join_game))
        .route("/estado", post(game_state))
        .route("/chat", post(chat_transcript))
        .route("/hablar", post(send_message))
        .route("/check-config", get(check_config))
        .route("/setup-config", post(setup_config))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Wire types
// =============================================================================

// Request fields are `Option<String>` so an absent field becomes a validation
// error instead of a deserialization failure.

#[derive(Debug, Deserialize)]
struct CreateGameRequest {
    nombre: Option<String>,
    clase: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JoinGameRequest {
    nombre: Option<String>,
    clase: Option<String>,
    partida: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenRequest {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    token: Option<String>,
    autor: Option<String>,
    texto: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SetupConfigRequest {
    db_path: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct PlayerSummary {
    nombre: String,
    clase: String,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            nombre: player.name.clone(),
            clase: player.class.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    token: SessionToken,
    mensaje: String,
    jugador: PlayerSummary,
}

#[derive(Debug, Serialize)]
struct RosterEntry {
    nombre: String,
    clase: String,
    nivel: String,
    energia: i64,
    sp: i64,
    experiencia: i64,
}

impl From<&Player> for RosterEntry {
    fn from(player: &Player) -> Self {
        Self {
            nombre: player.name.clone(),
            clase: player.class.to_string(),
            nivel: player.rank.clone(),
            energia: player.energy,
            sp: player.action_points,
            experiencia: player.experience,
        }
    }
}

#[derive(Debug, Serialize)]
struct TranscriptEntry {
    orden: i64,
    autor: String,
    texto: String,
}

impl From<&ChatMessage> for TranscriptEntry {
    fn from(message: &ChatMessage) -> Self {
        Self {
            orden: message.sequence,
            autor: message.author.clone(),
            texto: message.text.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatTurnResponse {
    orden: i64,
    autor: String,
    texto: String,
    respuesta_ia: String,
}

#[derive(Debug, Serialize)]
struct ConfigStatusResponse {
    db_exists: bool,
    has_api_key: bool,
    config_complete: bool,
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_game(
    State(app): State<Arc<App>>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let nombre = require_present(req.nombre, "nombre")?;
    let clase: PlayerClass = require_present(req.clase, "clase")?.parse()?;

    let created = app.use_cases.create_game.execute(&nombre, clase).await?;
    Ok(Json(SessionResponse {
        jugador: PlayerSummary::from(&created.player),
        token: created.session.token,
        mensaje: "Partida creada con éxito".to_string(),
    }))
}

async fn join_game(
    State(app): State<Arc<App>>,
    Json(req): Json<JoinGameRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let nombre = require_present(req.nombre, "nombre")?;
    let clase: PlayerClass = require_present(req.clase, "clase")?.parse()?;
    let token: SessionToken = require_present(req.partida, "partida")?.parse()?;

    let joined = app
        .use_cases
        .join_game
        .execute(&nombre, clase, &token)
        .await?;
    Ok(Json(SessionResponse {
        jugador: PlayerSummary::from(&joined.player),
        token: joined.token,
        mensaje: "Unido con éxito".to_string(),
    }))
}

async fn game_state(
    State(app): State<Arc<App>>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token: SessionToken = require_present(req.token, "token")?.parse()?;

    let roster = app.use_cases.get_roster.execute(&token).await?;
    let jugadores: Vec<RosterEntry> = roster.iter().map(RosterEntry::from).collect();
    Ok(Json(json!({ "jugadores": jugadores })))
}

async fn chat_transcript(
    State(app): State<Arc<App>>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token: SessionToken = require_present(req.token, "token")?.parse()?;

    let transcript = app.use_cases.get_transcript.execute(&token).await?;
    let mensajes: Vec<TranscriptEntry> = transcript.iter().map(TranscriptEntry::from).collect();
    Ok(Json(json!({ "mensajes": mensajes })))
}

async fn send_message(
    State(app): State<Arc<App>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ChatTurnResponse>, ApiError> {
    let token: SessionToken = require_present(req.token, "token")?.parse()?;
    let autor = require_present(req.autor, "autor")?;
    let texto = require_present(req.texto, "texto")?;

    let sent = app
        .use_cases
        .send_message
        .execute(&token, &autor, &texto)
        .await?;
    Ok(Json(ChatTurnResponse {
        orden: sent.sequence,
        autor: sent.author,
        texto: sent.text,
        respuesta_ia: sent.narrator_reply,
    }))
}

async fn check_config(State(app): State<Arc<App>>) -> Json<ConfigStatusResponse> {
    let status = app.use_cases.check_config.execute().await;
    Json(ConfigStatusResponse {
        db_exists: status.db_exists,
        has_api_key: status.has_api_key,
        config_complete: status.config_complete,
    })
}

async fn setup_config(
    State(app): State<Arc<App>>,
    Json(req): Json<SetupConfigRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db_path = req
        .db_path
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
    let api_key = req.api_key.unwrap_or_default();

    app.use_cases.setup_config.execute(&db_path, &api_key).await?;
    Ok(Json(
        json!({ "success": true, "message": "Configuración completada" }),
    ))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            ApiError::BadRequest(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(json!({ "error": msg }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<CreateGameError> for ApiError {
    fn from(e: CreateGameError) -> Self {
        match e {
            CreateGameError::Validation(v) => v.into(),
            CreateGameError::Repo(r) => r.into(),
        }
    }
}

impl From<JoinGameError> for ApiError {
    fn from(e: JoinGameError) -> Self {
        match e {
            JoinGameError::Validation(v) => v.into(),
            JoinGameError::GameNotFound => ApiError::NotFound(e.to_string()),
            JoinGameError::DuplicateName => ApiError::BadRequest(e.to_string()),
            JoinGameError::Repo(r) => r.into(),
        }
    }
}

impl From<SendMessageError> for ApiError {
    fn from(e: SendMessageError) -> Self {
        match e {
            SendMessageError::Validation(v) => v.into(),
            SendMessageError::Repo(r) => r.into(),
        }
    }
}

impl From<SetupConfigError> for ApiError {
    fn from(e: SetupConfigError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
