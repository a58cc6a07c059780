//! HTTP route handlers for the API
//!
//! Request bodies are read raw and decoded here instead of through the
//! `Json` extractor: clients send JSON without a content type and `GET
//! /notes` carries a body. Each handler checks its emptiness rule before
//! reporting a decode failure.

use super::auth::authorize;
use super::AppState;
use crate::error::StoreError;
use crate::store::Note;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

const INVALID_REQUEST: &str = "Invalid request format";

// ============================================================================
// Errors
// ============================================================================

/// Errors surfaced to API clients
#[derive(Debug)]
pub enum ApiError {
    /// Malformed body or missing required fields (400)
    BadRequest(String),
    /// Bad credentials or unknown session (401)
    Unauthorized,
    /// Store cannot accept the record (500)
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EmptyCredentials => ApiError::BadRequest(e.to_string()),
            StoreError::Unauthorized => ApiError::Unauthorized,
            StoreError::IdsExhausted(_) => {
                tracing::error!("{}", e);
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Request bodies accepted by the note API
pub trait RequestBody: DeserializeOwned + Default {
    /// JSON member names, matched case-insensitively against body keys
    const FIELDS: &'static [&'static str];
}

/// Map a body key onto a field name, preferring an exact match
fn field_name<T: RequestBody>(key: &str) -> Option<&'static str> {
    T::FIELDS
        .iter()
        .find(|f| **f == key)
        .or_else(|| T::FIELDS.iter().find(|f| f.eq_ignore_ascii_case(key)))
        .copied()
}

/// Decode the first JSON value in `body` into `T`.
///
/// Keys match field names case-insensitively and a later key overrides an
/// earlier one. `null` members and unknown keys are ignored. A member of the
/// wrong type is dropped and its error returned alongside the partially
/// filled request, so handlers can apply their emptiness rule first. Syntax
/// errors and empty bodies leave every field at its default.
fn decode<T: RequestBody>(body: &[u8]) -> (T, Option<String>) {
    let mut stream = serde_json::Deserializer::from_slice(body).into_iter::<Value>();
    let fields = match stream.next() {
        Some(Ok(Value::Object(fields))) => fields,
        Some(Ok(Value::Null)) => return (T::default(), None),
        Some(Ok(other)) => {
            let error = serde_json::from_value::<T>(other).err().map(|e| e.to_string());
            return (T::default(), error);
        }
        Some(Err(e)) => return (T::default(), Some(e.to_string())),
        None => return (T::default(), Some("EOF".to_string())),
    };

    let mut members = Map::new();
    let mut error = None;
    for (key, value) in fields {
        if value.is_null() {
            continue;
        }
        let Some(name) = field_name::<T>(&key) else {
            continue;
        };

        let single = Map::from_iter([(name.to_string(), value.clone())]);
        match serde_json::from_value::<T>(Value::Object(single)) {
            Ok(_) => {
                members.insert(name.to_string(), value);
            }
            Err(e) => {
                error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    let req = serde_json::from_value(Value::Object(members)).unwrap_or_default();
    (req, error)
}

fn reject_parse_error(error: Option<String>) -> Result<(), ApiError> {
    match error {
        Some(e) => Err(ApiError::BadRequest(e)),
        None => Ok(()),
    }
}

/// Body for endpoints that answer with a bare status code
fn status_ok() -> Json<u16> {
    Json(StatusCode::OK.as_u16())
}

// ============================================================================
// Health Check
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RequestBody for SignupRequest {
    const FIELDS: &'static [&'static str] = &["name", "email", "password"];
}

pub async fn signup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<u16>, ApiError> {
    let (req, error): (SignupRequest, _) = decode(&body);
    if req.name.is_empty() && req.email.is_empty() && req.password.is_empty() {
        return Err(ApiError::BadRequest(INVALID_REQUEST.to_string()));
    }
    reject_parse_error(error)?;

    let id = state
        .store
        .create_user(&req.name, &req.email, &req.password)?;
    tracing::info!("Signed up user {}", id);

    Ok(status_ok())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl RequestBody for LoginRequest {
    const FIELDS: &'static [&'static str] = &["email", "password"];
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub sid: String,
}

pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    let (req, error): (LoginRequest, _) = decode(&body);
    if req.email.is_empty() && req.password.is_empty() {
        return Err(ApiError::BadRequest(INVALID_REQUEST.to_string()));
    }
    reject_parse_error(error)?;

    let Some(user) = state
        .store
        .find_user_by_credentials(&req.email, &req.password)
    else {
        tracing::warn!("Login failed: no matching user");
        return Err(ApiError::Unauthorized);
    };

    let sid = state.store.create_session(user.id);
    tracing::info!("User {} logged in", user.id);

    Ok(Json(LoginResponse { sid }))
}

// ============================================================================
// Notes
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListNotesRequest {
    pub sid: String,
}

impl RequestBody for ListNotesRequest {
    const FIELDS: &'static [&'static str] = &["sid"];
}

#[derive(Debug, Serialize)]
pub struct ListNotesResponse {
    pub notes: Vec<Note>,
}

pub async fn list_notes(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ListNotesResponse>, ApiError> {
    let (req, error): (ListNotesRequest, _) = decode(&body);
    if req.sid.is_empty() {
        return Err(ApiError::BadRequest(INVALID_REQUEST.to_string()));
    }
    reject_parse_error(error)?;

    let user_id = authorize(&state, &req.sid)?;
    let notes = state.store.list_notes(user_id);

    Ok(Json(ListNotesResponse { notes }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateNoteRequest {
    pub sid: String,
    pub note: String,
}

impl RequestBody for CreateNoteRequest {
    const FIELDS: &'static [&'static str] = &["sid", "note"];
}

#[derive(Debug, Serialize)]
pub struct CreateNoteResponse {
    pub id: u32,
}

pub async fn create_note(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateNoteResponse>, ApiError> {
    let (req, error): (CreateNoteRequest, _) = decode(&body);
    if req.sid.is_empty() {
        return Err(ApiError::BadRequest(INVALID_REQUEST.to_string()));
    }
    reject_parse_error(error)?;

    let user_id = authorize(&state, &req.sid)?;
    let id = state.store.create_note(user_id, &req.note)?;

    Ok(Json(CreateNoteResponse { id }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteNoteRequest {
    pub sid: String,
    pub id: u32,
}

impl RequestBody for DeleteNoteRequest {
    const FIELDS: &'static [&'static str] = &["sid", "id"];
}

pub async fn delete_note(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<u16>, ApiError> {
    let (req, error): (DeleteNoteRequest, _) = decode(&body);
    // Only a request missing both fields is malformed; an empty sid with an
    // id falls through to the session check.
    if req.sid.is_empty() && req.id == 0 {
        return Err(ApiError::BadRequest(INVALID_REQUEST.to_string()));
    }
    reject_parse_error(error)?;

    state.store.delete_note(&req.sid, req.id)?;

    Ok(status_ok())
}
