//! Session-token authorization for note routes

use super::routes::ApiError;
use super::AppState;

/// Resolve a body-supplied session id to its owning user.
///
/// Tokens travel in the JSON body rather than an Authorization header, so
/// each note handler calls this after decoding its request.
pub fn authorize(state: &AppState, session_id: &str) -> Result<u32, ApiError> {
    match state.store.find_session(session_id) {
        Some(user_id) => Ok(user_id),
        None => {
            tracing::warn!("Rejected unknown session id");
            Err(ApiError::Unauthorized)
        }
    }
}
