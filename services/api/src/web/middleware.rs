//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;
use lingua_core::ports::PortError;

/// The authenticated caller, injected into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

/// Middleware that validates the auth session cookie and extracts the user id.
///
/// If valid, inserts a [`CurrentUser`] into request extensions for handlers to
/// use. If invalid or missing, returns 401 with a structured error payload.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract cookie header
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Port(PortError::AuthenticationRequired))?;

    // 2. Parse session ID from cookie
    let auth_session_id = cookie_header
        .split(';')
        .find_map(|c| {
            let c = c.trim();
            c.strip_prefix("session=")
        })
        .ok_or(ApiError::Port(PortError::AuthenticationRequired))?;

    // 3. Validate auth session in database, get user_id
    let user_id = state
        .store
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            warn!("Failed to validate auth session: {:?}", e);
            ApiError::Port(PortError::AuthenticationRequired)
        })?;

    // 4. Insert the caller into request extensions
    req.extensions_mut().insert(CurrentUser(user_id));

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
