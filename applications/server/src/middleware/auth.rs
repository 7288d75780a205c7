/// Admin session extractor
use crate::{error::ServerError, state::AppState};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

/// Extractor proving the request carries a valid admin session
///
/// Used on the write surface (upload, delete). The read surface never
/// requires it, so it is an extractor on the handlers that need it rather
/// than route-level middleware.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ServerError::Unauthorized("Not authenticated".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServerError::Unauthorized("Not authenticated".to_string()))?;

        if !state.sessions.verify_admin_token(token) {
            tracing::warn!("Admin token verification failed");
            return Err(ServerError::Unauthorized("Invalid session".to_string()));
        }

        Ok(AdminSession)
    }
}
