use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

use super::session::SESSION_KEY_USER;
use crate::error::AppError;
use crate::services::oauth::auth0::CurrentUser;

/// Reads the signed-in user from the session, if any
pub async fn current_user(session: &Session) -> Result<Option<CurrentUser>, AppError> {
    session
        .get(SESSION_KEY_USER)
        .await
        .map_err(|e| AppError::Session(e.to_string()))
}

/// Middleware that requires the user to be authenticated
pub async fn require_auth(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if current_user(&session).await?.is_none() {
        tracing::debug!(path = %request.uri().path(), "Rejecting unauthenticated request");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Extractor for handlers that need the signed-in user
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Session(msg.to_string()))?;

        current_user(&session)
            .await?
            .map(AuthenticatedUser)
            .ok_or(AppError::Unauthorized)
    }
}
