use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::api::middleware::{
    auth::AuthenticatedUser,
    session::{AppState, SESSION_KEY_CSRF_TOKEN, SESSION_KEY_PKCE_VERIFIER, SESSION_KEY_USER},
};
use crate::error::{AppError, Result};
use crate::services::oauth::auth0::{self, CurrentUser};

/// Starts the Auth0 login flow
async fn login(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let (auth_url, csrf_token, pkce_verifier) = auth0::build_auth_url(&state.config.auth0())?;

    session
        .insert(SESSION_KEY_CSRF_TOKEN, csrf_token)
        .await
        .map_err(|e| AppError::Session(e.to_string()))?;

    session
        .insert(SESSION_KEY_PKCE_VERIFIER, pkce_verifier)
        .await
        .map_err(|e| AppError::Session(e.to_string()))?;

    tracing::info!("Redirecting to Auth0 login");

    Ok(Redirect::to(&auth_url))
}

#[derive(Deserialize)]
struct OAuthCallback {
    code: String,
    state: String,
}

/// Handles the Auth0 callback and stores the user in the session
async fn callback(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallback>,
    session: Session,
) -> Result<Redirect> {
    let stored_csrf: Option<String> = session
        .remove(SESSION_KEY_CSRF_TOKEN)
        .await
        .map_err(|e| AppError::Session(e.to_string()))?;

    if stored_csrf.as_ref() != Some(&params.state) {
        return Err(AppError::CsrfMismatch);
    }

    let pkce_verifier: Option<String> = session
        .remove(SESSION_KEY_PKCE_VERIFIER)
        .await
        .map_err(|e| AppError::Session(e.to_string()))?;

    let settings = state.config.auth0();
    let access_token =
        auth0::exchange_code(&settings, &params.code, pkce_verifier.as_deref()).await?;
    let user = auth0::fetch_user_info(&settings.issuer_base_url, &access_token).await?;

    // New session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Session(e.to_string()))?;

    session
        .insert(SESSION_KEY_USER, &user)
        .await
        .map_err(|e| AppError::Session(e.to_string()))?;

    tracing::info!(user = %user.sub, "User signed in");

    Ok(Redirect::to("/"))
}

/// Ends the local session and the Auth0 session
async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Session(e.to_string()))?;

    let return_to = format!("{}/", state.config.base_url.trim_end_matches('/'));
    let logout_url = auth0::build_logout_url(&state.config.auth0(), &return_to)?;

    Ok(Redirect::to(&logout_url))
}

/// Returns the signed-in user
async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Json<CurrentUser> {
    Json(user)
}

/// Creates the auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", get(login))
        .route("/api/auth/callback", get(callback))
        .route("/api/auth/logout", get(logout))
        .route("/api/auth/me", get(me))
}
