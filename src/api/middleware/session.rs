use axum::extract::FromRef;
use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

/// Session keys used in the application
pub const SESSION_KEY_USER: &str = "user";
pub const SESSION_KEY_CSRF_TOKEN: &str = "csrf_token";
pub const SESSION_KEY_PKCE_VERIFIER: &str = "pkce_verifier";

/// Creates a session layer backed by PostgreSQL
pub async fn create_session_layer(
    pool: PgPool,
    secure: bool,
) -> Result<SessionManagerLayer<PostgresStore>, sqlx::Error> {
    let session_store = PostgresStore::new(pool);
    session_store.migrate().await?;

    Ok(session_layer(session_store, secure))
}

/// Applies the cookie policy shared by every session store
pub fn session_layer<S: SessionStore>(store: S, secure: bool) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(24)))
}

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: crate::config::Config,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> PgPool {
        state.pool.clone()
    }
}
