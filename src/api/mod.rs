// API module - HTTP endpoints

pub mod auth;
pub mod dashboard;
pub mod extract;
pub mod health;
pub mod middleware;
pub mod vehicles;

use axum::{routing::get, Router};

use middleware::session::AppState;

/// Assembles every route; session and trace layers are applied by the caller
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(dashboard::router())
        .merge(auth::router())
        .merge(vehicles::router())
        .with_state(state)
}
