use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

use crate::error::AppError;

/// `axum::Json` whose rejections use the application's JSON error body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Path` whose rejections use the application's JSON error body
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    use crate::services::validation::VehiclePayload;

    fn app() -> Router {
        Router::new()
            .route(
                "/vehicles",
                post(|AppJson(payload): AppJson<VehiclePayload>| async move {
                    payload.make.unwrap_or_default()
                }),
            )
            .route(
                "/vehicles/:id",
                get(|AppPath(id): AppPath<i32>| async move { id.to_string() }),
            )
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_wrongly_typed_date_gets_json_error() {
        let response = app()
            .oneshot(
                Request::post("/vehicles")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"make":"Honda","motDueDate":5}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid request");
        assert!(body["message"].as_str().unwrap().contains("motDueDate"));
    }

    #[tokio::test]
    async fn test_missing_content_type_gets_json_error() {
        let response = app()
            .oneshot(Request::post("/vehicles").body(Body::from("{}")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json_body(response).await["error"], "Invalid request");
    }

    #[tokio::test]
    async fn test_non_numeric_id_gets_json_error() {
        let response = app()
            .oneshot(Request::get("/vehicles/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid request");
    }

    #[tokio::test]
    async fn test_valid_body_passes_through() {
        let response = app()
            .oneshot(
                Request::post("/vehicles")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"make":"Honda","motDueDate":"2025-01-10"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
