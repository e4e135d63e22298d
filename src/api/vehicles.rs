use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::api::extract::{AppJson, AppPath};
use crate::api::middleware::{
    auth::{require_auth, AuthenticatedUser},
    session::AppState,
};
use crate::error::{AppError, Result};
use crate::models::vehicle::Vehicle;
use crate::services::validation::VehiclePayload;

/// List every vehicle, ascending by registration number
async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>> {
    let vehicles = Vehicle::list_all(&state.pool).await?;
    Ok(Json(vehicles))
}

async fn create_vehicle(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<VehiclePayload>,
) -> Result<(StatusCode, Json<Vehicle>)> {
    let data = payload.validate()?;

    let vehicle = Vehicle::create(&state.pool, data)
        .await
        .map_err(AppError::from_write)?;

    tracing::info!(
        vehicle_id = vehicle.id,
        registration = %vehicle.registration_number,
        user = %user.sub,
        "Vehicle created"
    );

    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// A lookup or update that matched no row is a 404
fn found(vehicle: Option<Vehicle>) -> Result<Vehicle> {
    vehicle.ok_or(AppError::NotFound)
}

/// A delete that removed no row is a 404
fn removed(deleted: bool) -> Result<()> {
    if deleted {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

async fn get_vehicle(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Vehicle>> {
    let vehicle = found(Vehicle::find_by_id(&state.pool, id).await?)?;

    Ok(Json(vehicle))
}

/// Full-field replace of an existing vehicle
async fn update_vehicle(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<VehiclePayload>,
) -> Result<Json<Vehicle>> {
    let data = payload.validate()?;

    let vehicle = found(
        Vehicle::update(&state.pool, id, data)
            .await
            .map_err(AppError::from_write)?,
    )?;

    tracing::info!(vehicle_id = id, user = %user.sub, "Vehicle updated");

    Ok(Json(vehicle))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Value>> {
    removed(Vehicle::delete(&state.pool, id).await?)?;

    tracing::info!(vehicle_id = id, user = %user.sub, "Vehicle deleted");

    Ok(Json(json!({ "ok": true })))
}

/// Creates the vehicle API router; every route requires a session
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cars", get(list_vehicles).post(create_vehicle))
        .route(
            "/api/cars/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route_layer(middleware::from_fn(require_auth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::urgency::tests::vehicle;

    #[test]
    fn test_missing_vehicle_is_not_found() {
        let err = found(None).unwrap_err();

        assert!(matches!(err, AppError::NotFound));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_present_vehicle_passes_through() {
        let v = vehicle(7, "AB12 CDE");
        assert_eq!(found(Some(v.clone())).unwrap(), v);
    }

    #[test]
    fn test_delete_without_match_is_not_found() {
        assert!(removed(true).is_ok());

        let err = removed(false).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
