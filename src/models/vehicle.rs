use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i32,
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub last_service_date: Option<NaiveDate>,
    pub next_service_due: Option<NaiveDate>,
    pub mot_due_date: Option<NaiveDate>,
    pub insurance_renewal: Option<NaiveDate>,
    pub tax_renewal: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated field set for inserts and full-field updates.
/// Built by `services::validation`, never straight from a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleData {
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub last_service_date: Option<NaiveDate>,
    pub next_service_due: Option<NaiveDate>,
    pub mot_due_date: Option<NaiveDate>,
    pub insurance_renewal: Option<NaiveDate>,
    pub tax_renewal: Option<NaiveDate>,
}

impl Vehicle {
    /// Inserts a new vehicle
    pub async fn create(pool: &PgPool, data: VehicleData) -> Result<Self, sqlx::Error> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                registration_number, make, model, year,
                last_service_date, next_service_due, mot_due_date,
                insurance_renewal, tax_renewal
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(data.registration_number)
        .bind(data.make)
        .bind(data.model)
        .bind(data.year)
        .bind(data.last_service_date)
        .bind(data.next_service_due)
        .bind(data.mot_due_date)
        .bind(data.insurance_renewal)
        .bind(data.tax_renewal)
        .fetch_one(pool)
        .await?;

        Ok(vehicle)
    }

    /// Find vehicle by ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(vehicle)
    }

    /// Finds a vehicle by its registration number (exact match)
    pub async fn find_by_registration(
        pool: &PgPool,
        registration_number: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles WHERE registration_number = $1
            "#,
        )
        .bind(registration_number)
        .fetch_optional(pool)
        .await?;

        Ok(vehicle)
    }

    /// Lists every vehicle, ascending by registration number
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            ORDER BY registration_number ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(vehicles)
    }

    /// Replaces every editable field of a vehicle.
    ///
    /// Returns `None` when no vehicle has the given id.
    pub async fn update(
        pool: &PgPool,
        id: i32,
        data: VehicleData,
    ) -> Result<Option<Self>, sqlx::Error> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET
                registration_number = $2,
                make = $3,
                model = $4,
                year = $5,
                last_service_date = $6,
                next_service_due = $7,
                mot_due_date = $8,
                insurance_renewal = $9,
                tax_renewal = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.registration_number)
        .bind(data.make)
        .bind(data.model)
        .bind(data.year)
        .bind(data.last_service_date)
        .bind(data.next_service_due)
        .bind(data.mot_due_date)
        .bind(data.insurance_renewal)
        .bind(data.tax_renewal)
        .fetch_optional(pool)
        .await?;

        Ok(vehicle)
    }

    /// Permanently deletes a vehicle. Returns false if nothing matched.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM vehicles WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
