use chrono::NaiveDate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleetmate::config::Config;
use fleetmate::db;
use fleetmate::models::vehicle::{Vehicle, VehicleData};

fn date(y: i32, m: u32, d: u32) -> anyhow::Result<Option<NaiveDate>> {
    NaiveDate::from_ymd_opt(y, m, d)
        .map(Some)
        .ok_or_else(|| anyhow::anyhow!("invalid seed date {y}-{m}-{d}"))
}

fn demo_vehicles() -> anyhow::Result<Vec<VehicleData>> {
    Ok(vec![
        VehicleData {
            registration_number: "AB12 CDE".to_string(),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2018,
            last_service_date: date(2024, 11, 1)?,
            next_service_due: date(2025, 5, 1)?,
            mot_due_date: date(2025, 2, 15)?,
            insurance_renewal: date(2025, 3, 1)?,
            tax_renewal: date(2025, 4, 1)?,
        },
        VehicleData {
            registration_number: "XY34 ZZZ".to_string(),
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            year: 2020,
            last_service_date: date(2025, 6, 1)?,
            next_service_due: date(2025, 12, 1)?,
            mot_due_date: date(2026, 1, 20)?,
            insurance_renewal: date(2025, 11, 15)?,
            tax_renewal: date(2025, 12, 31)?,
        },
    ])
}

/// Inserts the demo fleet, leaving existing registrations untouched
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,fleetmate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    for data in demo_vehicles()? {
        if Vehicle::find_by_registration(&pool, &data.registration_number)
            .await?
            .is_some()
        {
            tracing::info!(registration = %data.registration_number, "Already present, skipping");
            continue;
        }

        let vehicle = Vehicle::create(&pool, data).await?;
        tracing::info!(vehicle_id = vehicle.id, registration = %vehicle.registration_number, "Seeded vehicle");
    }

    Ok(())
}
