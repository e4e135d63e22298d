use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tower_sessions::Session;

use crate::api::middleware::{auth::current_user, session::AppState};
use crate::error::Result;
use crate::models::vehicle::Vehicle;
use crate::services::urgency::{FilterMode, FleetView, VehicleView};

#[derive(Template)]
#[template(path = "welcome.html")]
struct WelcomeTemplate;

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    user_name: String,
    filters: Vec<FilterLink>,
    cards: Vec<VehicleCard>,
    total: usize,
}

struct FilterLink {
    mode: &'static str,
    label: &'static str,
    count: usize,
    active: bool,
}

struct VehicleCard {
    registration_number: String,
    make: String,
    model: String,
    year: i32,
    has_overdue: bool,
    last_service: Option<String>,
    rows: Vec<DueDateRow>,
}

struct DueDateRow {
    label: &'static str,
    date: String,
    urgency: &'static str,
}

fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

impl From<&VehicleView<'_>> for VehicleCard {
    fn from(view: &VehicleView<'_>) -> Self {
        let vehicle = view.vehicle;
        VehicleCard {
            registration_number: vehicle.registration_number.clone(),
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            has_overdue: view.has_overdue(),
            last_service: vehicle.last_service_date.map(display_date),
            rows: view
                .badges
                .iter()
                .map(|badge| DueDateRow {
                    label: badge.field.label(),
                    date: display_date(badge.date),
                    urgency: badge.urgency.as_str(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    filter: Option<String>,
}

/// Reads the `?filter=` value; anything unrecognised shows the whole fleet
fn filter_mode(raw: Option<&str>) -> FilterMode {
    match raw.map(str::parse::<FilterMode>) {
        None => FilterMode::All,
        Some(Ok(mode)) => mode,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Ignoring dashboard filter");
            FilterMode::All
        }
    }
}

fn build_dashboard(
    user_name: String,
    vehicles: &[Vehicle],
    mode: FilterMode,
    now: chrono::DateTime<Utc>,
) -> DashboardTemplate {
    let fleet = FleetView::evaluate(vehicles, mode, now);

    let filters = FilterMode::ALL
        .into_iter()
        .map(|m| FilterLink {
            mode: m.as_str(),
            label: m.label(),
            count: fleet.counts.get(m),
            active: m == mode,
        })
        .collect();

    DashboardTemplate {
        user_name,
        filters,
        cards: fleet.vehicles.iter().map(VehicleCard::from).collect(),
        total: fleet.counts.all,
    }
}

/// Home page: welcome card when signed out, the fleet overview otherwise
async fn home_page(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
    session: Session,
) -> Result<Response> {
    let Some(user) = current_user(&session).await? else {
        return Ok(WelcomeTemplate.into_response());
    };

    let vehicles = Vehicle::list_all(&state.pool).await?;
    let page = build_dashboard(
        user.display_name().to_string(),
        &vehicles,
        filter_mode(query.filter.as_deref()),
        Utc::now(),
    );

    Ok(page.into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home_page))
}
