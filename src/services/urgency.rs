use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::vehicle::Vehicle;

/// Width of the due-soon window, counted from the evaluation instant.
pub const DUE_SOON_HORIZON_DAYS: i64 = 30;

/// How pressing a single due date is relative to an evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    Overdue,
    DueSoon,
    #[serde(rename = "none")]
    NotDue,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Overdue => "overdue",
            Urgency::DueSoon => "due-soon",
            Urgency::NotDue => "none",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a due date against `now`.
///
/// Dates are date-only, so a date is taken as the instant of its UTC midnight:
/// - absent date -> `None`
/// - midnight before `now` -> `Overdue`
/// - midnight within `[now, now + 30 days]` -> `DueSoon`
/// - anything later -> `NotDue`
pub fn classify(date: Option<NaiveDate>, now: DateTime<Utc>) -> Option<Urgency> {
    let due = Utc.from_utc_datetime(&date?.and_time(NaiveTime::MIN));

    if due < now {
        Some(Urgency::Overdue)
    } else if due <= now + Duration::days(DUE_SOON_HORIZON_DAYS) {
        Some(Urgency::DueSoon)
    } else {
        Some(Urgency::NotDue)
    }
}

/// The recurring due dates carried by a vehicle.
/// `last_service_date` is informational and deliberately not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DueDateField {
    NextServiceDue,
    MotDueDate,
    InsuranceRenewal,
    TaxRenewal,
}

impl DueDateField {
    pub const ALL: [DueDateField; 4] = [
        DueDateField::NextServiceDue,
        DueDateField::MotDueDate,
        DueDateField::InsuranceRenewal,
        DueDateField::TaxRenewal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DueDateField::NextServiceDue => "Next Service",
            DueDateField::MotDueDate => "MOT Due",
            DueDateField::InsuranceRenewal => "Insurance",
            DueDateField::TaxRenewal => "Tax Renewal",
        }
    }

    pub fn date_of(&self, vehicle: &Vehicle) -> Option<NaiveDate> {
        match self {
            DueDateField::NextServiceDue => vehicle.next_service_due,
            DueDateField::MotDueDate => vehicle.mot_due_date,
            DueDateField::InsuranceRenewal => vehicle.insurance_renewal,
            DueDateField::TaxRenewal => vehicle.tax_renewal,
        }
    }
}

/// The urgent labels present among a vehicle's due dates.
///
/// Only `Overdue` and `DueSoon` are ever stored; a vehicle may carry both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgencyTags {
    pub overdue: bool,
    pub due_soon: bool,
}

impl UrgencyTags {
    pub fn insert(&mut self, urgency: Urgency) {
        match urgency {
            Urgency::Overdue => self.overdue = true,
            Urgency::DueSoon => self.due_soon = true,
            Urgency::NotDue => {}
        }
    }

    pub fn contains(&self, urgency: Urgency) -> bool {
        match urgency {
            Urgency::Overdue => self.overdue,
            Urgency::DueSoon => self.due_soon,
            Urgency::NotDue => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.overdue && !self.due_soon
    }

    pub fn iter(&self) -> impl Iterator<Item = Urgency> + '_ {
        [Urgency::Overdue, Urgency::DueSoon]
            .into_iter()
            .filter(move |u| self.contains(*u))
    }
}

/// Collects the urgent labels over the four due-date fields of `vehicle`.
pub fn vehicle_urgency_tags(vehicle: &Vehicle, now: DateTime<Utc>) -> UrgencyTags {
    let mut tags = UrgencyTags::default();
    for field in DueDateField::ALL {
        if let Some(urgency) = classify(field.date_of(vehicle), now) {
            tags.insert(urgency);
        }
    }
    tags
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unknown filter mode: {0}")]
pub struct UnknownFilterMode(pub String);

/// Which slice of the fleet to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    #[default]
    All,
    DueSoon,
    Overdue,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::DueSoon, FilterMode::Overdue];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::DueSoon => "due-soon",
            FilterMode::Overdue => "overdue",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::DueSoon => "Due Soon",
            FilterMode::Overdue => "Overdue",
        }
    }

    /// Membership predicate shared by filtering and counting.
    pub fn matches(&self, tags: &UrgencyTags) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::DueSoon => tags.contains(Urgency::DueSoon),
            FilterMode::Overdue => tags.contains(Urgency::Overdue),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = UnknownFilterMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FilterMode::All),
            "due-soon" => Ok(FilterMode::DueSoon),
            "overdue" => Ok(FilterMode::Overdue),
            other => Err(UnknownFilterMode(other.to_string())),
        }
    }
}

/// Returns the vehicles belonging to `mode`, in their original order.
pub fn filter_vehicles(vehicles: &[Vehicle], mode: FilterMode, now: DateTime<Utc>) -> Vec<&Vehicle> {
    vehicles
        .iter()
        .filter(|vehicle| mode.matches(&vehicle_urgency_tags(vehicle, now)))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCounts {
    pub all: usize,
    pub due_soon: usize,
    pub overdue: usize,
}

impl FilterCounts {
    pub fn tally(vehicles: &[Vehicle], now: DateTime<Utc>) -> Self {
        let mut counts = FilterCounts::default();
        for vehicle in vehicles {
            counts.record(&vehicle_urgency_tags(vehicle, now));
        }
        counts
    }

    fn record(&mut self, tags: &UrgencyTags) {
        for mode in FilterMode::ALL {
            if mode.matches(tags) {
                *self.slot(mode) += 1;
            }
        }
    }

    fn slot(&mut self, mode: FilterMode) -> &mut usize {
        match mode {
            FilterMode::All => &mut self.all,
            FilterMode::DueSoon => &mut self.due_soon,
            FilterMode::Overdue => &mut self.overdue,
        }
    }

    pub fn get(&self, mode: FilterMode) -> usize {
        match mode {
            FilterMode::All => self.all,
            FilterMode::DueSoon => self.due_soon,
            FilterMode::Overdue => self.overdue,
        }
    }
}

/// A present due date together with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDateBadge {
    pub field: DueDateField,
    pub date: NaiveDate,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleView<'a> {
    pub vehicle: &'a Vehicle,
    pub tags: UrgencyTags,
    pub badges: Vec<DueDateBadge>,
}

impl VehicleView<'_> {
    pub fn has_overdue(&self) -> bool {
        self.tags.contains(Urgency::Overdue)
    }
}

/// One consistent evaluation of a fleet at a single captured instant.
///
/// Counts, bucket membership and badges are all derived from the same
/// per-vehicle classification, so they cannot disagree with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetView<'a> {
    pub now: DateTime<Utc>,
    pub mode: FilterMode,
    pub counts: FilterCounts,
    pub vehicles: Vec<VehicleView<'a>>,
}

impl<'a> FleetView<'a> {
    pub fn evaluate(vehicles: &'a [Vehicle], mode: FilterMode, now: DateTime<Utc>) -> Self {
        let mut counts = FilterCounts::default();
        let mut visible = Vec::new();

        for vehicle in vehicles {
            let badges: Vec<DueDateBadge> = DueDateField::ALL
                .into_iter()
                .filter_map(|field| {
                    let date = field.date_of(vehicle)?;
                    let urgency = classify(Some(date), now)?;
                    Some(DueDateBadge {
                        field,
                        date,
                        urgency,
                    })
                })
                .collect();

            let mut tags = UrgencyTags::default();
            for badge in &badges {
                tags.insert(badge.urgency);
            }

            counts.record(&tags);
            if mode.matches(&tags) {
                visible.push(VehicleView {
                    vehicle,
                    tags,
                    badges,
                });
            }
        }

        FleetView {
            now,
            mode,
            counts,
            vehicles: visible,
        }
    }
}
