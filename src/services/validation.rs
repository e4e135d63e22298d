use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::models::vehicle::VehicleData;

/// Earliest plausible model year for a road vehicle.
pub const MIN_YEAR: i32 = 1886;
pub const MAX_YEAR: i32 = 9999;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be a calendar year between {min} and {max}", min = MIN_YEAR, max = MAX_YEAR)]
    InvalidYear { field: &'static str },

    #[error("{field} is not a valid date: {value}")]
    InvalidDate { field: &'static str, value: String },
}

/// `year` arrives either as a number or as the raw text of a number input.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum YearInput {
    Number(i64),
    Text(String),
}

/// Create/update request body for a vehicle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePayload {
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<YearInput>,
    #[serde(default)]
    pub last_service_date: Option<String>,
    #[serde(default)]
    pub next_service_due: Option<String>,
    #[serde(default)]
    pub mot_due_date: Option<String>,
    #[serde(default)]
    pub insurance_renewal: Option<String>,
    #[serde(default)]
    pub tax_renewal: Option<String>,
}

impl VehiclePayload {
    /// Validates the payload into the field set persistence accepts.
    pub fn validate(self) -> Result<VehicleData, ValidationError> {
        Ok(VehicleData {
            registration_number: required_text("registrationNumber", self.registration_number)?,
            make: required_text("make", self.make)?,
            model: required_text("model", self.model)?,
            year: parse_year(self.year)?,
            last_service_date: parse_date("lastServiceDate", self.last_service_date)?,
            next_service_due: parse_date("nextServiceDue", self.next_service_due)?,
            mot_due_date: parse_date("motDueDate", self.mot_due_date)?,
            insurance_renewal: parse_date("insuranceRenewal", self.insurance_renewal)?,
            tax_renewal: parse_date("taxRenewal", self.tax_renewal)?,
        })
    }
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn parse_year(value: Option<YearInput>) -> Result<i32, ValidationError> {
    let year = match value {
        None => return Err(ValidationError::MissingField("year")),
        Some(YearInput::Number(n)) => n,
        Some(YearInput::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(ValidationError::MissingField("year"));
            }
            text.parse::<i64>()
                .map_err(|_| ValidationError::InvalidYear { field: "year" })?
        }
    };

    if (i64::from(MIN_YEAR)..=i64::from(MAX_YEAR)).contains(&year) {
        Ok(year as i32)
    } else {
        Err(ValidationError::InvalidYear { field: "year" })
    }
}

/// Parses an optional date input.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, whose UTC calendar date is
/// kept. Missing and blank values mean "no date".
pub fn parse_date(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, ValidationError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: serde_json::Value) -> VehiclePayload {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_valid_payload() {
        let data = payload(serde_json::json!({
            "registrationNumber": "  AB12 CDE ",
            "make": "Toyota",
            "model": "Corolla",
            "year": 2018,
            "lastServiceDate": "2024-11-01",
            "nextServiceDue": "2025-05-01T00:00:00.000Z",
            "motDueDate": null,
            "insuranceRenewal": ""
        }))
        .validate()
        .unwrap();

        assert_eq!(data.registration_number, "AB12 CDE");
        assert_eq!(data.year, 2018);
        assert_eq!(data.last_service_date, NaiveDate::from_ymd_opt(2024, 11, 1));
        assert_eq!(data.next_service_due, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(data.mot_due_date, None);
        assert_eq!(data.insurance_renewal, None);
        assert_eq!(data.tax_renewal, None);
    }

    #[test]
    fn test_year_as_text() {
        let data = payload(serde_json::json!({
            "registrationNumber": "XY34 ZZZ",
            "make": "Honda",
            "model": "Civic",
            "year": "2020"
        }))
        .validate()
        .unwrap();

        assert_eq!(data.year, 2020);
    }

    #[test]
    fn test_missing_text_fields() {
        let result = payload(serde_json::json!({
            "registrationNumber": "   ",
            "make": "Honda",
            "model": "Civic",
            "year": 2020
        }))
        .validate();

        assert_eq!(
            result,
            Err(ValidationError::MissingField("registrationNumber"))
        );
    }

    #[test]
    fn test_year_out_of_range() {
        let result = payload(serde_json::json!({
            "registrationNumber": "XY34 ZZZ",
            "make": "Honda",
            "model": "Civic",
            "year": 0
        }))
        .validate();

        assert_eq!(result, Err(ValidationError::InvalidYear { field: "year" }));
    }

    #[test]
    fn test_rfc3339_offset_uses_utc_date() {
        let date = parse_date("motDueDate", Some("2025-03-01T01:30:00+02:00".to_string()));
        assert_eq!(date, Ok(NaiveDate::from_ymd_opt(2025, 2, 28)));
    }

    #[test]
    fn test_invalid_date() {
        let result = parse_date("taxRenewal", Some("31/12/2025".to_string()));
        assert_eq!(
            result,
            Err(ValidationError::InvalidDate {
                field: "taxRenewal",
                value: "31/12/2025".to_string(),
            })
        );

        let impossible = parse_date("taxRenewal", Some("2025-02-30".to_string()));
        assert!(impossible.is_err());
    }
}
