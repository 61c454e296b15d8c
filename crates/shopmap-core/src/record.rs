//! Canonical shop record shared by every downstream consumer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validated WGS84 coordinate.
///
/// Only constructible through [`Position::try_new`] (serde included), so a
/// `Position` in hand is always finite and within range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedPosition")]
pub struct Position {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("coordinate is not a finite number")]
    NonFinite,
    #[error("latitude outside [-90, 90]")]
    LatitudeOutOfRange,
    #[error("longitude outside [-180, 180]")]
    LongitudeOutOfRange,
}

#[derive(Deserialize)]
struct UncheckedPosition {
    lat: f64,
    lng: f64,
}

impl TryFrom<UncheckedPosition> for Position {
    type Error = PositionError;

    fn try_from(value: UncheckedPosition) -> Result<Self, Self::Error> {
        Position::try_new(value.lat, value.lng)
    }
}

impl Position {
    /// Validates and builds a position.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] when either value is NaN/infinite or out of range.
    pub fn try_new(lat: f64, lng: f64) -> Result<Self, PositionError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(PositionError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(PositionError::LatitudeOutOfRange);
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(PositionError::LongitudeOutOfRange);
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// One shop, normalized from whichever input format it arrived in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopRecord {
    pub id: String,
    pub name: String,
    pub province: String,
    pub sales_representative: String,
    pub position: Position,
    pub checked_in: bool,
    pub checkin_timestamp: Option<String>,
    pub distance_meters: Option<f64>,
    pub remark: Option<String>,
    /// Display address derived from `province`.
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_accepts_boundaries() {
        assert!(Position::try_new(90.0, 180.0).is_ok());
        assert!(Position::try_new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn position_rejects_out_of_range_latitude() {
        assert_eq!(
            Position::try_new(90.000_1, 0.0),
            Err(PositionError::LatitudeOutOfRange)
        );
    }

    #[test]
    fn position_rejects_out_of_range_longitude() {
        assert_eq!(
            Position::try_new(0.0, -180.5),
            Err(PositionError::LongitudeOutOfRange)
        );
    }

    #[test]
    fn position_rejects_nan_and_infinity() {
        assert_eq!(
            Position::try_new(f64::NAN, 0.0),
            Err(PositionError::NonFinite)
        );
        assert_eq!(
            Position::try_new(0.0, f64::INFINITY),
            Err(PositionError::NonFinite)
        );
    }

    #[test]
    fn position_deserialize_validates() {
        let ok: Position = serde_json::from_str(r#"{"lat":8.5,"lng":99.0}"#).expect("valid");
        assert!((ok.lat() - 8.5).abs() < f64::EPSILON);

        let bad = serde_json::from_str::<Position>(r#"{"lat":120.0,"lng":99.0}"#);
        assert!(bad.is_err(), "out-of-range latitude must not deserialize");
    }

    #[test]
    fn shop_record_serializes_camel_case() {
        let record = ShopRecord {
            id: "S001".to_string(),
            name: "Krabi Mart".to_string(),
            province: "Krabi".to_string(),
            sales_representative: "Somchai".to_string(),
            position: Position::try_new(8.09, 98.91).expect("valid"),
            checked_in: true,
            checkin_timestamp: Some("2025-01-10 09:30".to_string()),
            distance_meters: None,
            remark: None,
            address: "Krabi, ไทย".to_string(),
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["salesRepresentative"], "Somchai");
        assert_eq!(json["checkedIn"], true);
        assert!(json["distanceMeters"].is_null());
        assert_eq!(json["position"]["lng"], 98.91);
    }
}
