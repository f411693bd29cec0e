//! Geographic coordinates.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A validated latitude/longitude pair (WGS84 degrees).
///
/// Invariant: both components are finite, latitude is within [-90, 90] and
/// longitude within [-180, 180].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

/// Unchecked wire form; decoding goes through [`Coordinates::new`].
#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = DomainError;

    fn try_from(raw: RawCoordinates) -> DomainResult<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> DomainResult<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(DomainError::validation("coordinates must be finite"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::validation(format!(
                "latitude {latitude} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::validation(format!(
                "longitude {longitude} out of range [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build coordinates from two optional form fields.
    ///
    /// Both absent yields `None`; exactly one present is a validation error.
    pub fn pair(latitude: Option<f64>, longitude: Option<f64>) -> DomainResult<Option<Self>> {
        match (latitude, longitude) {
            (None, None) => Ok(None),
            (Some(lat), Some(lon)) => Self::new(lat, lon).map(Some),
            _ => Err(DomainError::validation(
                "latitude and longitude must be given together",
            )),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Synthesized address label used when reverse geocoding yields no name.
    pub fn fallback_label(&self) -> String {
        format!("Lat: {:.4}, Lng: {:.4}", self.latitude, self.longitude)
    }

    /// External map deep link for these coordinates.
    pub fn map_link(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fallback_label_uses_four_decimals() {
        let c = Coordinates::new(34.0522, -118.2437).unwrap();
        assert_eq!(c.fallback_label(), "Lat: 34.0522, Lng: -118.2437");

        let c = Coordinates::new(40.7, -74.0).unwrap();
        assert_eq!(c.fallback_label(), "Lat: 40.7000, Lng: -74.0000");
    }

    #[test]
    fn map_link_points_at_google_maps() {
        let c = Coordinates::new(40.7128, -74.006).unwrap();
        assert_eq!(c.map_link(), "https://www.google.com/maps?q=40.7128,-74.006");
    }

    #[test]
    fn rejects_out_of_range_and_non_finite() {
        assert!(Coordinates::new(90.1, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn pair_is_both_or_neither() {
        assert_eq!(Coordinates::pair(None, None).unwrap(), None);
        assert!(Coordinates::pair(Some(1.0), Some(2.0)).unwrap().is_some());
        match Coordinates::pair(Some(1.0), None) {
            Err(DomainError::Validation(_)) => {}
            other => panic!("Expected Validation error, got {other:?}"),
        }
        assert!(Coordinates::pair(None, Some(2.0)).is_err());
    }

    #[test]
    fn serializes_with_named_fields() {
        let c = Coordinates::new(1.5, -2.5).unwrap();
        let json = serde_json::to_value(c).unwrap();
        assert_eq!(json, serde_json::json!({ "latitude": 1.5, "longitude": -2.5 }));

        let back: Coordinates = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn deserialize_rejects_out_of_range() {
        let err = serde_json::from_str::<Coordinates>(r#"{"latitude":95.0,"longitude":-720.0}"#)
            .unwrap_err();
        assert!(err.to_string().contains("latitude 95 out of range"));

        let bad_lon = r#"{"latitude":10.0,"longitude":181.0}"#;
        assert!(serde_json::from_str::<Coordinates>(bad_lon).is_err());
        assert!(serde_json::from_str::<Coordinates>(r#"{"latitude":10.0}"#).is_err());
    }

    proptest! {
        #[test]
        fn any_in_range_pair_is_accepted(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let c = Coordinates::new(lat, lon).unwrap();
            prop_assert_eq!(c.latitude(), lat);
            prop_assert_eq!(c.longitude(), lon);
        }
    }
}
