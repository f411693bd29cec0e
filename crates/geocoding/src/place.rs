//! Geocoding results and the Nominatim wire format they are decoded from.

use serde::{Deserialize, Serialize};
use tracing::warn;

use billbook_core::Coordinates;

/// Structured address subfields, where the service provides them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceAddress {
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

/// A resolved place: display address, coordinates and address parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub display_name: Option<String>,
    pub coordinates: Coordinates,
    pub address: PlaceAddress,
}

/// One entry of a Nominatim `search` response, or a `reverse` response body.
///
/// Coordinates arrive as strings. A reverse lookup for an unknown point comes
/// back as `{"error": "..."}` with no other fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WirePlace {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
    #[serde(default)]
    pub address: Option<WireAddress>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireAddress {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<Option<WireAddress>> for PlaceAddress {
    fn from(wire: Option<WireAddress>) -> Self {
        let wire = wire.unwrap_or_default();
        Self {
            city: non_blank(wire.city).or_else(|| non_blank(wire.town)),
            state: non_blank(wire.state),
            postal_code: non_blank(wire.postcode),
        }
    }
}

impl WirePlace {
    /// Decode a search candidate. Entries without usable coordinates are
    /// dropped.
    pub(crate) fn into_candidate(self) -> Option<Place> {
        let lat = self.lat.as_deref().and_then(|s| s.trim().parse::<f64>().ok());
        let lon = self.lon.as_deref().and_then(|s| s.trim().parse::<f64>().ok());
        let coordinates = match (lat, lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).ok(),
            _ => None,
        };
        let Some(coordinates) = coordinates else {
            warn!(
                lat = ?self.lat,
                lon = ?self.lon,
                "dropping geocoding candidate without valid coordinates"
            );
            return None;
        };

        Some(Place {
            display_name: non_blank(self.display_name),
            coordinates,
            address: PlaceAddress::from(self.address),
        })
    }

    /// Decode a reverse lookup for `at`; the requested point is kept as is.
    pub(crate) fn into_reverse(self, at: Coordinates) -> Place {
        if let Some(error) = &self.error {
            warn!(%error, "reverse geocoding found no place");
        }
        Place {
            display_name: non_blank(self.display_name),
            coordinates: at,
            address: PlaceAddress::from(self.address),
        }
    }
}
