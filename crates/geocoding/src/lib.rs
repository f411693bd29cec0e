//! Geocoding client.
//!
//! Forward (text → places) and reverse (coordinates → place) lookups against an
//! OpenStreetMap Nominatim compatible service. Stateless request/response; the
//! location picker decides what to do with failures.

pub mod config;
pub mod error;
pub mod nominatim;
pub mod place;

pub use config::GeocoderConfig;
pub use error::{GeocodingError, GeocodingResult};
pub use nominatim::NominatimGeocoder;
pub use place::{Place, PlaceAddress};

use async_trait::async_trait;
use billbook_core::Coordinates;

/// Address lookup service seam.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Forward lookup: free-text query to an ordered list of candidates.
    async fn search(&self, query: &str) -> GeocodingResult<Vec<Place>>;

    /// Reverse lookup: coordinates to the best matching place.
    ///
    /// The returned place carries the requested coordinates; its display name
    /// may be absent when the service knows nothing about the point.
    async fn reverse(&self, at: Coordinates) -> GeocodingResult<Place>;
}
