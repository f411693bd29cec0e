use serde::{Deserialize, Serialize};

use billbook_core::Coordinates;
use billbook_geocoding::Place;
use billbook_store::ClientDraft;

/// A resolved location waiting to be merged into a client draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedLocation {
    pub address: Option<String>,
    pub coordinates: Coordinates,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl StagedLocation {
    pub fn from_place(place: Place) -> Self {
        Self {
            address: place.display_name,
            coordinates: place.coordinates,
            city: place.address.city,
            state: place.address.state,
            postal_code: place.address.postal_code,
        }
    }

    /// Coordinates only, labelled `Lat: .., Lng: ..`.
    pub fn unnamed(at: Coordinates) -> Self {
        Self {
            address: Some(at.fallback_label()),
            coordinates: at,
            city: None,
            state: None,
            postal_code: None,
        }
    }

    /// Overwrite the draft's location fields; name, email and phone are kept.
    pub fn merge_into(&self, draft: &mut ClientDraft) {
        draft.address = self.address.clone();
        draft.latitude = Some(self.coordinates.latitude());
        draft.longitude = Some(self.coordinates.longitude());
        draft.city = self.city.clone();
        draft.state = self.state.clone();
        draft.postal_code = self.postal_code.clone();
    }
}
