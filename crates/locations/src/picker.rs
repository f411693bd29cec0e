//! The location picker state machine.
//!
//! ```text
//! Idle --begin_*--> Searching --complete_*--> Idle (candidates / notice)
//!                                         \-> Resolved --commit/cancel--> Idle
//! ```
//!
//! Each lookup is tagged with a [`Ticket`]. Only a response carrying the
//! latest ticket is applied; `cancel`, `commit` and `select_candidate` issue a
//! new one, so anything still in flight for the abandoned session is dropped.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use billbook_core::Coordinates;
use billbook_geocoding::{Geocoder, GeocodingResult, Place};
use billbook_store::ClientDraft;

use crate::provider::{LocationError, LocationProvider};
use crate::staged::StagedLocation;

/// Queries shorter than this are ignored.
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerState {
    #[default]
    Idle,
    Searching,
    Resolved,
}

/// Sequence number of one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// User-facing message left behind by a lookup that produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    NoResults,
    LookupFailed,
    LocationUnavailable,
    LocationUnsupported,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::NoResults => "No matching addresses found.",
            Notice::LookupFailed => "Address lookup failed. Please enter address manually.",
            Notice::LocationUnavailable => {
                "Unable to get your location. Please enter address manually."
            }
            Notice::LocationUnsupported => "Geolocation is not supported on this device.",
        }
    }
}

impl core::fmt::Display for Notice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<&LocationError> for Notice {
    fn from(err: &LocationError) -> Self {
        match err {
            LocationError::Unsupported => Notice::LocationUnsupported,
            LocationError::PermissionDenied | LocationError::Unavailable(_) => {
                Notice::LocationUnavailable
            }
        }
    }
}

/// Drives one location-picking session for a client draft.
pub struct LocationPicker<G, P> {
    geocoder: G,
    provider: P,
    state: PickerState,
    latest: u64,
    candidates: Vec<Place>,
    staged: Option<StagedLocation>,
    notice: Option<Notice>,
}

impl<G, P> LocationPicker<G, P>
where
    G: Geocoder,
    P: LocationProvider,
{
    pub fn new(geocoder: G, provider: P) -> Self {
        Self {
            geocoder,
            provider,
            state: PickerState::Idle,
            latest: 0,
            candidates: Vec::new(),
            staged: None,
            notice: None,
        }
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn candidates(&self) -> &[Place] {
        &self.candidates
    }

    pub fn staged(&self) -> Option<&StagedLocation> {
        self.staged.as_ref()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    /// Whether `ticket` belongs to the most recent lookup.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    fn advance(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    fn begin(&mut self) -> Ticket {
        let ticket = self.advance();
        self.state = PickerState::Searching;
        self.candidates.clear();
        self.notice = None;
        ticket
    }

    fn accept(&self, ticket: Ticket, what: &str) -> bool {
        if self.is_current(ticket) {
            return true;
        }
        debug!(
            ticket = ticket.0,
            latest = self.latest,
            lookup = what,
            "discarding stale lookup response"
        );
        false
    }

    fn resolve(&mut self, staged: StagedLocation) {
        info!(
            latitude = staged.coordinates.latitude(),
            longitude = staged.coordinates.longitude(),
            address = staged.address.as_deref().unwrap_or(""),
            "location staged"
        );
        self.staged = Some(staged);
        self.candidates.clear();
        self.state = PickerState::Resolved;
    }

    fn fail(&mut self, notice: Notice) {
        self.candidates.clear();
        self.notice = Some(notice);
        self.state = PickerState::Idle;
    }

    /// Start a text search. Returns `None` (and changes nothing) for queries
    /// shorter than [`MIN_QUERY_CHARS`], counted before trimming.
    pub fn begin_search(&mut self, query: &str) -> Option<Ticket> {
        if query.chars().count() < MIN_QUERY_CHARS {
            debug!(query, "search query too short; ignored");
            return None;
        }
        Some(self.begin())
    }

    /// Apply a search response. Returns `false` if it was stale.
    pub fn complete_search(&mut self, ticket: Ticket, result: GeocodingResult<Vec<Place>>) -> bool {
        if !self.accept(ticket, "search") {
            return false;
        }
        match result {
            Ok(places) if places.is_empty() => self.fail(Notice::NoResults),
            Ok(places) => {
                debug!(candidates = places.len(), "search completed");
                self.candidates = places;
                self.state = PickerState::Idle;
            }
            Err(err) => {
                warn!(error = %err, "address search failed");
                self.fail(Notice::LookupFailed);
            }
        }
        true
    }

    /// Stage one of the current search candidates.
    pub fn select_candidate(&mut self, index: usize) -> Option<&StagedLocation> {
        if index >= self.candidates.len() {
            return None;
        }
        let place = self.candidates.swap_remove(index);
        self.advance();
        self.resolve(StagedLocation::from_place(place));
        self.staged.as_ref()
    }

    pub fn begin_device_location(&mut self) -> Ticket {
        self.begin()
    }

    /// The device could not produce a position.
    pub fn fail_device_location(&mut self, ticket: Ticket, err: &LocationError) -> bool {
        if !self.accept(ticket, "device location") {
            return false;
        }
        warn!(error = %err, "device location unavailable");
        self.fail(Notice::from(err));
        true
    }

    /// Apply the reverse lookup for the device position `at`.
    pub fn complete_device_location(
        &mut self,
        ticket: Ticket,
        at: Coordinates,
        result: GeocodingResult<Place>,
    ) -> bool {
        if !self.accept(ticket, "device location") {
            return false;
        }
        match result {
            Ok(place) => self.resolve(StagedLocation::from_place(Place {
                coordinates: at,
                ..place
            })),
            Err(err) => {
                warn!(error = %err, "reverse lookup for device location failed");
                self.fail(Notice::LookupFailed);
            }
        }
        true
    }

    pub fn begin_map_click(&mut self) -> Ticket {
        self.begin()
    }

    /// Apply the reverse lookup for a clicked point.
    ///
    /// The clicked coordinates are always staged; without a display name
    /// (or when the lookup fails) the address becomes the coordinate label.
    pub fn complete_map_click(
        &mut self,
        ticket: Ticket,
        at: Coordinates,
        result: GeocodingResult<Place>,
    ) -> bool {
        if !self.accept(ticket, "map click") {
            return false;
        }
        let staged = match result {
            Ok(place) if place.display_name.is_some() => StagedLocation::from_place(Place {
                coordinates: at,
                ..place
            }),
            Ok(place) => StagedLocation {
                city: place.address.city,
                state: place.address.state,
                postal_code: place.address.postal_code,
                ..StagedLocation::unnamed(at)
            },
            Err(err) => {
                warn!(error = %err, "reverse lookup for map click failed");
                StagedLocation::unnamed(at)
            }
        };
        self.resolve(staged);
        true
    }

    /// Abandon the session. In-flight responses become stale.
    pub fn cancel(&mut self) {
        self.advance();
        self.candidates.clear();
        self.staged = None;
        self.notice = None;
        self.state = PickerState::Idle;
    }

    /// Merge the staged location into `draft` and end the session.
    ///
    /// Returns `false` if nothing was staged; the draft is then untouched.
    pub fn commit(&mut self, draft: &mut ClientDraft) -> bool {
        let staged = self.staged.take();
        if let Some(staged) = &staged {
            staged.merge_into(draft);
        }
        self.cancel();
        staged.is_some()
    }

    /// Run a text search to completion.
    pub async fn search(&mut self, query: &str) {
        let Some(ticket) = self.begin_search(query) else {
            return;
        };
        let result = self.geocoder.search(query.trim()).await;
        self.complete_search(ticket, result);
    }

    /// Ask the device for its position and stage its reverse lookup.
    pub async fn use_device_location(&mut self) {
        let ticket = self.begin_device_location();
        match self.provider.current_position().await {
            Ok(at) => {
                let result = self.geocoder.reverse(at).await;
                self.complete_device_location(ticket, at, result);
            }
            Err(err) => {
                self.fail_device_location(ticket, &err);
            }
        }
    }

    /// Stage the point clicked on the map.
    pub async fn pick_on_map(&mut self, at: Coordinates) {
        let ticket = self.begin_map_click();
        let result = self.geocoder.reverse(at).await;
        self.complete_map_click(ticket, at, result);
    }
}
