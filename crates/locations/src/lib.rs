//! Location picking for client drafts.
//!
//! [`LocationPicker`] turns a text search, the device's position or a map
//! click into a staged location, which is then merged into a
//! [`billbook_store::ClientDraft`]. Lookups are fire-and-forget from the
//! draft's point of view: failures end up as an empty result or a
//! [`Notice`], never as an error.

pub mod picker;
pub mod provider;
pub mod staged;

pub use picker::{LocationPicker, Notice, PickerState, Ticket, MIN_QUERY_CHARS};
pub use provider::{LocationError, LocationProvider, NoLocationProvider};
pub use staged::StagedLocation;
