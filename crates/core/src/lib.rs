//! `billbook-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the client, invoice
//! and payment modules (no IO, no storage).

pub mod aggregate;
pub mod error;
pub mod event;
pub mod geo;
pub mod id;
pub mod money;

pub use aggregate::{Aggregate, AggregateRoot};
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use geo::Coordinates;
pub use id::{IdSequence, RecordId};
pub use money::Money;
