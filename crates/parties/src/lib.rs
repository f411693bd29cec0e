//! Clients domain module.
//!
//! This crate contains business rules for the clients invoices are billed to,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod client;

pub use client::{
    AddressParts, Client, ClientCommand, ClientEvent, ClientId, ClientRegistered, ContactInfo,
    RegisterClient,
};
