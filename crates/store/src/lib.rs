//! In-memory domain store for clients, invoices and payments.
//!
//! [`DomainStore`] owns the three record collections and is the only thing
//! allowed to mutate them. [`ViewModel`] computes statistics and filtered
//! projections over a borrowed store, recomputed on every call.

pub mod demo;
pub mod draft;
pub mod overdue;
pub mod store;
pub mod views;

pub use demo::demo_store;
pub use draft::{ClientDraft, Draft, DraftKind, InvoiceDraft, PaymentDraft};
pub use overdue::OverduePolicy;
pub use store::{Created, DomainStore};
pub use views::{
    InvoiceQuery, PaymentRow, Statistics, StatusFilter, ViewModel, UNKNOWN_CLIENT,
    UNKNOWN_INVOICE,
};
