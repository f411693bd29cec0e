//! Invoicing domain module.
//!
//! This crate contains business rules for invoices and the payments recorded
//! against them, implemented purely as deterministic domain logic (no IO, no
//! storage).

pub mod invoice;
pub mod payment;

pub use invoice::{
    Invoice, InvoiceCommand, InvoiceEvent, InvoiceId, InvoiceIssued, InvoiceMarkedOverdue,
    InvoiceNumber, InvoiceSettled, InvoiceStatus, IssueInvoice, LineItem, MarkOverdue,
    SettleInvoice,
};
pub use payment::{
    Payment, PaymentCommand, PaymentEvent, PaymentId, PaymentMethod, PaymentRecorded,
    RecordPayment,
};
