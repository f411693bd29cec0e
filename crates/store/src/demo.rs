//! Sample data: two clients, three invoices (paid, pending, overdue) and the
//! payment that settled the first one.

use chrono::NaiveDate;

use billbook_core::{DomainError, DomainResult};
use billbook_invoicing::{LineItem, PaymentMethod};

use crate::draft::{ClientDraft, InvoiceDraft, PaymentDraft};
use crate::store::DomainStore;

fn day(month: u32, day: u32) -> DomainResult<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, month, day)
        .ok_or_else(|| DomainError::invariant(format!("invalid demo date 2025-{month}-{day}")))
}

/// A store seeded through the regular create/record operations.
pub fn demo_store() -> DomainResult<DomainStore> {
    let mut store = DomainStore::new();

    let abc = store.create_client(
        ClientDraft::new("ABC Company")
            .with_email("contact@abc.com")
            .with_phone("(555) 123-4567")
            .with_address("123 Main Street, New York, NY 10001"),
    )?;
    let xyz = store.create_client(
        ClientDraft::new("XYZ Business")
            .with_email("info@xyz.com")
            .with_phone("(555) 987-6543")
            .with_address("456 Oak Avenue, Los Angeles, CA 90001"),
    )?;

    let consulting = store.create_invoice(
        InvoiceDraft::new(abc.id_typed(), day(10, 1)?, day(10, 15)?)
            .with_line(LineItem::new("Consulting Services", 1, 15_000)),
    )?;
    store.create_invoice(
        InvoiceDraft::new(xyz.id_typed(), day(10, 5)?, day(10, 20)?)
            .with_line(LineItem::new("Web Development", 1, 8_500)),
    )?;
    let maintenance = store.create_invoice(
        InvoiceDraft::new(abc.id_typed(), day(10, 10)?, day(10, 25)?)
            .with_line(LineItem::new("Maintenance Services", 1, 12_000)),
    )?;

    store.record_payment(PaymentDraft::new(
        consulting.id_typed(),
        15_000,
        day(10, 14)?,
        PaymentMethod::WireTransfer,
    ))?;
    store.mark_overdue(maintenance.id_typed())?;

    Ok(store)
}
