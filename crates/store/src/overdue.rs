//! When a pending invoice should be considered overdue.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billbook_invoicing::{Invoice, InvoiceStatus};

/// Policy consulted by [`crate::DomainStore::refresh_overdue`].
///
/// `Overdue` is normally assigned explicitly, so the default policy never
/// flags anything and the refresh is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverduePolicy {
    /// Only explicit `mark_overdue` calls change status.
    #[default]
    ExplicitOnly,
    /// Pending invoices whose due date has passed become overdue.
    DueDatePassed,
}

impl OverduePolicy {
    /// Whether `invoice` should transition to overdue as of `today`.
    pub fn flags(&self, invoice: &Invoice, today: NaiveDate) -> bool {
        match self {
            OverduePolicy::ExplicitOnly => false,
            OverduePolicy::DueDatePassed => {
                invoice.status() == InvoiceStatus::Pending && invoice.is_past_due(today)
            }
        }
    }
}
