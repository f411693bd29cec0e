//! Derived view model: statistics and projections over a store snapshot.
//!
//! Nothing here is cached; every call recomputes from the store it borrows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billbook_core::{DomainError, Money};
use billbook_invoicing::{Invoice, InvoiceId, InvoiceStatus, PaymentId, PaymentMethod};
use billbook_parties::{Client, ClientId};

use crate::store::DomainStore;

/// Name shown for an invoice whose client cannot be found.
pub const UNKNOWN_CLIENT: &str = "Unknown Client";

/// Label shown for a payment whose invoice cannot be found.
pub const UNKNOWN_INVOICE: &str = "Unknown Invoice";

/// Dashboard totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Sum over invoices with status `paid`.
    pub total_revenue: Money,
    pub pending_amount: Money,
    pub overdue_amount: Money,
    pub total_clients: usize,
    pub total_invoices: usize,
}

/// Status half of an invoice filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Paid,
    Overdue,
}

impl StatusFilter {
    pub fn matches(&self, status: InvoiceStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == InvoiceStatus::Pending,
            StatusFilter::Paid => status == InvoiceStatus::Paid,
            StatusFilter::Overdue => status == InvoiceStatus::Overdue,
        }
    }
}

impl From<InvoiceStatus> for StatusFilter {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Pending => StatusFilter::Pending,
            InvoiceStatus::Paid => StatusFilter::Paid,
            InvoiceStatus::Overdue => StatusFilter::Overdue,
        }
    }
}

impl core::str::FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<InvoiceStatus>().map(StatusFilter::from)
    }
}

/// Search term + status filter, AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceQuery {
    pub search_term: String,
    pub status: StatusFilter,
}

impl InvoiceQuery {
    pub fn new(search_term: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            search_term: search_term.into(),
            status,
        }
    }
}

/// A payment joined with its invoice number and client name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub payment_id: PaymentId,
    pub invoice_id: Option<InvoiceId>,
    pub invoice_number: String,
    pub client_name: String,
    pub amount: Money,
    pub date: Option<NaiveDate>,
    pub method: PaymentMethod,
}

/// Read-only projections over a [`DomainStore`].
#[derive(Debug, Clone, Copy)]
pub struct ViewModel<'a> {
    store: &'a DomainStore,
}

impl<'a> ViewModel<'a> {
    pub fn new(store: &'a DomainStore) -> Self {
        Self { store }
    }

    pub fn statistics(&self) -> Statistics {
        let sum_with = |status: InvoiceStatus| {
            self.store
                .invoices()
                .iter()
                .filter(|inv| inv.status() == status)
                .fold(Money::ZERO, |acc, inv| acc.saturating_add(inv.amount()))
        };

        Statistics {
            total_revenue: sum_with(InvoiceStatus::Paid),
            pending_amount: sum_with(InvoiceStatus::Pending),
            overdue_amount: sum_with(InvoiceStatus::Overdue),
            total_clients: self.store.clients().len(),
            total_invoices: self.store.invoices().len(),
        }
    }

    /// The client's name, or [`UNKNOWN_CLIENT`]. Never fails.
    pub fn resolve_client_name(&self, client_id: ClientId) -> &'a str {
        self.store
            .client(client_id)
            .map(Client::name)
            .unwrap_or(UNKNOWN_CLIENT)
    }

    fn invoice_client_name(&self, invoice: &Invoice) -> &'a str {
        invoice
            .client_id()
            .map(|id| self.resolve_client_name(id))
            .unwrap_or(UNKNOWN_CLIENT)
    }

    /// Whether `invoice` satisfies `query`.
    ///
    /// The term matches case-insensitively against the resolved client name
    /// or the invoice number; an empty term matches everything.
    pub fn matches(&self, query: &InvoiceQuery, invoice: &Invoice) -> bool {
        if !query.status.matches(invoice.status()) {
            return false;
        }
        let term = query.search_term.to_lowercase();
        self.invoice_client_name(invoice).to_lowercase().contains(&term)
            || invoice.number().to_string().to_lowercase().contains(&term)
    }

    /// Invoices matching `query`, in insertion order.
    pub fn query_invoices(&self, query: &InvoiceQuery) -> Vec<&'a Invoice> {
        self.refine(query, self.store.invoices())
    }

    /// Narrow an existing selection of invoices by `query`, keeping order.
    pub fn refine<I>(&self, query: &InvoiceQuery, invoices: I) -> Vec<&'a Invoice>
    where
        I: IntoIterator<Item = &'a Invoice>,
    {
        invoices
            .into_iter()
            .filter(|inv| self.matches(query, inv))
            .collect()
    }

    pub fn filter_invoices(&self, search_term: &str, status: StatusFilter) -> Vec<&'a Invoice> {
        self.query_invoices(&InvoiceQuery::new(search_term, status))
    }

    /// The last `n` invoices created, most recent first.
    pub fn recent_invoices(&self, n: usize) -> Vec<&'a Invoice> {
        self.store.invoices().iter().rev().take(n).collect()
    }

    /// Every payment with its invoice number and client name, oldest first.
    pub fn payment_rows(&self) -> Vec<PaymentRow> {
        self.store
            .payments()
            .iter()
            .map(|payment| {
                let invoice = payment.invoice_id().and_then(|id| self.store.invoice(id));
                PaymentRow {
                    payment_id: payment.id_typed(),
                    invoice_id: payment.invoice_id(),
                    invoice_number: invoice
                        .map(|inv| inv.number().to_string())
                        .unwrap_or_else(|| UNKNOWN_INVOICE.to_string()),
                    client_name: invoice
                        .map(|inv| self.invoice_client_name(inv))
                        .unwrap_or(UNKNOWN_CLIENT)
                        .to_string(),
                    amount: payment.amount(),
                    date: payment.date(),
                    method: payment.method(),
                }
            })
            .collect()
    }

    /// Clients with resolved coordinates (the ones with a map link).
    pub fn located_clients(&self) -> Vec<&'a Client> {
        self.store
            .clients()
            .iter()
            .filter(|c| c.is_located())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_store;
    use crate::draft::{ClientDraft, InvoiceDraft, PaymentDraft};
    use billbook_invoicing::LineItem;
    use proptest::prelude::*;

    fn numbers(invoices: &[&Invoice]) -> Vec<String> {
        invoices.iter().map(|i| i.number().to_string()).collect()
    }

    #[test]
    fn demo_statistics() {
        let store = demo_store().unwrap();
        let stats = store.view().statistics();
        assert_eq!(
            stats,
            Statistics {
                total_revenue: Money::new(15_000),
                pending_amount: Money::new(8_500),
                overdue_amount: Money::new(12_000),
                total_clients: 2,
                total_invoices: 3,
            }
        );
    }

    #[test]
    fn filter_by_client_name_substring() {
        let store = demo_store().unwrap();
        let hits = store.view().filter_invoices("abc", StatusFilter::All);
        assert_eq!(numbers(&hits), vec!["INV-001", "INV-003"]);
    }

    #[test]
    fn filter_by_invoice_number_and_status() {
        let store = demo_store().unwrap();
        let view = store.view();

        assert_eq!(numbers(&view.filter_invoices("inv-002", StatusFilter::All)), vec!["INV-002"]);
        assert_eq!(numbers(&view.filter_invoices("", StatusFilter::Overdue)), vec!["INV-003"]);
        assert!(view.filter_invoices("xyz", StatusFilter::Paid).is_empty());
        assert_eq!(view.filter_invoices("", StatusFilter::All).len(), 3);
    }

    #[test]
    fn status_filter_parses() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("Paid".parse::<StatusFilter>().unwrap(), StatusFilter::Paid);
        assert!("void".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn unknown_client_name_is_sentinel() {
        let store = demo_store().unwrap();
        assert_eq!(store.view().resolve_client_name(ClientId::from(1)), "ABC Company");
        assert_eq!(store.view().resolve_client_name(ClientId::from(404)), "Unknown Client");
    }

    #[test]
    fn recent_invoices_newest_first() {
        let store = demo_store().unwrap();
        let view = store.view();
        assert_eq!(numbers(&view.recent_invoices(2)), vec!["INV-003", "INV-002"]);
        assert_eq!(view.recent_invoices(10).len(), 3);
        assert!(view.recent_invoices(0).is_empty());
    }

    #[test]
    fn payment_rows_join_invoice_and_client() {
        let store = demo_store().unwrap();
        let rows = store.view().payment_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].invoice_number, "INV-001");
        assert_eq!(rows[0].client_name, "ABC Company");
        assert_eq!(rows[0].amount, Money::new(15_000));
        assert_eq!(rows[0].method, PaymentMethod::WireTransfer);
    }

    #[test]
    fn located_clients_only() {
        let mut store = demo_store().unwrap();
        assert!(store.view().located_clients().is_empty());
        store
            .create_client(ClientDraft::new("Mapped").with_coordinates(34.0522, -118.2437))
            .unwrap();
        let located = store.view().located_clients();
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].name(), "Mapped");
    }

    #[test]
    fn partial_payment_example_moves_amount_to_revenue() {
        let mut store = demo_store().unwrap();
        store
            .record_payment(PaymentDraft::new(
                InvoiceId::from(2),
                1,
                NaiveDate::from_ymd_opt(2025, 10, 21).unwrap(),
                PaymentMethod::Check,
            ))
            .unwrap();

        assert_eq!(store.invoice(InvoiceId::from(2)).unwrap().status(), InvoiceStatus::Paid);
        let stats = store.view().statistics();
        assert_eq!(stats.total_revenue, Money::new(23_500));
        assert_eq!(stats.pending_amount, Money::ZERO);
    }

    fn status_strategy() -> impl Strategy<Value = u8> {
        0u8..3
    }

    fn build_store(specs: &[(u64, u8, usize)]) -> DomainStore {
        let mut store = DomainStore::new();
        for name in ["ABC Company", "XYZ Business", "Acme Widgets"] {
            store.create_client(ClientDraft::new(name)).unwrap();
        }
        let day = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        for (amount, status, client) in specs {
            let invoice = store
                .create_invoice(
                    InvoiceDraft::new(ClientId::from(*client as u64 + 1), day, day)
                        .with_line(LineItem::new("Work", 1, *amount)),
                )
                .unwrap();
            match status {
                1 => {
                    store
                        .record_payment(PaymentDraft::new(
                            invoice.id_typed(),
                            1,
                            day,
                            PaymentMethod::Cash,
                        ))
                        .unwrap();
                }
                2 => {
                    store.mark_overdue(invoice.id_typed()).unwrap();
                }
                _ => {}
            }
        }
        store
    }

    proptest! {
        /// Property: total revenue is the sum of paid invoice amounts.
        #[test]
        fn revenue_is_sum_of_paid(
            specs in prop::collection::vec((0u64..1_000_000, status_strategy(), 0usize..3), 0..30)
        ) {
            let store = build_store(&specs);
            let expected: u64 = specs.iter().filter(|(_, s, _)| *s == 1).map(|(a, _, _)| a).sum();
            let pending: u64 = specs.iter().filter(|(_, s, _)| *s == 0).map(|(a, _, _)| a).sum();
            let stats = store.view().statistics();
            prop_assert_eq!(stats.total_revenue, Money::new(expected));
            prop_assert_eq!(stats.pending_amount, Money::new(pending));
            prop_assert_eq!(stats.total_invoices, specs.len());
        }

        /// Property: filtering an already-filtered result changes nothing.
        #[test]
        fn filter_is_idempotent(
            specs in prop::collection::vec((0u64..1_000, status_strategy(), 0usize..3), 0..30),
            term in prop::sample::select(vec![
                "", "a", "abc", "XYZ", "inv-00", "widgets", "nothing",
            ]),
            status in prop::sample::select(vec![
                StatusFilter::All,
                StatusFilter::Pending,
                StatusFilter::Paid,
                StatusFilter::Overdue,
            ]),
        ) {
            let store = build_store(&specs);
            let view = store.view();
            let query = InvoiceQuery::new(term, status);

            let once = view.query_invoices(&query);
            let twice = view.refine(&query, once.iter().copied());
            prop_assert_eq!(numbers(&once), numbers(&twice));
        }
    }
}
