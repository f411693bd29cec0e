//! Typed drafts: the not-yet-committed fields of a create/record form.
//!
//! Each entity kind has its own draft type; [`Draft`] is the tagged union a
//! form holds, selected by the form's [`DraftKind`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billbook_core::Money;
use billbook_invoicing::{InvoiceId, LineItem, PaymentMethod};
use billbook_parties::ClientId;

/// Fields for a new client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientDraft {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl ClientDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}

/// Fields for a new invoice.
///
/// Either `lines` is non-empty or `amount` is set; with line items present the
/// amount is computed and `amount` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub client_id: Option<ClientId>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub lines: Vec<LineItem>,
    pub amount: Option<Money>,
}

impl InvoiceDraft {
    pub fn new(client_id: ClientId, issue_date: NaiveDate, due_date: NaiveDate) -> Self {
        Self {
            client_id: Some(client_id),
            issue_date: Some(issue_date),
            due_date: Some(due_date),
            ..Self::default()
        }
    }

    pub fn with_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(Money::new(amount));
        self
    }
}

/// Fields for a new payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub invoice_id: Option<InvoiceId>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub method: Option<PaymentMethod>,
}

impl PaymentDraft {
    pub fn new(
        invoice_id: InvoiceId,
        amount: u64,
        date: NaiveDate,
        method: PaymentMethod,
    ) -> Self {
        Self {
            invoice_id: Some(invoice_id),
            amount: Some(Money::new(amount)),
            date: Some(date),
            method: Some(method),
        }
    }
}

/// Which kind of record a form is drafting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftKind {
    Client,
    Invoice,
    Payment,
}

/// A form draft for exactly one kind of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Draft {
    Client(ClientDraft),
    Invoice(InvoiceDraft),
    Payment(PaymentDraft),
}

impl Draft {
    /// A blank draft of the given kind (what a freshly opened form holds).
    pub fn empty(kind: DraftKind) -> Self {
        match kind {
            DraftKind::Client => Draft::Client(ClientDraft::default()),
            DraftKind::Invoice => Draft::Invoice(InvoiceDraft::default()),
            DraftKind::Payment => Draft::Payment(PaymentDraft::default()),
        }
    }

    pub fn kind(&self) -> DraftKind {
        match self {
            Draft::Client(_) => DraftKind::Client,
            Draft::Invoice(_) => DraftKind::Invoice,
            Draft::Payment(_) => DraftKind::Payment,
        }
    }

    pub fn as_client_mut(&mut self) -> Option<&mut ClientDraft> {
        match self {
            Draft::Client(draft) => Some(draft),
            _ => None,
        }
    }
}

impl From<ClientDraft> for Draft {
    fn from(draft: ClientDraft) -> Self {
        Draft::Client(draft)
    }
}

impl From<InvoiceDraft> for Draft {
    fn from(draft: InvoiceDraft) -> Self {
        Draft::Invoice(draft)
    }
}

impl From<PaymentDraft> for Draft {
    fn from(draft: PaymentDraft) -> Self {
        Draft::Payment(draft)
    }
}
