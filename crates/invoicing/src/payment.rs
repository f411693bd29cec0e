use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use billbook_core::{Aggregate, AggregateRoot, DomainError, Event, Money, RecordId};

use crate::invoice::InvoiceId;

/// Payment identifier, assigned by the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub RecordId);

impl PaymentId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for PaymentId {
    fn from(raw: u64) -> Self {
        Self(RecordId::from_raw(raw))
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Wire Transfer")]
    WireTransfer,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    #[serde(rename = "Check")]
    Check,
    #[serde(rename = "Cash")]
    Cash,
    #[serde(rename = "Credit Card")]
    CreditCard,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::WireTransfer,
        PaymentMethod::BankTransfer,
        PaymentMethod::Check,
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::WireTransfer => "Wire Transfer",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Check => "Check",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::CreditCard => "Credit Card",
        }
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for PaymentMethod {
    type Err = DomainError;

    /// Accepts the display label in any case, with spaces, dashes or
    /// underscores between words ("Wire Transfer", "wire_transfer").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "wiretransfer" => Ok(PaymentMethod::WireTransfer),
            "banktransfer" => Ok(PaymentMethod::BankTransfer),
            "check" | "cheque" => Ok(PaymentMethod::Check),
            "cash" => Ok(PaymentMethod::Cash),
            "creditcard" => Ok(PaymentMethod::CreditCard),
            _ => Err(DomainError::validation(format!(
                "unknown payment method '{}'",
                s.trim()
            ))),
        }
    }
}

/// Aggregate root: Payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    id: PaymentId,
    invoice_id: Option<InvoiceId>,
    amount: Money,
    date: Option<NaiveDate>,
    method: PaymentMethod,
    version: u64,
    created: bool,
}

impl Payment {
    /// Create an empty, not-yet-recorded instance.
    pub fn empty(id: PaymentId) -> Self {
        Self {
            id,
            invoice_id: None,
            amount: Money::ZERO,
            date: None,
            method: PaymentMethod::WireTransfer,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> PaymentId {
        self.id
    }

    pub fn invoice_id(&self) -> Option<InvoiceId> {
        self.invoice_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }
}

impl AggregateRoot for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RecordPayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub payment_id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub date: NaiveDate,
    pub method: PaymentMethod,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentCommand {
    RecordPayment(RecordPayment),
}

/// Event: PaymentRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub payment_id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub date: NaiveDate,
    pub method: PaymentMethod,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentEvent {
    PaymentRecorded(PaymentRecorded),
}

impl Event for PaymentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::PaymentRecorded(_) => "invoicing.payment.recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PaymentEvent::PaymentRecorded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Payment {
    type Command = PaymentCommand;
    type Event = PaymentEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PaymentEvent::PaymentRecorded(e) => {
                self.id = e.payment_id;
                self.invoice_id = Some(e.invoice_id);
                self.amount = e.amount;
                self.date = Some(e.date);
                self.method = e.method;
                self.created = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PaymentCommand::RecordPayment(cmd) => self.handle_record(cmd),
        }
    }
}

impl Payment {
    fn handle_record(&self, cmd: &RecordPayment) -> Result<Vec<PaymentEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("payment already recorded"));
        }

        if cmd.amount.is_zero() {
            return Err(DomainError::validation("payment amount must be positive"));
        }

        Ok(vec![PaymentEvent::PaymentRecorded(PaymentRecorded {
            payment_id: cmd.payment_id,
            invoice_id: cmd.invoice_id,
            amount: cmd.amount,
            date: cmd.date,
            method: cmd.method,
            occurred_at: cmd.occurred_at,
        })])
    }
}
