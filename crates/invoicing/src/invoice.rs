use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use billbook_core::{Aggregate, AggregateRoot, DomainError, Event, Money, RecordId};
use billbook_parties::ClientId;

use crate::payment::PaymentId;

/// Invoice identifier, assigned by the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub RecordId);

impl InvoiceId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for InvoiceId {
    fn from(raw: u64) -> Self {
        Self(RecordId::from_raw(raw))
    }
}

/// Human-readable sequential invoice number, rendered as `INV-001`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(u32);

impl InvoiceNumber {
    pub const fn new(seq: u32) -> Self {
        Self(seq)
    }

    pub fn seq(&self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "INV-{:03}", self.0)
    }
}

/// Invoice status lifecycle.
///
/// `Pending` at issue, `Paid` once any payment is recorded. `Overdue` is only
/// ever assigned from outside; it is not derived from the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            other => Err(DomainError::validation(format!(
                "unknown invoice status '{other}' (expected pending, paid or overdue)"
            ))),
        }
    }
}

/// A billed line: description, quantity and unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    /// Price per unit, in the same unit as [`Money`].
    pub unit_price: Money,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: u64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price: Money::new(unit_price),
        }
    }

    /// `quantity * unit_price`, checked.
    pub fn total(&self) -> Result<Money, DomainError> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Aggregate root: Invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    client_id: Option<ClientId>,
    number: InvoiceNumber,
    lines: Vec<LineItem>,
    amount: Money,
    issue_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    status: InvoiceStatus,
    version: u64,
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-issued instance.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            client_id: None,
            number: InvoiceNumber::new(0),
            lines: Vec::new(),
            amount: Money::ZERO,
            issue_date: None,
            due_date: None,
            status: InvoiceStatus::Pending,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    pub fn number(&self) -> InvoiceNumber {
        self.number
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    /// Whether the due date lies strictly before `today`.
    ///
    /// Informational only; status is never changed from this.
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| due < today)
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: IssueInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInvoice {
    pub invoice_id: InvoiceId,
    pub client_id: ClientId,
    pub number: InvoiceNumber,
    pub lines: Vec<LineItem>,
    /// Flat amount, used only when `lines` is empty.
    pub explicit_amount: Option<Money>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SettleInvoice (a payment was recorded against the invoice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleInvoice {
    pub invoice_id: InvoiceId,
    pub payment_id: PaymentId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkOverdue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkOverdue {
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    IssueInvoice(IssueInvoice),
    SettleInvoice(SettleInvoice),
    MarkOverdue(MarkOverdue),
}

/// Event: InvoiceIssued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceIssued {
    pub invoice_id: InvoiceId,
    pub client_id: ClientId,
    pub number: InvoiceNumber,
    pub lines: Vec<LineItem>,
    pub amount: Money,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceSettled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSettled {
    pub invoice_id: InvoiceId,
    pub payment_id: PaymentId,
    pub previous_status: InvoiceStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceMarkedOverdue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceMarkedOverdue {
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceIssued(InvoiceIssued),
    InvoiceSettled(InvoiceSettled),
    InvoiceMarkedOverdue(InvoiceMarkedOverdue),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceIssued(_) => "invoicing.invoice.issued",
            InvoiceEvent::InvoiceSettled(_) => "invoicing.invoice.settled",
            InvoiceEvent::InvoiceMarkedOverdue(_) => "invoicing.invoice.marked_overdue",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceIssued(e) => e.occurred_at,
            InvoiceEvent::InvoiceSettled(e) => e.occurred_at,
            InvoiceEvent::InvoiceMarkedOverdue(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceIssued(e) => {
                self.id = e.invoice_id;
                self.client_id = Some(e.client_id);
                self.number = e.number;
                self.lines = e.lines.clone();
                self.amount = e.amount;
                self.issue_date = Some(e.issue_date);
                self.due_date = Some(e.due_date);
                self.status = InvoiceStatus::Pending;
                self.created = true;
            }
            InvoiceEvent::InvoiceSettled(_) => {
                self.status = InvoiceStatus::Paid;
            }
            InvoiceEvent::InvoiceMarkedOverdue(_) => {
                self.status = InvoiceStatus::Overdue;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::IssueInvoice(cmd) => self.handle_issue(cmd),
            InvoiceCommand::SettleInvoice(cmd) => self.handle_settle(cmd),
            InvoiceCommand::MarkOverdue(cmd) => self.handle_mark_overdue(cmd),
        }
    }
}

impl Invoice {
    fn ensure_invoice_id(&self, invoice_id: InvoiceId) -> Result<(), DomainError> {
        if self.id != invoice_id {
            return Err(DomainError::invariant("invoice_id mismatch"));
        }
        Ok(())
    }

    fn handle_issue(&self, cmd: &IssueInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("invoice already exists"));
        }

        if cmd.due_date < cmd.issue_date {
            return Err(DomainError::validation(
                "due date cannot be before issue date",
            ));
        }

        let amount = if cmd.lines.is_empty() {
            cmd.explicit_amount.ok_or_else(|| {
                DomainError::validation("invoice needs line items or an explicit amount")
            })?
        } else {
            let mut total = Money::ZERO;
            for line in &cmd.lines {
                if line.quantity == 0 {
                    return Err(DomainError::validation(
                        "line item quantity must be positive",
                    ));
                }
                total = total.checked_add(line.total()?)?;
            }
            total
        };

        Ok(vec![InvoiceEvent::InvoiceIssued(InvoiceIssued {
            invoice_id: cmd.invoice_id,
            client_id: cmd.client_id,
            number: cmd.number,
            lines: cmd.lines.clone(),
            amount,
            issue_date: cmd.issue_date,
            due_date: cmd.due_date,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_settle(&self, cmd: &SettleInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_invoice_id(cmd.invoice_id)?;

        // Any payment settles the invoice in full, whatever its amount and
        // however many payments came before.
        Ok(vec![InvoiceEvent::InvoiceSettled(InvoiceSettled {
            invoice_id: cmd.invoice_id,
            payment_id: cmd.payment_id,
            previous_status: self.status,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_overdue(&self, cmd: &MarkOverdue) -> Result<Vec<InvoiceEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_invoice_id(cmd.invoice_id)?;

        match self.status {
            InvoiceStatus::Paid => Err(DomainError::conflict(
                "cannot mark a paid invoice overdue",
            )),
            InvoiceStatus::Overdue => Err(DomainError::conflict("invoice is already overdue")),
            InvoiceStatus::Pending => Ok(vec![InvoiceEvent::InvoiceMarkedOverdue(
                InvoiceMarkedOverdue {
                    invoice_id: cmd.invoice_id,
                    occurred_at: cmd.occurred_at,
                },
            )]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_invoice_id() -> InvoiceId {
        InvoiceId::from(1)
    }

    fn test_client_id() -> ClientId {
        ClientId::from(1)
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn issue_cmd(lines: Vec<LineItem>, explicit_amount: Option<Money>) -> IssueInvoice {
        IssueInvoice {
            invoice_id: test_invoice_id(),
            client_id: test_client_id(),
            number: InvoiceNumber::new(1),
            lines,
            explicit_amount,
            issue_date: date(2025, 10, 1),
            due_date: date(2025, 10, 15),
            occurred_at: test_time(),
        }
    }

    fn issued(lines: Vec<LineItem>) -> Invoice {
        let mut invoice = Invoice::empty(test_invoice_id());
        let events = invoice
            .handle(&InvoiceCommand::IssueInvoice(issue_cmd(lines, None)))
            .unwrap();
        invoice.apply(&events[0]);
        invoice
    }

    fn settle() -> InvoiceCommand {
        InvoiceCommand::SettleInvoice(SettleInvoice {
            invoice_id: test_invoice_id(),
            payment_id: PaymentId::from(1),
            occurred_at: test_time(),
        })
    }

    fn mark_overdue() -> InvoiceCommand {
        InvoiceCommand::MarkOverdue(MarkOverdue {
            invoice_id: test_invoice_id(),
            occurred_at: test_time(),
        })
    }

    #[test]
    fn invoice_number_is_zero_padded() {
        assert_eq!(InvoiceNumber::new(1).to_string(), "INV-001");
        assert_eq!(InvoiceNumber::new(42).to_string(), "INV-042");
        assert_eq!(InvoiceNumber::new(1234).to_string(), "INV-1234");
    }

    #[test]
    fn status_parses_and_serializes_lowercase() {
        assert_eq!("PAID".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Paid);
        assert_eq!(" overdue".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Overdue);
        assert!("void".parse::<InvoiceStatus>().is_err());
        assert_eq!(
            serde_json::to_value(InvoiceStatus::Pending).unwrap(),
            serde_json::json!("pending")
        );
    }

    #[test]
    fn issue_invoice_sums_line_items() {
        let lines = vec![
            LineItem::new("Consulting Services", 2, 5000),
            LineItem::new("Travel", 1, 750),
        ];
        let invoice = Invoice::empty(test_invoice_id());
        let events = invoice
            .handle(&InvoiceCommand::IssueInvoice(issue_cmd(lines, None)))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            InvoiceEvent::InvoiceIssued(e) => {
                assert_eq!(e.amount, Money::new(10_750));
                assert_eq!(e.number.to_string(), "INV-001");
                assert_eq!(e.lines.len(), 2);
            }
            _ => panic!("Expected InvoiceIssued event"),
        }
    }

    #[test]
    fn line_items_win_over_explicit_amount() {
        let invoice = Invoice::empty(test_invoice_id());
        let cmd = issue_cmd(vec![LineItem::new("Web Development", 1, 8500)], Some(Money::new(1)));
        let events = invoice.handle(&InvoiceCommand::IssueInvoice(cmd)).unwrap();
        match &events[0] {
            InvoiceEvent::InvoiceIssued(e) => assert_eq!(e.amount, Money::new(8500)),
            _ => panic!("Expected InvoiceIssued event"),
        }
    }

    #[test]
    fn explicit_amount_used_without_line_items() {
        let mut invoice = Invoice::empty(test_invoice_id());
        let cmd = issue_cmd(Vec::new(), Some(Money::new(12_000)));
        let events = invoice.handle(&InvoiceCommand::IssueInvoice(cmd)).unwrap();
        invoice.apply(&events[0]);
        assert_eq!(invoice.amount(), Money::new(12_000));
        assert_eq!(invoice.status(), InvoiceStatus::Pending);
    }

    #[test]
    fn issue_rejects_missing_amount_and_lines() {
        let invoice = Invoice::empty(test_invoice_id());
        let err = invoice
            .handle(&InvoiceCommand::IssueInvoice(issue_cmd(Vec::new(), None)))
            .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("line items or an explicit amount") => {}
            _ => panic!("Expected Validation error for missing amount"),
        }
    }

    #[test]
    fn issue_rejects_zero_quantity() {
        let invoice = Invoice::empty(test_invoice_id());
        let cmd = issue_cmd(vec![LineItem::new("Nothing", 0, 100)], None);
        let err = invoice.handle(&InvoiceCommand::IssueInvoice(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn issue_allows_free_line_items() {
        let invoice = issued(vec![LineItem::new("Goodwill", 3, 0)]);
        assert_eq!(invoice.amount(), Money::ZERO);
    }

    #[test]
    fn issue_rejects_due_before_issue() {
        let invoice = Invoice::empty(test_invoice_id());
        let mut cmd = issue_cmd(vec![LineItem::new("Work", 1, 100)], None);
        cmd.due_date = date(2025, 9, 30);
        let err = invoice.handle(&InvoiceCommand::IssueInvoice(cmd)).unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("due date") => {}
            _ => panic!("Expected Validation error for due date"),
        }
    }

    #[test]
    fn issue_reports_line_overflow() {
        let invoice = Invoice::empty(test_invoice_id());
        let cmd = issue_cmd(vec![LineItem::new("Huge", 2, u64::MAX)], None);
        let err = invoice.handle(&InvoiceCommand::IssueInvoice(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn any_settlement_marks_paid() {
        let mut invoice = issued(vec![LineItem::new("Web Development", 1, 8500)]);
        let events = invoice.handle(&settle()).unwrap();
        invoice.apply(&events[0]);
        assert_eq!(invoice.status(), InvoiceStatus::Paid);

        // A second payment is accepted as well.
        let events = invoice.handle(&settle()).unwrap();
        match &events[0] {
            InvoiceEvent::InvoiceSettled(e) => assert_eq!(e.previous_status, InvoiceStatus::Paid),
            _ => panic!("Expected InvoiceSettled event"),
        }
    }

    #[test]
    fn overdue_invoice_can_be_settled() {
        let mut invoice = issued(vec![LineItem::new("Maintenance", 1, 12_000)]);
        let events = invoice.handle(&mark_overdue()).unwrap();
        invoice.apply(&events[0]);
        assert_eq!(invoice.status(), InvoiceStatus::Overdue);

        let events = invoice.handle(&settle()).unwrap();
        invoice.apply(&events[0]);
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
    }

    #[test]
    fn cannot_mark_paid_invoice_overdue() {
        let mut invoice = issued(vec![LineItem::new("Work", 1, 100)]);
        let events = invoice.handle(&settle()).unwrap();
        invoice.apply(&events[0]);

        match invoice.handle(&mark_overdue()).unwrap_err() {
            DomainError::Conflict(msg) if msg.contains("paid") => {}
            other => panic!("Expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn settle_rejects_unissued_invoice() {
        let invoice = Invoice::empty(test_invoice_id());
        assert_eq!(invoice.handle(&settle()).unwrap_err(), DomainError::NotFound);
    }

    #[test]
    fn past_due_is_informational() {
        let invoice = issued(vec![LineItem::new("Work", 1, 100)]);
        assert!(invoice.is_past_due(date(2025, 10, 16)));
        assert!(!invoice.is_past_due(date(2025, 10, 15)));
        assert_eq!(invoice.status(), InvoiceStatus::Pending);
    }

    proptest! {
        /// Property: with line items supplied, the issued amount is the sum of
        /// quantity * unit price regardless of any explicit amount.
        #[test]
        fn amount_is_sum_of_lines(
            lines in prop::collection::vec((1u32..100, 0u64..1_000_000), 1..10),
            explicit in prop::option::of(0u64..1_000_000),
        ) {
            let items: Vec<LineItem> = lines
                .iter()
                .map(|(qty, price)| LineItem::new("item", *qty, *price))
                .collect();
            let expected: u64 = lines.iter().map(|(qty, price)| u64::from(*qty) * price).sum();

            let invoice = Invoice::empty(test_invoice_id());
            let cmd = issue_cmd(items, explicit.map(Money::new));
            let events = invoice.handle(&InvoiceCommand::IssueInvoice(cmd)).unwrap();
            match &events[0] {
                InvoiceEvent::InvoiceIssued(e) => prop_assert_eq!(e.amount, Money::new(expected)),
                _ => prop_assert!(false, "Expected InvoiceIssued event"),
            }
        }
    }
}
