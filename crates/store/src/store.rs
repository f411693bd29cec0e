//! The domain store: owner of all client, invoice and payment records.
//!
//! Every mutation follows the same shape: validate the draft against the
//! current collections, let the aggregate decide its events, and only then
//! apply them and allocate identifiers. A rejected draft leaves the store
//! exactly as it was.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use billbook_core::{
    Aggregate, AggregateRoot, Coordinates, DomainError, DomainResult, Event, IdSequence,
};
use billbook_invoicing::{
    Invoice, InvoiceCommand, InvoiceId, InvoiceNumber, IssueInvoice, MarkOverdue, Payment,
    PaymentCommand, PaymentId, RecordPayment, SettleInvoice,
};
use billbook_parties::{
    AddressParts, Client, ClientCommand, ClientId, ContactInfo, RegisterClient,
};

use crate::draft::{ClientDraft, Draft, InvoiceDraft, PaymentDraft};
use crate::overdue::OverduePolicy;
use crate::views::ViewModel;

/// Record produced by [`DomainStore::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Created {
    Client(Client),
    Invoice(Invoice),
    Payment(Payment),
}

/// Single source of truth for clients, invoices and payments.
///
/// Collections are kept in creation order; identifiers are allocated from
/// per-kind monotonic sequences and are never reused. Invoice display numbers
/// come from their own counter, independent of how many invoices exist.
#[derive(Debug, Clone)]
pub struct DomainStore {
    clients: Vec<Client>,
    invoices: Vec<Invoice>,
    payments: Vec<Payment>,
    client_ids: IdSequence,
    invoice_ids: IdSequence,
    payment_ids: IdSequence,
    next_invoice_number: u32,
    overdue_policy: OverduePolicy,
}

impl Default for DomainStore {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn apply_all<A>(aggregate: &mut A, events: &[A::Event])
where
    A: Aggregate,
    A::Event: Event,
{
    for event in events {
        aggregate.apply(event);
        debug!(
            event_type = event.event_type(),
            version = aggregate.version(),
            "event applied"
        );
    }
}

fn required<T>(value: Option<T>, field: &str) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::validation(format!("{field} is required")))
}

impl DomainStore {
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
            invoices: Vec::new(),
            payments: Vec::new(),
            client_ids: IdSequence::new(),
            invoice_ids: IdSequence::new(),
            payment_ids: IdSequence::new(),
            next_invoice_number: 1,
            overdue_policy: OverduePolicy::default(),
        }
    }

    pub fn with_overdue_policy(mut self, policy: OverduePolicy) -> Self {
        self.overdue_policy = policy;
        self
    }

    pub fn overdue_policy(&self) -> OverduePolicy {
        self.overdue_policy
    }

    /// Derived statistics and projections over the current contents.
    pub fn view(&self) -> ViewModel<'_> {
        ViewModel::new(self)
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    // Ids are allocated in ascending order and records are appended, so each
    // collection stays sorted by id.
    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients
            .binary_search_by_key(&id, Client::id_typed)
            .ok()
            .map(|idx| &self.clients[idx])
    }

    pub fn invoice(&self, id: InvoiceId) -> Option<&Invoice> {
        self.invoice_index(id).map(|idx| &self.invoices[idx])
    }

    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments
            .binary_search_by_key(&id, Payment::id_typed)
            .ok()
            .map(|idx| &self.payments[idx])
    }

    /// Payments recorded against one invoice, oldest first.
    pub fn payments_for(&self, invoice_id: InvoiceId) -> impl Iterator<Item = &Payment> + '_ {
        self.payments
            .iter()
            .filter(move |p| p.invoice_id() == Some(invoice_id))
    }

    fn invoice_index(&self, id: InvoiceId) -> Option<usize> {
        self.invoices
            .binary_search_by_key(&id, Invoice::id_typed)
            .ok()
    }

    /// Dispatch a form draft to the matching create/record operation.
    pub fn submit(&mut self, draft: Draft) -> DomainResult<Created> {
        match draft {
            Draft::Client(d) => self.create_client(d).map(Created::Client),
            Draft::Invoice(d) => self.create_invoice(d).map(Created::Invoice),
            Draft::Payment(d) => self.record_payment(d).map(Created::Payment),
        }
    }

    pub fn create_client(&mut self, draft: ClientDraft) -> DomainResult<Client> {
        let location = Coordinates::pair(draft.latitude, draft.longitude)?;
        let client_id = ClientId::new(self.client_ids.peek());

        let cmd = RegisterClient {
            client_id,
            name: draft.name,
            contact: ContactInfo {
                email: non_blank(draft.email),
                phone: non_blank(draft.phone),
                address: non_blank(draft.address),
            },
            location,
            address_parts: AddressParts {
                city: non_blank(draft.city),
                state: non_blank(draft.state),
                postal_code: non_blank(draft.postal_code),
            },
            occurred_at: Utc::now(),
        };

        let mut client = Client::empty(client_id);
        let events = client.handle(&ClientCommand::RegisterClient(cmd))?;
        apply_all(&mut client, &events);

        self.client_ids.allocate();
        info!(
            client_id = %client_id,
            name = client.name(),
            located = client.is_located(),
            "client created"
        );
        self.clients.push(client.clone());
        Ok(client)
    }

    pub fn create_invoice(&mut self, draft: InvoiceDraft) -> DomainResult<Invoice> {
        let client_id = required(draft.client_id, "client_id")?;
        if self.client(client_id).is_none() {
            return Err(DomainError::validation(format!(
                "client {client_id} does not exist"
            )));
        }
        let issue_date = required(draft.issue_date, "issue_date")?;
        let due_date = required(draft.due_date, "due_date")?;

        let invoice_id = InvoiceId::new(self.invoice_ids.peek());
        let number = InvoiceNumber::new(self.next_invoice_number);

        let cmd = IssueInvoice {
            invoice_id,
            client_id,
            number,
            lines: draft.lines,
            explicit_amount: draft.amount,
            issue_date,
            due_date,
            occurred_at: Utc::now(),
        };

        let mut invoice = Invoice::empty(invoice_id);
        let events = invoice.handle(&InvoiceCommand::IssueInvoice(cmd))?;
        apply_all(&mut invoice, &events);

        self.invoice_ids.allocate();
        self.next_invoice_number += 1;
        info!(
            invoice_id = %invoice_id,
            number = %number,
            client_id = %client_id,
            amount = %invoice.amount(),
            "invoice created"
        );
        self.invoices.push(invoice.clone());
        Ok(invoice)
    }

    /// Record a payment and mark its invoice paid.
    ///
    /// Any positive amount settles the invoice; partial and repeated payments
    /// are accepted as-is.
    pub fn record_payment(&mut self, draft: PaymentDraft) -> DomainResult<Payment> {
        let invoice_id = required(draft.invoice_id, "invoice_id")?;
        let idx = self.invoice_index(invoice_id).ok_or_else(|| {
            DomainError::validation(format!("invoice {invoice_id} does not exist"))
        })?;
        let amount = required(draft.amount, "amount")?;
        let date = required(draft.date, "date")?;
        let method = required(draft.method, "method")?;

        let payment_id = PaymentId::new(self.payment_ids.peek());
        let now = Utc::now();

        let mut payment = Payment::empty(payment_id);
        let payment_events = payment.handle(&PaymentCommand::RecordPayment(RecordPayment {
            payment_id,
            invoice_id,
            amount,
            date,
            method,
            occurred_at: now,
        }))?;
        let settle_events = self.invoices[idx].handle(&InvoiceCommand::SettleInvoice(
            SettleInvoice {
                invoice_id,
                payment_id,
                occurred_at: now,
            },
        ))?;

        apply_all(&mut payment, &payment_events);
        let invoice = &mut self.invoices[idx];
        apply_all(invoice, &settle_events);

        self.payment_ids.allocate();
        info!(
            payment_id = %payment_id,
            invoice_id = %invoice_id,
            amount = %amount,
            method = %method,
            invoice_amount = %invoice.amount(),
            "payment recorded, invoice marked paid"
        );
        self.payments.push(payment.clone());
        Ok(payment)
    }

    /// Externally assign the overdue status to a pending invoice.
    pub fn mark_overdue(&mut self, invoice_id: InvoiceId) -> DomainResult<Invoice> {
        let idx = self.invoice_index(invoice_id).ok_or_else(DomainError::not_found)?;
        let invoice = &mut self.invoices[idx];

        let events = invoice.handle(&InvoiceCommand::MarkOverdue(MarkOverdue {
            invoice_id,
            occurred_at: Utc::now(),
        }))?;
        apply_all(invoice, &events);

        info!(invoice_id = %invoice_id, number = %invoice.number(), "invoice marked overdue");
        Ok(invoice.clone())
    }

    /// Apply the store's [`OverduePolicy`] as of `today`.
    ///
    /// Returns the invoices that transitioned. With the default policy nothing
    /// ever does.
    pub fn refresh_overdue(&mut self, today: NaiveDate) -> Vec<InvoiceId> {
        let policy = self.overdue_policy;
        let flagged: Vec<InvoiceId> = self
            .invoices
            .iter()
            .filter(|invoice| policy.flags(invoice, today))
            .map(Invoice::id_typed)
            .collect();

        let mut changed = Vec::with_capacity(flagged.len());
        for invoice_id in flagged {
            match self.mark_overdue(invoice_id) {
                Ok(_) => changed.push(invoice_id),
                Err(err) => warn!(
                    invoice_id = %invoice_id,
                    error = %err,
                    "overdue refresh skipped invoice"
                ),
            }
        }

        debug!(?policy, %today, changed = changed.len(), "overdue refresh");
        changed
    }
}
