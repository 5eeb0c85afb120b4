//! Customer invoices: header, line items, derived VAT totals and the
//! draft → sent → paid flow

use bigdecimal::BigDecimal;
use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};

use crate::crm::{Customer, Payment};
use crate::ledger::document::{provisional_number, stage_of, DocumentStage};
use crate::reports::InvoiceSummary;
use crate::tax::vat::{calculate_totals, validate_line_items, InvoiceLineItem, InvoiceTotals};
use crate::traits::*;
use crate::types::*;
use crate::utils::{lenient, wire};

/// Days between the invoice date and its default due date
pub const DEFAULT_PAYMENT_TERMS_DAYS: u64 = 30;

/// Customer invoice.
///
/// Subtotal, VAT and total are never stored on the struct: they are derived
/// from the items on every read and written into the wire payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InvoiceDocument {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub number: String,
    /// Display name of the billed customer
    #[serde(default, deserialize_with = "lenient::text")]
    pub customer: String,
    /// `None` for walk-in (custom) customers
    #[serde(default, deserialize_with = "lenient::optional_id")]
    pub customer_id: Option<u64>,
    #[serde(default)]
    pub customer_company: String,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(
        default,
        rename = "dueDate",
        alias = "due_date",
        deserialize_with = "lenient::optional_date"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub items: Vec<InvoiceLineItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    number: &'a str,
    customer: &'a str,
    #[serde(rename = "customer_id")]
    customer_id: Option<u64>,
    #[serde(rename = "customer_company")]
    customer_company: &'a str,
    date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    status: &'static str,
    items: &'a [InvoiceLineItem],
    #[serde(serialize_with = "wire::amount")]
    subtotal: BigDecimal,
    #[serde(serialize_with = "wire::amount")]
    vat: BigDecimal,
    #[serde(serialize_with = "wire::amount")]
    total: BigDecimal,
}

impl Serialize for InvoiceDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let totals = self.totals();
        InvoiceWire {
            id: self.id,
            number: &self.number,
            customer: &self.customer,
            customer_id: self.customer_id,
            customer_company: &self.customer_company,
            date: self.date,
            due_date: self.due_date,
            status: self.status.as_invoice_label(),
            items: &self.items,
            subtotal: totals.subtotal,
            vat: totals.vat,
            total: totals.total,
        }
        .serialize(serializer)
    }
}

impl Default for InvoiceDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceDocument {
    /// New invoice dated today
    pub fn new() -> Self {
        Self::dated(Local::now().date_naive())
    }

    /// New invoice on the given date, due after the default payment terms,
    /// with one empty line item
    pub fn dated(date: NaiveDate) -> Self {
        Self {
            id: None,
            number: provisional_number(DocumentKind::Invoice),
            customer: String::new(),
            customer_id: None,
            customer_company: String::new(),
            date: Some(date),
            due_date: date.checked_add_days(Days::new(DEFAULT_PAYMENT_TERMS_DAYS)),
            status: DocumentStatus::Draft,
            items: vec![InvoiceLineItem::default()],
        }
    }

    /// Bill a saved customer
    pub fn bill_to(&mut self, customer: &Customer) {
        self.customer = customer.billing_name();
        self.customer_id = customer.id;
        self.customer_company = customer.company.clone();
    }

    /// Append an empty line item
    pub fn add_item(&mut self) {
        self.items.push(InvoiceLineItem::default());
    }

    /// Remove a line item. The last remaining item is kept.
    pub fn remove_item(&mut self, index: usize) -> DeskResult<()> {
        if index >= self.items.len() {
            return Err(DeskError::NotFound(format!(
                "item {} of invoice {}",
                index, self.number
            )));
        }
        if self.items.len() > 1 {
            self.items.remove(index);
        }
        Ok(())
    }

    /// Subtotal, VAT and total for the current items
    pub fn totals(&self) -> InvoiceTotals {
        calculate_totals(&self.items)
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn stage(&self) -> DocumentStage {
        stage_of(self.is_persisted(), self.status)
    }

    /// Header and line-item checks run before submission
    pub fn validate(&self) -> DeskResult<()> {
        if self.customer.trim().is_empty() {
            return Err(DeskError::Validation("Customer is required".to_string()));
        }
        let (Some(date), Some(due_date)) = (self.date, self.due_date) else {
            return Err(DeskError::Validation(
                "Invoice date and due date are required".to_string(),
            ));
        };
        if due_date < date {
            return Err(DeskError::Validation(
                "Due date cannot be before the invoice date".to_string(),
            ));
        }
        validate_line_items(&self.items)
    }

    /// Express the invoice as ledger lines: receivable debit for the total,
    /// revenue credit for the subtotal and VAT payable credit for the VAT
    pub fn ledger_entries(
        &self,
        receivable: impl Into<AccountRef>,
        revenue: impl Into<AccountRef>,
        vat_payable: impl Into<AccountRef>,
    ) -> Vec<LedgerEntry> {
        let totals = self.totals();
        let label = format!("Invoice {}", self.number);
        vec![
            LedgerEntry::debit(receivable, label.clone(), totals.total),
            LedgerEntry::credit(revenue, label.clone(), totals.subtotal),
            LedgerEntry::credit(vat_payable, format!("VAT on {}", label), totals.vat),
        ]
    }
}

/// Invoice list and summary as the backend reports them after a change
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceBook {
    pub invoices: Vec<InvoiceDocument>,
    pub summary: InvoiceSummary,
}

/// Invoice manager for submitting invoices and recording payments
pub struct InvoiceManager<B: Backend> {
    backend: B,
}

impl<B: Backend> InvoiceManager<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Fetch the invoice list and summary
    pub async fn refresh(&self) -> DeskResult<InvoiceBook> {
        Ok(InvoiceBook {
            invoices: self.backend.list_invoices().await?,
            summary: self.backend.invoice_summary().await?,
        })
    }

    /// Find an invoice by id
    pub async fn get(&self, invoice_id: u64) -> DeskResult<InvoiceDocument> {
        self.backend
            .list_invoices()
            .await?
            .into_iter()
            .find(|i| i.id == Some(invoice_id))
            .ok_or_else(|| DeskError::NotFound(format!("invoice {}", invoice_id)))
    }

    /// Create or update an invoice, then fetch the list and summary again
    pub async fn submit(&mut self, invoice: &InvoiceDocument) -> DeskResult<(InvoiceDocument, InvoiceBook)> {
        invoice.validate().inspect_err(|err| {
            info!(
                target: "bizdesk::submit",
                number = %invoice.number,
                error = %err,
                "invoice rejected before submission"
            );
        })?;

        let saved = match invoice.id {
            Some(id) => {
                debug!(number = %invoice.number, id, "updating invoice");
                self.backend.edit_invoice(invoice).await?;
                invoice.clone()
            }
            None => {
                debug!(number = %invoice.number, "creating invoice");
                self.backend.add_invoice(invoice).await?
            }
        };

        let book = self.refresh().await?;
        let record = book
            .invoices
            .iter()
            .find(|i| saved.id.is_some() && i.id == saved.id)
            .cloned()
            .unwrap_or(saved);
        Ok((record, book))
    }

    /// Move a draft invoice to sent
    pub async fn mark_sent(&mut self, invoice_id: u64) -> DeskResult<InvoiceBook> {
        let invoice = self.get(invoice_id).await?;
        DocumentKind::Invoice.check_transition(invoice.status, DocumentStatus::Sent)?;
        self.backend.mark_invoice_sent(invoice_id).await?;
        self.refresh().await
    }

    /// Mark an outstanding invoice as paid
    pub async fn mark_paid(&mut self, invoice_id: u64) -> DeskResult<InvoiceBook> {
        let invoice = self.get(invoice_id).await?;
        DocumentKind::Invoice.check_transition(invoice.status, DocumentStatus::Paid)?;
        self.backend.mark_invoice_paid(invoice_id).await?;
        self.refresh().await
    }

    /// Record a payment against an outstanding invoice. The backend marks the
    /// invoice paid as part of the same call.
    pub async fn record_payment(&mut self, payment: &Payment) -> DeskResult<(Payment, InvoiceBook)> {
        payment.validate()?;
        let invoice = self.get(payment.invoice_id).await?;
        DocumentKind::Invoice.check_transition(invoice.status, DocumentStatus::Paid)?;

        let mut payment = payment.clone();
        if payment.invoice_number.is_empty() {
            payment.invoice_number = invoice.number.clone();
        }
        if payment.customer.is_empty() {
            payment.customer = invoice.customer.clone();
        }

        let saved = self.backend.add_payment(&payment).await?;
        Ok((saved, self.refresh().await?))
    }

    /// Delete an invoice
    pub async fn delete(&mut self, invoice_id: u64) -> DeskResult<InvoiceBook> {
        self.backend.delete_invoice(invoice_id).await?;
        self.refresh().await
    }

    /// Recorded payments
    pub async fn payments(&self) -> DeskResult<Vec<Payment>> {
        self.backend.list_payments().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::balance::calculate_balance;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn sample() -> InvoiceDocument {
        let mut invoice = InvoiceDocument::dated(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        invoice.customer = "Gulf Trading - Omar Haddad".to_string();
        invoice.items = vec![
            InvoiceLineItem::new("Consulting", dec("2"), dec("100")),
            InvoiceLineItem::new("Setup", dec("1"), dec("50")),
        ];
        invoice
    }

    #[test]
    fn test_new_invoice_defaults() {
        let invoice = InvoiceDocument::dated(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2024, 2, 9));
        assert_eq!(invoice.status, DocumentStatus::Draft);
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].quantity, dec("1"));
        assert_eq!(invoice.items[0].price, dec("0"));
        assert!(invoice.number.starts_with("INV-"));
        assert_eq!(invoice.stage(), DocumentStage::Unsaved);
    }

    #[test]
    fn test_payload_carries_derived_totals() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["subtotal"], 250.0);
        assert_eq!(json["vat"], 12.5);
        assert_eq!(json["total"], 262.5);
        assert!(json["items"][0]["amount"].is_number());
        assert!(json["items"][0]["price"].is_number());
        assert_eq!(json["status"], "draft");
        assert_eq!(json["dueDate"], "2024-02-09");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_reads_backend_invoice() {
        let invoice: InvoiceDocument = serde_json::from_value(serde_json::json!({
            "id": 4,
            "number": "INV-0004",
            "customer": "Walk-in",
            "customer_id": "custom",
            "date": "2024-01-10",
            "dueDate": "",
            "status": "overdue",
            "items": [{ "description": "Bolts", "quantity": "10", "price": 2, "amount": 20 }],
            "subtotal": 999
        }))
        .unwrap();

        assert_eq!(invoice.customer_id, None);
        assert_eq!(invoice.due_date, None);
        assert_eq!(invoice.status, DocumentStatus::Overdue);
        assert_eq!(invoice.totals().subtotal, dec("20"));
        assert!(invoice.validate().is_err());
    }

    #[test]
    fn test_validation() {
        assert!(sample().validate().is_ok());

        let mut no_customer = sample();
        no_customer.customer = " ".to_string();
        assert!(matches!(no_customer.validate(), Err(DeskError::Validation(_))));

        let mut bad_item = sample();
        bad_item.items[1].set_quantity("0");
        assert!(matches!(
            bad_item.validate(),
            Err(DeskError::InvalidLineItem { line: 1, .. })
        ));
    }

    #[test]
    fn test_ledger_entries_balance() {
        let entries = sample().ledger_entries("1200", "4000", "2200");
        let summary = calculate_balance(&entries);
        assert!(summary.is_balanced);
        assert_eq!(summary.total_debits, dec("262.5"));
    }

    #[test]
    fn test_remove_item_keeps_last() {
        let mut invoice = sample();
        invoice.remove_item(0).unwrap();
        invoice.remove_item(0).unwrap();
        assert_eq!(invoice.items.len(), 1);
        assert!(invoice.remove_item(5).is_err());
    }
}
