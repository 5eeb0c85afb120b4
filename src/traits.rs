//! Traits for the backend collaborator and validation extensibility

use async_trait::async_trait;

use crate::crm::*;
use crate::ledger::balance::calculate_balance;
use crate::ledger::invoice::InvoiceDocument;
use crate::reports::{DashboardMetrics, InvoiceSummary};
use crate::types::*;
use crate::utils::validation::{validate_non_negative_amount, validate_required};

/// Backend collaborator abstraction
///
/// The REST backend is the only durable store. This trait lets the desk work
/// against the real HTTP API ([`crate::client::HttpBackend`]) or an in-memory
/// stand-in ([`crate::utils::MemoryBackend`]) through the same calls.
#[async_trait]
pub trait Backend: Send + Sync {
    // Leads
    /// List all leads
    async fn list_leads(&self) -> DeskResult<Vec<Lead>>;

    /// Add a lead; the backend assigns the id
    async fn add_lead(&mut self, lead: &Lead) -> DeskResult<Lead>;

    /// Replace an existing lead
    async fn edit_lead(&mut self, lead: &Lead) -> DeskResult<()>;

    /// Delete a lead
    async fn delete_lead(&mut self, lead_id: u64) -> DeskResult<()>;

    /// Turn a lead into a customer and mark the lead as won
    async fn convert_lead(&mut self, lead_id: u64) -> DeskResult<Customer>;

    // Customers
    /// List all customers
    async fn list_customers(&self) -> DeskResult<Vec<Customer>>;

    /// Add a customer
    async fn add_customer(&mut self, customer: &Customer) -> DeskResult<Customer>;

    /// Replace an existing customer
    async fn edit_customer(&mut self, customer: &Customer) -> DeskResult<()>;

    /// Delete a customer
    async fn delete_customer(&mut self, customer_id: u64) -> DeskResult<()>;

    // Vendors
    /// List all vendors
    async fn list_vendors(&self) -> DeskResult<Vec<Vendor>>;

    /// Add a vendor
    async fn add_vendor(&mut self, vendor: &Vendor) -> DeskResult<Vendor>;

    /// Replace an existing vendor
    async fn edit_vendor(&mut self, vendor: &Vendor) -> DeskResult<()>;

    /// Delete a vendor
    async fn delete_vendor(&mut self, vendor_id: u64) -> DeskResult<()>;

    // Invoices
    /// List all invoices
    async fn list_invoices(&self) -> DeskResult<Vec<InvoiceDocument>>;

    /// Add an invoice; the backend assigns id and final number
    async fn add_invoice(&mut self, invoice: &InvoiceDocument) -> DeskResult<InvoiceDocument>;

    /// Replace an existing invoice
    async fn edit_invoice(&mut self, invoice: &InvoiceDocument) -> DeskResult<()>;

    /// Delete an invoice
    async fn delete_invoice(&mut self, invoice_id: u64) -> DeskResult<()>;

    /// Move an invoice to `Sent`
    async fn mark_invoice_sent(&mut self, invoice_id: u64) -> DeskResult<()>;

    /// Move an invoice to `Paid`
    async fn mark_invoice_paid(&mut self, invoice_id: u64) -> DeskResult<()>;

    /// Sales / receivables / collected totals
    async fn invoice_summary(&self) -> DeskResult<InvoiceSummary>;

    // Payments
    /// List recorded payments
    async fn list_payments(&self) -> DeskResult<Vec<Payment>>;

    /// Record a payment; the backend marks the invoice paid
    async fn add_payment(&mut self, payment: &Payment) -> DeskResult<Payment>;

    // Chart of accounts
    /// List the chart of accounts
    async fn list_accounts(&self) -> DeskResult<Vec<ChartAccount>>;

    /// Add an account
    async fn add_account(&mut self, account: &ChartAccount) -> DeskResult<ChartAccount>;

    /// Replace an existing account
    async fn edit_account(&mut self, account: &ChartAccount) -> DeskResult<ChartAccount>;

    /// Delete an account
    async fn delete_account(&mut self, account_id: u64) -> DeskResult<()>;

    // Journals and expenses
    /// List documents of one kind
    async fn list_documents(&self, kind: DocumentKind) -> DeskResult<Vec<LedgerDocument>>;

    /// Create a document; the backend assigns the id
    async fn create_document(&mut self, document: &LedgerDocument) -> DeskResult<LedgerDocument>;

    /// Replace an existing document (content or status)
    async fn update_document(&mut self, document: &LedgerDocument) -> DeskResult<LedgerDocument>;

    /// Highest number issued so far for a document kind
    async fn last_document_number(&self, kind: DocumentKind) -> DeskResult<u64>;

    // Dashboard
    /// Aggregated dashboard metrics
    async fn dashboard_metrics(&self) -> DeskResult<DashboardMetrics>;
}

/// Trait for implementing custom journal/expense validation rules
pub trait DocumentValidator: Send + Sync {
    /// Validate a document before it leaves the client
    fn validate_document(&self, document: &LedgerDocument) -> DeskResult<()>;
}

/// Trait for implementing custom chart-of-accounts validation rules
pub trait AccountValidator: Send + Sync {
    /// Validate an account before saving
    fn validate_account(&self, account: &ChartAccount) -> DeskResult<()>;
}

/// Default document validator: every line names an account, no negative
/// amounts, and debits equal credits within the tolerance
pub struct DefaultDocumentValidator;

impl DocumentValidator for DefaultDocumentValidator {
    fn validate_document(&self, document: &LedgerDocument) -> DeskResult<()> {
        let summary = calculate_balance(&document.entries);
        if !summary.is_balanced {
            return Err(DeskError::Unbalanced {
                debits: summary.total_debits,
                credits: summary.total_credits,
                difference: summary.difference,
            });
        }

        if let Some(line) = document.entries.iter().position(|e| e.account.is_empty()) {
            return Err(DeskError::MissingAccount { line });
        }

        for entry in &document.entries {
            validate_non_negative_amount(&entry.debit, "Debit")?;
            validate_non_negative_amount(&entry.credit, "Credit")?;
        }

        Ok(())
    }
}

/// Default account validator: code and name are required
pub struct DefaultAccountValidator;

impl AccountValidator for DefaultAccountValidator {
    fn validate_account(&self, account: &ChartAccount) -> DeskResult<()> {
        validate_required(&account.account_code, "Account code")?;
        validate_required(&account.account_name, "Account name")?;
        Ok(())
    }
}
