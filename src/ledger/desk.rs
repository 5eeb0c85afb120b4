//! Main desk orchestrator that coordinates CRM records, documents, invoices
//! and the chart of accounts

use tracing::info;

use crate::crm::*;
use crate::ledger::account::AccountManager;
use crate::ledger::document::DocumentManager;
use crate::ledger::expense::ExpenseInput;
use crate::ledger::invoice::{InvoiceBook, InvoiceDocument, InvoiceManager};
use crate::reports::{DashboardMetrics, DocumentStats, VendorStats};
use crate::traits::*;
use crate::types::*;

/// Desk that runs every dashboard operation against one backend.
///
/// Mutations validate locally first, make one backend call, then fetch the
/// affected collection again and return it. Nothing is updated optimistically.
pub struct Desk<B: Backend> {
    backend: B,
    documents: DocumentManager<B>,
    invoices: InvoiceManager<B>,
    accounts: AccountManager<B>,
}

impl<B: Backend + Clone> Desk<B> {
    /// Create a new desk with the default validators
    pub fn new(backend: B) -> Self {
        Self {
            documents: DocumentManager::new(backend.clone()),
            invoices: InvoiceManager::new(backend.clone()),
            accounts: AccountManager::new(backend.clone()),
            backend,
        }
    }

    /// Create a new desk with custom validators
    pub fn with_validators(
        backend: B,
        document_validator: Box<dyn DocumentValidator>,
        account_validator: Box<dyn AccountValidator>,
    ) -> Self {
        Self {
            documents: DocumentManager::with_validator(backend.clone(), document_validator),
            invoices: InvoiceManager::new(backend.clone()),
            accounts: AccountManager::with_validator(backend.clone(), account_validator),
            backend,
        }
    }
}

impl<B: Backend> Desk<B> {
    // Leads
    pub async fn list_leads(&self) -> DeskResult<Vec<Lead>> {
        self.backend.list_leads().await
    }

    /// Add a lead
    pub async fn add_lead(&mut self, lead: &Lead) -> DeskResult<Synced<Lead>> {
        lead.validate()?;
        let record = self.backend.add_lead(lead).await?;
        info!(id = ?record.id, "lead added");
        Ok(Synced {
            record,
            current: self.backend.list_leads().await?,
        })
    }

    /// Update a lead
    pub async fn edit_lead(&mut self, lead: &Lead) -> DeskResult<Vec<Lead>> {
        lead.validate()?;
        require_id(lead.id, "lead")?;
        self.backend.edit_lead(lead).await?;
        self.backend.list_leads().await
    }

    /// Delete a lead
    pub async fn delete_lead(&mut self, lead_id: u64) -> DeskResult<Vec<Lead>> {
        self.backend.delete_lead(lead_id).await?;
        self.backend.list_leads().await
    }

    /// Convert a lead into a customer. The lead is marked won by the backend;
    /// the refreshed customer list comes back with the new customer.
    pub async fn convert_lead(&mut self, lead_id: u64) -> DeskResult<Synced<Customer>> {
        let record = self.backend.convert_lead(lead_id).await?;
        info!(lead_id, customer_id = ?record.id, "lead converted");
        Ok(Synced {
            record,
            current: self.backend.list_customers().await?,
        })
    }

    // Customers
    pub async fn list_customers(&self) -> DeskResult<Vec<Customer>> {
        self.backend.list_customers().await
    }

    /// Add a customer
    pub async fn add_customer(&mut self, customer: &Customer) -> DeskResult<Synced<Customer>> {
        customer.validate()?;
        let record = self.backend.add_customer(customer).await?;
        Ok(Synced {
            record,
            current: self.backend.list_customers().await?,
        })
    }

    /// Update a customer
    pub async fn edit_customer(&mut self, customer: &Customer) -> DeskResult<Vec<Customer>> {
        customer.validate()?;
        require_id(customer.id, "customer")?;
        self.backend.edit_customer(customer).await?;
        self.backend.list_customers().await
    }

    /// Delete a customer
    pub async fn delete_customer(&mut self, customer_id: u64) -> DeskResult<Vec<Customer>> {
        self.backend.delete_customer(customer_id).await?;
        self.backend.list_customers().await
    }

    // Vendors
    pub async fn list_vendors(&self) -> DeskResult<Vec<Vendor>> {
        self.backend.list_vendors().await
    }

    /// Add a vendor
    pub async fn add_vendor(&mut self, vendor: &Vendor) -> DeskResult<Synced<Vendor>> {
        vendor.validate()?;
        let record = self.backend.add_vendor(vendor).await?;
        Ok(Synced {
            record,
            current: self.backend.list_vendors().await?,
        })
    }

    /// Update a vendor
    pub async fn edit_vendor(&mut self, vendor: &Vendor) -> DeskResult<Vec<Vendor>> {
        vendor.validate()?;
        require_id(vendor.id, "vendor")?;
        self.backend.edit_vendor(vendor).await?;
        self.backend.list_vendors().await
    }

    /// Delete a vendor
    pub async fn delete_vendor(&mut self, vendor_id: u64) -> DeskResult<Vec<Vendor>> {
        self.backend.delete_vendor(vendor_id).await?;
        self.backend.list_vendors().await
    }

    pub async fn vendor_stats(&self) -> DeskResult<VendorStats> {
        Ok(VendorStats::from_vendors(&self.backend.list_vendors().await?))
    }

    // Journals and expenses
    /// Submit a manual journal
    pub async fn submit_journal(&mut self, journal: &LedgerDocument) -> DeskResult<Synced<LedgerDocument>> {
        require_kind(journal, DocumentKind::Journal)?;
        self.documents.submit(journal).await
    }

    /// Submit an expense
    pub async fn submit_expense(&mut self, expense: &LedgerDocument) -> DeskResult<Synced<LedgerDocument>> {
        require_kind(expense, DocumentKind::Expense)?;
        self.documents.submit(expense).await
    }

    /// Post an expense entered by category and payment method, with 5% input VAT
    pub async fn record_expense(&mut self, input: &ExpenseInput) -> DeskResult<Synced<LedgerDocument>> {
        let expense = input.to_document().inspect_err(|err| {
            info!(
                target: "bizdesk::submit",
                vendor = %input.vendor.name,
                error = %err,
                "expense input rejected before submission"
            );
        })?;
        self.documents.submit(&expense).await
    }

    /// Move a saved journal or expense to a new status
    pub async fn transition_document(
        &mut self,
        document: &LedgerDocument,
        to: DocumentStatus,
    ) -> DeskResult<Synced<LedgerDocument>> {
        self.documents.transition(document, to).await
    }

    pub async fn list_documents(&self, kind: DocumentKind) -> DeskResult<Vec<LedgerDocument>> {
        self.documents.list(kind).await
    }

    pub async fn document_stats(&self, kind: DocumentKind) -> DeskResult<DocumentStats> {
        Ok(DocumentStats::from_documents(&self.documents.list(kind).await?))
    }

    /// Number the next journal will get: last issued + 1
    pub async fn next_journal_number(&self) -> DeskResult<u64> {
        self.documents.next_number(DocumentKind::Journal).await
    }

    // Invoices and payments
    /// Current invoices and their summary
    pub async fn invoices(&self) -> DeskResult<InvoiceBook> {
        self.invoices.refresh().await
    }

    /// Create or update an invoice
    pub async fn submit_invoice(&mut self, invoice: &InvoiceDocument) -> DeskResult<(InvoiceDocument, InvoiceBook)> {
        self.invoices.submit(invoice).await
    }

    pub async fn mark_invoice_sent(&mut self, invoice_id: u64) -> DeskResult<InvoiceBook> {
        self.invoices.mark_sent(invoice_id).await
    }

    pub async fn mark_invoice_paid(&mut self, invoice_id: u64) -> DeskResult<InvoiceBook> {
        self.invoices.mark_paid(invoice_id).await
    }

    /// Record a payment, which also settles the invoice
    pub async fn record_payment(&mut self, payment: &Payment) -> DeskResult<(Payment, InvoiceBook)> {
        self.invoices.record_payment(payment).await
    }

    pub async fn delete_invoice(&mut self, invoice_id: u64) -> DeskResult<InvoiceBook> {
        self.invoices.delete(invoice_id).await
    }

    pub async fn list_payments(&self) -> DeskResult<Vec<Payment>> {
        self.invoices.payments().await
    }

    // Chart of accounts
    pub async fn list_accounts(&self) -> DeskResult<Vec<ChartAccount>> {
        self.accounts.list_accounts().await
    }

    pub async fn add_account(&mut self, account: &ChartAccount) -> DeskResult<Synced<ChartAccount>> {
        self.accounts.add_account(account).await
    }

    pub async fn edit_account(&mut self, account: &ChartAccount) -> DeskResult<Synced<ChartAccount>> {
        self.accounts.edit_account(account).await
    }

    pub async fn delete_account(&mut self, account_id: u64) -> DeskResult<Vec<ChartAccount>> {
        self.accounts.delete_account(account_id).await
    }

    // Dashboard
    pub async fn dashboard(&self) -> DeskResult<DashboardMetrics> {
        self.backend.dashboard_metrics().await
    }
}

fn require_id(id: Option<u64>, what: &str) -> DeskResult<u64> {
    id.ok_or_else(|| DeskError::Validation(format!("{} must be saved before it can be edited", what)))
}

fn require_kind(document: &LedgerDocument, kind: DocumentKind) -> DeskResult<()> {
    if document.kind != kind {
        return Err(DeskError::Validation(format!(
            "expected a {}, got a {}",
            kind, document.kind
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::expense::*;
    use crate::utils::MemoryBackend;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn desk() -> (Desk<MemoryBackend>, MemoryBackend) {
        let backend = MemoryBackend::new();
        (Desk::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_lead_requires_name_and_company() {
        let (mut desk, backend) = desk();
        let result = desk.add_lead(&Lead::new("Omar", "")).await;
        assert!(matches!(result, Err(DeskError::Validation(_))));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_edit_needs_saved_record() {
        let (mut desk, _) = desk();
        let result = desk.edit_customer(&Customer::new("Sara", "Desert Logistics")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_wrong_kind_is_rejected() {
        let (mut desk, backend) = desk();
        let expense = LedgerDocument::draft(
            DocumentKind::Expense,
            NaiveDate::from_ymd_opt(2024, 1, 18).unwrap(),
        );
        assert!(desk.submit_journal(&expense).await.is_err());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_vendor_stats() {
        let (mut desk, _) = desk();
        let mut vendor = Vendor::new("Sara", "Office Supplies Co.");
        vendor.total_bills = 2;
        vendor.total_amount = BigDecimal::from(480);
        desk.add_vendor(&vendor).await.unwrap();
        desk.add_vendor(&Vendor::new("Ali", "Desert Logistics")).await.unwrap();

        let stats = desk.vendor_stats().await.unwrap();
        assert_eq!(stats.total_vendors, 2);
        assert_eq!(stats.active_vendors, 1);

        let mut idle = desk.list_vendors().await.unwrap()[1].clone();
        idle.phone = "+971 4 555 0199".to_string();
        let vendors = desk.edit_vendor(&idle).await.unwrap();
        assert_eq!(vendors[1].phone, "+971 4 555 0199");

        let vendors = desk.delete_vendor(idle.id.unwrap()).await.unwrap();
        assert_eq!(vendors.len(), 1);
    }

    #[tokio::test]
    async fn test_record_expense_posts_vat() {
        let (mut desk, backend) = desk();
        let vendor = ExpenseVendor {
            name: "Dubai Electricity".to_string(),
            ..Default::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();

        let incomplete = ExpenseInput::new(date, vendor.clone()).amount(BigDecimal::from(100));
        assert!(matches!(
            desk.record_expense(&incomplete).await,
            Err(DeskError::Validation(_))
        ));
        assert_eq!(backend.calls(), 0);

        let input = incomplete
            .category(ExpenseCategory::Utilities)
            .paid_by(ExpensePaymentMethod::Credit);
        let saved = desk.record_expense(&input).await.unwrap();

        assert_eq!(saved.record.number, "1");
        assert_eq!(saved.current.len(), 1);
        let debits: Vec<_> = saved.record.entries.iter().map(|e| e.debit.clone()).collect();
        assert_eq!(
            debits,
            vec![BigDecimal::from(100), BigDecimal::from(5), BigDecimal::from(0)]
        );
        assert_eq!(saved.record.entries[2].account.as_str(), "2000");
        assert_eq!(saved.record.entries[2].credit, BigDecimal::from(105));
    }
}
