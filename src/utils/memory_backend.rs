//! In-memory backend implementation for testing

use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use crate::crm::*;
use crate::ledger::invoice::InvoiceDocument;
use crate::reports::{DashboardMetrics, InvoiceSummary};
use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct State {
    leads: Vec<Lead>,
    customers: Vec<Customer>,
    vendors: Vec<Vendor>,
    invoices: Vec<InvoiceDocument>,
    payments: Vec<Payment>,
    accounts: Vec<ChartAccount>,
    journals: Vec<LedgerDocument>,
    expenses: Vec<LedgerDocument>,
    calls: usize,
    failure: Option<(u16, String)>,
}

impl State {
    fn documents(&self, kind: DocumentKind) -> DeskResult<&Vec<LedgerDocument>> {
        match kind {
            DocumentKind::Journal => Ok(&self.journals),
            DocumentKind::Expense => Ok(&self.expenses),
            DocumentKind::Invoice => Err(unsupported_kind()),
        }
    }

    fn documents_mut(&mut self, kind: DocumentKind) -> DeskResult<&mut Vec<LedgerDocument>> {
        match kind {
            DocumentKind::Journal => Ok(&mut self.journals),
            DocumentKind::Expense => Ok(&mut self.expenses),
            DocumentKind::Invoice => Err(unsupported_kind()),
        }
    }

    /// Count the call and hand back a queued failure, if any
    fn begin(&mut self) -> DeskResult<()> {
        self.calls += 1;
        match self.failure.take() {
            Some((status, message)) => Err(DeskError::Backend { status, message }),
            None => Ok(()),
        }
    }
}

fn unsupported_kind() -> DeskError {
    DeskError::Validation("invoices are not ledger documents".to_string())
}

fn next_id(ids: impl Iterator<Item = Option<u64>>) -> u64 {
    ids.flatten().max().unwrap_or(0) + 1
}

fn numeric_suffix(number: &str) -> Option<u64> {
    number.rsplit('-').next()?.parse().ok()
}

/// In-memory stand-in for the REST backend.
///
/// Mirrors the backend's bookkeeping side effects: ids are `max + 1`,
/// invoices get an `INV-dddd` number, payments mark their invoice paid, and
/// converting a lead creates a customer and marks the lead won. Clones share
/// the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<RwLock<State>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> DeskResult<()> {
        *self.write()? = State::default();
        Ok(())
    }

    /// Number of backend calls made so far
    pub fn calls(&self) -> usize {
        self.state.read().map(|s| s.calls).unwrap_or(0)
    }

    /// Make the next call fail with the given status
    pub fn fail_next(&self, status: u16, message: impl Into<String>) -> DeskResult<()> {
        self.write()?.failure = Some((status, message.into()));
        Ok(())
    }

    fn write(&self) -> DeskResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| DeskError::Backend {
                status: 500,
                message: "memory backend lock poisoned".to_string(),
            })
    }

    /// Take the write lock for one counted call
    fn call(&self) -> DeskResult<RwLockWriteGuard<'_, State>> {
        let mut state = self.write()?;
        state.begin()?;
        Ok(state)
    }
}

fn not_found(what: &str, id: u64) -> DeskError {
    DeskError::NotFound(format!("{} {}", what, id))
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list_leads(&self) -> DeskResult<Vec<Lead>> {
        Ok(self.call()?.leads.clone())
    }

    async fn add_lead(&mut self, lead: &Lead) -> DeskResult<Lead> {
        let mut state = self.call()?;
        let mut lead = lead.clone();
        lead.id = Some(next_id(state.leads.iter().map(|l| l.id)));
        state.leads.push(lead.clone());
        Ok(lead)
    }

    async fn edit_lead(&mut self, lead: &Lead) -> DeskResult<()> {
        let mut state = self.call()?;
        let id = lead.id.unwrap_or_default();
        let slot = state
            .leads
            .iter_mut()
            .find(|l| l.id == lead.id)
            .ok_or_else(|| not_found("lead", id))?;
        *slot = lead.clone();
        Ok(())
    }

    async fn delete_lead(&mut self, lead_id: u64) -> DeskResult<()> {
        let mut state = self.call()?;
        let before = state.leads.len();
        state.leads.retain(|l| l.id != Some(lead_id));
        if state.leads.len() == before {
            return Err(not_found("lead", lead_id));
        }
        Ok(())
    }

    async fn convert_lead(&mut self, lead_id: u64) -> DeskResult<Customer> {
        let mut state = self.call()?;
        let lead = state
            .leads
            .iter_mut()
            .find(|l| l.id == Some(lead_id))
            .ok_or_else(|| not_found("lead", lead_id))?;
        lead.status = LeadStatus::Won;

        let mut customer = Customer::from_lead(lead, chrono::Local::now().date_naive());
        customer.id = Some(next_id(state.customers.iter().map(|c| c.id)));
        state.customers.push(customer.clone());
        Ok(customer)
    }

    async fn list_customers(&self) -> DeskResult<Vec<Customer>> {
        Ok(self.call()?.customers.clone())
    }

    async fn add_customer(&mut self, customer: &Customer) -> DeskResult<Customer> {
        let mut state = self.call()?;
        let mut customer = customer.clone();
        customer.id = Some(next_id(state.customers.iter().map(|c| c.id)));
        state.customers.push(customer.clone());
        Ok(customer)
    }

    async fn edit_customer(&mut self, customer: &Customer) -> DeskResult<()> {
        let mut state = self.call()?;
        let id = customer.id.unwrap_or_default();
        let slot = state
            .customers
            .iter_mut()
            .find(|c| c.id == customer.id)
            .ok_or_else(|| not_found("customer", id))?;
        *slot = customer.clone();
        Ok(())
    }

    async fn delete_customer(&mut self, customer_id: u64) -> DeskResult<()> {
        let mut state = self.call()?;
        let before = state.customers.len();
        state.customers.retain(|c| c.id != Some(customer_id));
        if state.customers.len() == before {
            return Err(not_found("customer", customer_id));
        }
        Ok(())
    }

    async fn list_vendors(&self) -> DeskResult<Vec<Vendor>> {
        Ok(self.call()?.vendors.clone())
    }

    async fn add_vendor(&mut self, vendor: &Vendor) -> DeskResult<Vendor> {
        let mut state = self.call()?;
        let mut vendor = vendor.clone();
        vendor.id = Some(next_id(state.vendors.iter().map(|v| v.id)));
        state.vendors.push(vendor.clone());
        Ok(vendor)
    }

    async fn edit_vendor(&mut self, vendor: &Vendor) -> DeskResult<()> {
        let mut state = self.call()?;
        let id = vendor.id.unwrap_or_default();
        let slot = state
            .vendors
            .iter_mut()
            .find(|v| v.id == vendor.id)
            .ok_or_else(|| not_found("vendor", id))?;
        *slot = vendor.clone();
        Ok(())
    }

    async fn delete_vendor(&mut self, vendor_id: u64) -> DeskResult<()> {
        let mut state = self.call()?;
        let before = state.vendors.len();
        state.vendors.retain(|v| v.id != Some(vendor_id));
        if state.vendors.len() == before {
            return Err(not_found("vendor", vendor_id));
        }
        Ok(())
    }

    async fn list_invoices(&self) -> DeskResult<Vec<InvoiceDocument>> {
        Ok(self.call()?.invoices.clone())
    }

    async fn add_invoice(&mut self, invoice: &InvoiceDocument) -> DeskResult<InvoiceDocument> {
        let mut state = self.call()?;
        let mut invoice = invoice.clone();
        invoice.id = Some(next_id(state.invoices.iter().map(|i| i.id)));
        invoice.number = format!("INV-{:04}", state.invoices.len() + 1);

        if let Some(customer) = state
            .customers
            .iter_mut()
            .find(|c| invoice.customer_id.is_some() && c.id == invoice.customer_id)
        {
            customer.invoices.push(CustomerInvoice {
                number: invoice.number.clone(),
                date: invoice.date.map(|d| d.to_string()).unwrap_or_default(),
                amount: invoice.totals().total,
                status: invoice.status,
            });
            customer.total_invoices = customer.invoices.len() as u64;
            customer.total_amount = customer.invoices.iter().map(|i| &i.amount).sum();
        }

        state.invoices.push(invoice.clone());
        Ok(invoice)
    }

    async fn edit_invoice(&mut self, invoice: &InvoiceDocument) -> DeskResult<()> {
        let mut state = self.call()?;
        let id = invoice.id.unwrap_or_default();
        let slot = state
            .invoices
            .iter_mut()
            .find(|i| i.id == invoice.id)
            .ok_or_else(|| not_found("invoice", id))?;
        *slot = invoice.clone();
        Ok(())
    }

    async fn delete_invoice(&mut self, invoice_id: u64) -> DeskResult<()> {
        let mut state = self.call()?;
        let before = state.invoices.len();
        state.invoices.retain(|i| i.id != Some(invoice_id));
        if state.invoices.len() == before {
            return Err(not_found("invoice", invoice_id));
        }
        Ok(())
    }

    async fn mark_invoice_sent(&mut self, invoice_id: u64) -> DeskResult<()> {
        set_invoice_status(&mut *self.call()?, invoice_id, DocumentStatus::Sent)
    }

    async fn mark_invoice_paid(&mut self, invoice_id: u64) -> DeskResult<()> {
        set_invoice_status(&mut *self.call()?, invoice_id, DocumentStatus::Paid)
    }

    async fn invoice_summary(&self) -> DeskResult<InvoiceSummary> {
        Ok(InvoiceSummary::from_invoices(&self.call()?.invoices))
    }

    async fn list_payments(&self) -> DeskResult<Vec<Payment>> {
        Ok(self.call()?.payments.clone())
    }

    async fn add_payment(&mut self, payment: &Payment) -> DeskResult<Payment> {
        let mut state = self.call()?;
        let mut payment = payment.clone();
        payment.id = Some(next_id(state.payments.iter().map(|p| p.id)));
        state.payments.push(payment.clone());

        if let Some(invoice) = state
            .invoices
            .iter_mut()
            .find(|i| i.id == Some(payment.invoice_id))
        {
            invoice.status = DocumentStatus::Paid;
        }
        Ok(payment)
    }

    async fn list_accounts(&self) -> DeskResult<Vec<ChartAccount>> {
        Ok(self.call()?.accounts.clone())
    }

    async fn add_account(&mut self, account: &ChartAccount) -> DeskResult<ChartAccount> {
        let mut state = self.call()?;
        let mut account = account.clone();
        account.id = Some(next_id(state.accounts.iter().map(|a| a.id)));
        state.accounts.push(account.clone());
        Ok(account)
    }

    async fn edit_account(&mut self, account: &ChartAccount) -> DeskResult<ChartAccount> {
        let mut state = self.call()?;
        let id = account.id.unwrap_or_default();
        let slot = state
            .accounts
            .iter_mut()
            .find(|a| a.id == account.id)
            .ok_or_else(|| not_found("account", id))?;
        *slot = account.clone();
        Ok(account.clone())
    }

    async fn delete_account(&mut self, account_id: u64) -> DeskResult<()> {
        let mut state = self.call()?;
        let before = state.accounts.len();
        state.accounts.retain(|a| a.id != Some(account_id));
        if state.accounts.len() == before {
            return Err(not_found("account", account_id));
        }
        Ok(())
    }

    async fn list_documents(&self, kind: DocumentKind) -> DeskResult<Vec<LedgerDocument>> {
        Ok(self.call()?.documents(kind)?.clone())
    }

    async fn create_document(&mut self, document: &LedgerDocument) -> DeskResult<LedgerDocument> {
        let mut state = self.call()?;
        let documents = state.documents_mut(document.kind)?;
        let last = documents
            .iter()
            .filter_map(|d| numeric_suffix(&d.number))
            .max()
            .unwrap_or(0);

        let number = last.checked_add(1).ok_or_else(|| DeskError::Backend {
            status: 500,
            message: format!("{} numbering exhausted", document.kind),
        })?;

        let mut document = document.clone();
        document.id = Some(next_id(documents.iter().map(|d| d.id)));
        document.number = number.to_string();
        documents.push(document.clone());
        Ok(document)
    }

    async fn update_document(&mut self, document: &LedgerDocument) -> DeskResult<LedgerDocument> {
        let mut state = self.call()?;
        let id = document.id.unwrap_or_default();
        let slot = state
            .documents_mut(document.kind)?
            .iter_mut()
            .find(|d| d.id == document.id)
            .ok_or_else(|| not_found(&document.kind.to_string(), id))?;
        *slot = document.clone();
        Ok(document.clone())
    }

    async fn last_document_number(&self, kind: DocumentKind) -> DeskResult<u64> {
        let state = self.call()?;
        Ok(state
            .documents(kind)?
            .iter()
            .filter_map(|d| numeric_suffix(&d.number))
            .max()
            .unwrap_or(0))
    }

    async fn dashboard_metrics(&self) -> DeskResult<DashboardMetrics> {
        let state = self.call()?;
        Ok(DashboardMetrics::compute(
            &state.leads,
            &state.customers,
            &state.invoices,
        ))
    }
}

fn set_invoice_status(state: &mut State, invoice_id: u64, status: DocumentStatus) -> DeskResult<()> {
    let invoice = state
        .invoices
        .iter_mut()
        .find(|i| i.id == Some(invoice_id))
        .ok_or_else(|| not_found("invoice", invoice_id))?;
    invoice.status = status;
    Ok(())
}
