//! CRM records: leads, customers, vendors and payments

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::{lenient, wire};
use crate::utils::validation::{parse_date, validate_required};

/// Pipeline status of a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    #[serde(alias = "proposal-sent")]
    Proposal,
    Won,
    Lost,
}

/// Sales lead
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lead {
    pub id: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub company: String,
    pub title: String,
    pub email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: String,
    pub address: String,
    pub source: String,
    pub status: LeadStatus,
    pub added_date: String,
    pub last_contact: String,
    pub industry: String,
    /// Free text such as `"5M-10M"`
    #[serde(deserialize_with = "lenient::text")]
    pub annual_revenue: String,
    pub notes: String,
}

impl Lead {
    /// Create an unsaved lead
    pub fn new(name: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            ..Default::default()
        }
    }

    /// Name and company are required
    pub fn validate(&self) -> DeskResult<()> {
        validate_contact(&self.name, &self.company)
    }
}

/// Invoice reference kept on a customer record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerInvoice {
    pub number: String,
    pub date: String,
    #[serde(deserialize_with = "lenient::amount", serialize_with = "wire::amount")]
    pub amount: BigDecimal,
    pub status: DocumentStatus,
}

/// Customer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub id: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub company: String,
    pub title: String,
    pub email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: String,
    pub address: String,
    /// ISO date or the long form (`November 10, 2025`)
    pub added_date: String,
    pub notes: String,
    pub total_invoices: u64,
    #[serde(deserialize_with = "lenient::amount", serialize_with = "wire::amount")]
    pub total_amount: BigDecimal,
    pub invoices: Vec<CustomerInvoice>,
}

impl Customer {
    /// Create an unsaved customer
    pub fn new(name: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            ..Default::default()
        }
    }

    /// Customer record produced by converting a lead
    pub fn from_lead(lead: &Lead, added_date: NaiveDate) -> Self {
        Self {
            id: None,
            name: lead.name.clone(),
            company: lead.company.clone(),
            title: lead.title.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            address: lead.address.clone(),
            added_date: added_date.format("%B %d, %Y").to_string(),
            notes: format!("Converted from lead. Original notes: {}", lead.notes),
            total_invoices: 0,
            total_amount: BigDecimal::from(0),
            invoices: Vec::new(),
        }
    }

    /// Name shown on invoices: `Company - Name`
    pub fn billing_name(&self) -> String {
        format!("{} - {}", self.company, self.name)
    }

    /// Date the customer was added, when it parses
    pub fn added_on(&self) -> Option<NaiveDate> {
        parse_date(&self.added_date)
    }

    /// Name and company are required
    pub fn validate(&self) -> DeskResult<()> {
        validate_contact(&self.name, &self.company)
    }
}

/// Vendor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vendor {
    pub id: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub company: String,
    pub title: String,
    pub email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: String,
    pub address: String,
    pub added_date: String,
    pub notes: String,
    pub total_bills: u64,
    #[serde(deserialize_with = "lenient::amount", serialize_with = "wire::amount")]
    pub total_amount: BigDecimal,
}

impl Vendor {
    /// Create an unsaved vendor
    pub fn new(name: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            ..Default::default()
        }
    }

    /// A vendor with at least one bill
    pub fn is_active(&self) -> bool {
        self.total_bills > 0
    }

    /// Name and company are required
    pub fn validate(&self) -> DeskResult<()> {
        validate_contact(&self.name, &self.company)
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    BankTransfer,
    Cash,
    Cheque,
    Card,
}

/// Payment received against an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub id: Option<u64>,
    pub invoice_id: u64,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub customer: String,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        serialize_with = "wire::amount"
    )]
    pub amount: BigDecimal,
    #[serde(default)]
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: String,
}

impl Payment {
    /// Create an unsaved bank-transfer payment
    pub fn new(
        invoice_id: u64,
        invoice_number: impl Into<String>,
        date: NaiveDate,
        amount: BigDecimal,
    ) -> Self {
        Self {
            id: None,
            invoice_id,
            invoice_number: invoice_number.into(),
            customer: String::new(),
            date: Some(date),
            amount,
            method: PaymentMethod::default(),
            reference: String::new(),
        }
    }

    /// Amount must be positive and a date is required
    pub fn validate(&self) -> DeskResult<()> {
        if self.date.is_none() {
            return Err(DeskError::Validation("Payment date is required".to_string()));
        }
        if self.amount <= BigDecimal::from(0) {
            return Err(DeskError::Validation(
                "Payment amount must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_contact(name: &str, company: &str) -> DeskResult<()> {
    validate_required(name, "Name")?;
    validate_required(company, "Company")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_reads_backend_payload() {
        let lead: Lead = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Omar Haddad",
            "company": "Gulf Trading",
            "phone": 971501234567u64,
            "status": "proposal-sent",
            "addedDate": "2024-01-02",
            "annualRevenue": 2500000
        }))
        .unwrap();

        assert_eq!(lead.status, LeadStatus::Proposal);
        assert_eq!(lead.phone, "971501234567");
        assert_eq!(lead.annual_revenue, "2500000");
        assert!(lead.validate().is_ok());
    }

    #[test]
    fn test_required_contact_fields() {
        assert!(Lead::new("Omar", " ").validate().is_err());
        assert!(Customer::new("", "Gulf Trading").validate().is_err());
        assert!(Vendor::new("Sara", "Office Supplies Co.").validate().is_ok());
    }

    #[test]
    fn test_customer_from_lead() {
        let mut lead = Lead::new("Omar Haddad", "Gulf Trading");
        lead.notes = "Met at expo".to_string();

        let customer = Customer::from_lead(&lead, NaiveDate::from_ymd_opt(2025, 11, 10).unwrap());
        assert_eq!(customer.notes, "Converted from lead. Original notes: Met at expo");
        assert_eq!(customer.added_date, "November 10, 2025");
        assert_eq!(customer.added_on(), NaiveDate::from_ymd_opt(2025, 11, 10));
        assert_eq!(customer.billing_name(), "Gulf Trading - Omar Haddad");
        assert_eq!(customer.total_invoices, 0);
    }

    #[test]
    fn test_payment_defaults() {
        let payment: Payment = serde_json::from_value(serde_json::json!({
            "invoice_id": 3,
            "invoice_number": "INV-0003",
            "date": "2024-02-01",
            "amount": "262.50"
        }))
        .unwrap();

        assert_eq!(payment.method, PaymentMethod::BankTransfer);
        assert!(payment.validate().is_ok());

        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["method"], "bank_transfer");
        assert_eq!(json["amount"], 262.5);
    }

    #[test]
    fn test_payment_requires_positive_amount() {
        let payment = Payment::new(
            3,
            "INV-0003",
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            BigDecimal::from(0),
        );
        assert!(payment.validate().is_err());
    }
}
