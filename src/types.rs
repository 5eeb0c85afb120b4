//! Core types and data structures for the desk

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::utils::lenient;
use crate::utils::wire::{self, DocumentNumber};

/// Currency every document is assumed to be in
pub const DEFAULT_CURRENCY: &str = "AED";

/// Account types following standard accounting principles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Assets - what the business owns (Cash, Inventory, Equipment, etc.)
    Asset,
    /// Liabilities - what the business owes (Loans, Accounts Payable, VAT Payable, etc.)
    Liability,
    /// Equity - owner's interest in the business (Capital, Retained Earnings, etc.)
    Equity,
    /// Income/Revenue - money earned by the business
    Income,
    /// Expenses - costs incurred by the business
    Expense,
}

impl AccountType {
    pub const ALL: [AccountType; 5] = [
        AccountType::Asset,
        AccountType::Liability,
        AccountType::Equity,
        AccountType::Income,
        AccountType::Expense,
    ];
}

/// Entry in the chart of accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAccount {
    /// Backend identifier; `None` until saved
    #[serde(default)]
    pub id: Option<u64>,
    /// Numeric account code such as `1000`
    #[serde(deserialize_with = "lenient::text")]
    pub account_code: String,
    pub account_name: String,
    pub account_type: AccountType,
    #[serde(default)]
    pub description: String,
    /// Sent as a bool; the backend stores and returns `"Yes"` / `"No"`
    #[serde(default, deserialize_with = "lenient::yes_no")]
    pub vat_applicable: bool,
}

impl ChartAccount {
    /// Create an unsaved account
    pub fn new(
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            id: None,
            account_code: account_code.into(),
            account_name: account_name.into(),
            account_type,
            description: String::new(),
            vat_applicable: false,
        }
    }

    /// Mark the account as VAT applicable
    pub fn with_vat(mut self) -> Self {
        self.vat_applicable = true;
        self
    }

    /// Reference used by ledger lines
    pub fn reference(&self) -> AccountRef {
        AccountRef::new(self.account_code.clone())
    }
}

/// Side of a ledger line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntrySide {
    Debit,
    Credit,
}

impl EntrySide {
    pub fn opposite(self) -> Self {
        match self {
            EntrySide::Debit => EntrySide::Credit,
            EntrySide::Credit => EntrySide::Debit,
        }
    }
}

/// Reference to an account in the chart of accounts.
///
/// Documents carry whatever the account picker produced, usually an account
/// code or slug such as `office-supplies`. An empty reference means the user
/// has not picked an account yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountRef(pub String);

impl AccountRef {
    pub fn new(account: impl Into<String>) -> Self {
        Self(account.into())
    }

    /// Whether no account has been selected
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccountRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single line of a journal, expense or invoice posting
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Account being affected
    #[serde(default)]
    pub account: AccountRef,
    /// Free-text line description
    #[serde(default)]
    pub description: String,
    /// Debit amount, zero when the line is a credit
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        serialize_with = "wire::amount"
    )]
    pub debit: BigDecimal,
    /// Credit amount, zero when the line is a debit
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        serialize_with = "wire::amount"
    )]
    pub credit: BigDecimal,
}

impl LedgerEntry {
    /// Create a blank line, as added by the "add line" action
    pub fn blank() -> Self {
        Self::default()
    }

    /// Create a debit line
    pub fn debit(
        account: impl Into<AccountRef>,
        description: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            account: account.into(),
            description: description.into(),
            debit: amount,
            credit: BigDecimal::from(0),
        }
    }

    /// Create a credit line
    pub fn credit(
        account: impl Into<AccountRef>,
        description: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            account: account.into(),
            description: description.into(),
            debit: BigDecimal::from(0),
            credit: amount,
        }
    }

    /// Amount on the given side
    pub fn amount(&self, side: EntrySide) -> &BigDecimal {
        match side {
            EntrySide::Debit => &self.debit,
            EntrySide::Credit => &self.credit,
        }
    }

    /// At most one side carries a non-zero amount
    pub fn is_well_formed(&self) -> bool {
        let zero = BigDecimal::from(0);
        self.debit == zero || self.credit == zero
    }
}

/// Kind of ledger-backed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Journal,
    Expense,
    Invoice,
}

impl DocumentKind {
    /// Prefix used for provisional and display numbers
    pub fn number_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Journal => "JRN",
            DocumentKind::Expense => "EXP",
            DocumentKind::Invoice => "INV",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Journal => "journal",
            DocumentKind::Expense => "expense",
            DocumentKind::Invoice => "invoice",
        };
        f.write_str(name)
    }
}

/// Document status.
///
/// Journals and expenses use capitalised names on the wire (`Draft`, `Posted`)
/// while invoices use lowercase (`draft`, `sent`), so both spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DocumentStatus {
    #[default]
    #[serde(alias = "draft")]
    Draft,
    #[serde(alias = "posted")]
    Posted,
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "sent")]
    Sent,
    #[serde(alias = "overdue")]
    Overdue,
    #[serde(alias = "paid")]
    Paid,
    #[serde(alias = "reversed")]
    Reversed,
    #[serde(alias = "cancelled")]
    Cancelled,
}

impl DocumentStatus {
    /// No transition leaves this status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Paid | DocumentStatus::Reversed | DocumentStatus::Cancelled
        )
    }

    /// Lowercase wire label used by the invoice endpoints
    pub fn as_invoice_label(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Posted => "posted",
            DocumentStatus::Pending => "pending",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Overdue => "overdue",
            DocumentStatus::Paid => "paid",
            DocumentStatus::Reversed => "reversed",
            DocumentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// File attached to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
}

/// Vendor details captured on an expense
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpenseVendor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub phone: String,
}

/// Journal or expense document: an ordered set of ledger lines plus header fields.
///
/// Journals travel as `journalNumber` / `entries`, expenses as `expenseNumber`
/// / `accountingEntries` with the vendor flattened into `vendor`,
/// `vendorContact` and `vendorPhone`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "DocumentRecord")]
pub struct LedgerDocument {
    /// Backend identifier; `None` until the backend accepts the document
    pub id: Option<u64>,
    pub kind: DocumentKind,
    /// Display number, provisional until the backend assigns one
    pub number: String,
    pub date: NaiveDate,
    pub currency: String,
    pub entries: Vec<LedgerEntry>,
    pub status: DocumentStatus,
    pub notes: String,
    pub attachments: Vec<Attachment>,
    /// Only set on expenses
    pub vendor: Option<ExpenseVendor>,
}

/// Vendor as stored on an expense: usually just the name, with contact and
/// phone in sibling fields
#[derive(Deserialize)]
#[serde(untagged)]
enum VendorField {
    Name(String),
    Details(ExpenseVendor),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRecord {
    #[serde(default)]
    id: Option<u64>,
    kind: DocumentKind,
    #[serde(
        alias = "journalNumber",
        alias = "expenseNumber",
        deserialize_with = "lenient::text"
    )]
    number: String,
    #[serde(deserialize_with = "lenient::required_date")]
    date: NaiveDate,
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default, alias = "accountingEntries")]
    entries: Vec<LedgerEntry>,
    #[serde(default)]
    status: DocumentStatus,
    #[serde(default, deserialize_with = "lenient::text")]
    notes: String,
    #[serde(default)]
    attachments: Vec<Attachment>,
    #[serde(default)]
    vendor: Option<VendorField>,
    #[serde(default, deserialize_with = "lenient::text")]
    vendor_contact: String,
    #[serde(default, deserialize_with = "lenient::text")]
    vendor_phone: String,
}

impl From<DocumentRecord> for LedgerDocument {
    fn from(record: DocumentRecord) -> Self {
        let mut vendor = match record.vendor {
            Some(VendorField::Name(name)) => Some(ExpenseVendor {
                name,
                ..Default::default()
            }),
            Some(VendorField::Details(details)) => Some(details),
            None => None,
        };
        if !record.vendor_contact.is_empty() || !record.vendor_phone.is_empty() {
            let vendor = vendor.get_or_insert_with(ExpenseVendor::default);
            if vendor.contact.is_empty() {
                vendor.contact = record.vendor_contact;
            }
            if vendor.phone.is_empty() {
                vendor.phone = record.vendor_phone;
            }
        }

        Self {
            id: record.id,
            kind: record.kind,
            number: record.number,
            date: record.date,
            currency: record.currency,
            entries: record.entries,
            status: record.status,
            notes: record.notes,
            attachments: record.attachments,
            vendor,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    kind: DocumentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    journal_number: Option<DocumentNumber<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expense_number: Option<DocumentNumber<'a>>,
    date: NaiveDate,
    currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<&'a [LedgerEntry]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accounting_entries: Option<&'a [LedgerEntry]>,
    status: DocumentStatus,
    notes: &'a str,
    attachments: &'a [Attachment],
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor_contact: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor_phone: Option<&'a str>,
}

impl Serialize for LedgerDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let number = Some(DocumentNumber::from(self.number.as_str()));
        let entries = Some(self.entries.as_slice());
        let expense = self.kind == DocumentKind::Expense;
        let vendor = self.vendor.as_ref();

        DocumentWire {
            id: self.id,
            kind: self.kind,
            journal_number: if expense { None } else { number },
            expense_number: if expense { number } else { None },
            date: self.date,
            currency: &self.currency,
            entries: if expense { None } else { entries },
            accounting_entries: if expense { entries } else { None },
            status: self.status,
            notes: &self.notes,
            attachments: &self.attachments,
            vendor: vendor.map(|v| v.name.as_str()),
            vendor_contact: vendor.map(|v| v.contact.as_str()),
            vendor_phone: vendor.map(|v| v.phone.as_str()),
        }
        .serialize(serializer)
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl LedgerDocument {
    /// Create a client-side draft with a random provisional number and one blank line
    pub fn draft(kind: DocumentKind, date: NaiveDate) -> Self {
        Self {
            id: None,
            kind,
            number: crate::ledger::document::provisional_number(kind),
            date,
            currency: default_currency(),
            entries: vec![LedgerEntry::blank()],
            status: DocumentStatus::Draft,
            notes: String::new(),
            attachments: Vec::new(),
            vendor: None,
        }
    }

    /// Whether the backend has accepted this document
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Outcome of a mutation: the record the backend returned plus the affected
/// collection fetched again afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct Synced<T, C = T> {
    pub record: T,
    pub current: Vec<C>,
}

/// Errors that can occur in the desk
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Entries must balance: debits = {debits}, credits = {credits}, difference = {difference}")]
    Unbalanced {
        debits: BigDecimal,
        credits: BigDecimal,
        difference: BigDecimal,
    },
    #[error("Line {line} has no account selected")]
    MissingAccount { line: usize },
    #[error("Line item {line} is invalid: {reason}")]
    InvalidLineItem { line: usize, reason: String },
    #[error("Cannot move {kind} from {from} to {to}")]
    InvalidTransition {
        kind: DocumentKind,
        from: DocumentStatus,
        to: DocumentStatus,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Could not decode backend response: {0}")]
    Decode(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Navigation state error: {0}")]
    Navigation(String),
}

impl DeskError {
    /// Raised before any network call was made
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            DeskError::Validation(_)
                | DeskError::Unbalanced { .. }
                | DeskError::MissingAccount { .. }
                | DeskError::InvalidLineItem { .. }
                | DeskError::InvalidTransition { .. }
        )
    }
}

/// Result type for desk operations
pub type DeskResult<T> = Result<T, DeskError>;
