//! Journal and expense lifecycle: provisional numbering, status transitions,
//! submission through the backend

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::traits::*;
use crate::types::*;

/// Random four-digit provisional number such as `JRN-0427`.
///
/// Only meaningful until the backend accepts the document and assigns its own.
pub fn provisional_number(kind: DocumentKind) -> String {
    let digits = uuid::Uuid::new_v4().as_u128() % 10_000;
    format!("{}-{:04}", kind.number_prefix(), digits)
}

impl DocumentKind {
    /// Whether a document of this kind may move from `from` to `to`
    pub fn allows(&self, from: DocumentStatus, to: DocumentStatus) -> bool {
        use DocumentStatus::*;
        match self {
            DocumentKind::Journal => matches!(
                (from, to),
                (Draft, Posted) | (Draft, Cancelled) | (Posted, Reversed)
            ),
            DocumentKind::Expense => matches!((from, to), (Draft, Posted) | (Draft, Cancelled)),
            DocumentKind::Invoice => matches!(
                (from, to),
                (Draft, Sent) | (Sent, Paid) | (Pending, Paid) | (Overdue, Paid)
            ),
        }
    }

    /// Check a transition, returning the matching error when it is not allowed
    pub fn check_transition(&self, from: DocumentStatus, to: DocumentStatus) -> DeskResult<()> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(DeskError::InvalidTransition {
                kind: *self,
                from,
                to,
            })
        }
    }
}

/// Where a document is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStage {
    /// Client-side only, carries a provisional number
    Unsaved,
    /// Accepted by the backend, still editable
    Submitted,
    /// Posted, sent or otherwise moved on by an explicit action
    Advanced,
    /// No further transitions
    Closed,
}

/// Stage for a persisted flag and a status.
///
/// `Paid` is terminal for invoices, so a paid invoice is `Closed` rather than
/// `Advanced` like `Sent` or `Posted`.
pub fn stage_of(persisted: bool, status: DocumentStatus) -> DocumentStage {
    if !persisted {
        return DocumentStage::Unsaved;
    }
    match status {
        DocumentStatus::Draft | DocumentStatus::Pending => DocumentStage::Submitted,
        s if s.is_terminal() => DocumentStage::Closed,
        _ => DocumentStage::Advanced,
    }
}

impl LedgerDocument {
    /// Current stage of the document
    pub fn stage(&self) -> DocumentStage {
        stage_of(self.is_persisted(), self.status)
    }
}

/// Document manager for journal and expense operations
pub struct DocumentManager<B: Backend> {
    backend: B,
    validator: Box<dyn DocumentValidator>,
}

impl<B: Backend> DocumentManager<B> {
    /// Create a new document manager
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            validator: Box::new(DefaultDocumentValidator),
        }
    }

    /// Create a new document manager with custom validator
    pub fn with_validator(backend: B, validator: Box<dyn DocumentValidator>) -> Self {
        Self { backend, validator }
    }

    /// Run local validation, logging the rejection
    pub fn validate(&self, document: &LedgerDocument) -> DeskResult<()> {
        self.validator.validate_document(document).inspect_err(|err| {
            info!(
                target: "bizdesk::submit",
                kind = %document.kind,
                number = %document.number,
                error = %err,
                "document rejected before submission"
            );
        })
    }

    /// Submit a document: create it when unsaved, update it otherwise.
    ///
    /// Nothing reaches the backend unless local validation passes. A new
    /// document still carrying its provisional number is sent with the next
    /// number the backend reports. On success the document list of the same
    /// kind is fetched again.
    pub async fn submit(&mut self, document: &LedgerDocument) -> DeskResult<Synced<LedgerDocument>> {
        self.validate(document)?;

        let saved = if document.is_persisted() {
            debug!(kind = %document.kind, number = %document.number, "updating document");
            self.backend.update_document(document).await?
        } else {
            let mut fresh = document.clone();
            if fresh.number.trim().parse::<u64>().is_err() {
                fresh.number = self.next_number(document.kind).await?.to_string();
            }
            debug!(kind = %fresh.kind, number = %fresh.number, "creating document");
            self.backend.create_document(&fresh).await?
        };

        let current = self.backend.list_documents(document.kind).await?;
        Ok(Synced {
            record: saved,
            current,
        })
    }

    /// Move a saved document to a new status.
    ///
    /// Leaving `Draft` re-runs the balance rules. The caller's document is left
    /// untouched; the updated copy comes back in the result.
    pub async fn transition(
        &mut self,
        document: &LedgerDocument,
        to: DocumentStatus,
    ) -> DeskResult<Synced<LedgerDocument>> {
        if !document.is_persisted() {
            return Err(DeskError::Validation(format!(
                "{} {} must be saved before changing its status",
                document.kind, document.number
            )));
        }

        document.kind.check_transition(document.status, to)?;
        if document.status == DocumentStatus::Draft {
            self.validate(document)?;
        }

        let mut updated = document.clone();
        updated.status = to;
        debug!(kind = %document.kind, number = %document.number, from = %document.status, to = %to, "changing status");
        let saved = self.backend.update_document(&updated).await?;

        let current = self.backend.list_documents(document.kind).await?;
        Ok(Synced {
            record: saved,
            current,
        })
    }

    /// List documents of one kind
    pub async fn list(&self, kind: DocumentKind) -> DeskResult<Vec<LedgerDocument>> {
        self.backend.list_documents(kind).await
    }

    /// Next number the backend will accept for a kind
    pub async fn next_number(&self, kind: DocumentKind) -> DeskResult<u64> {
        let last = self.backend.last_document_number(kind).await?;
        last.checked_add(1)
            .ok_or_else(|| DeskError::Decode(format!("last {} number {} has no successor", kind, last)))
    }
}

/// Builder for journals and expenses
#[derive(Debug)]
pub struct DocumentBuilder {
    document: LedgerDocument,
}

impl DocumentBuilder {
    /// Start a draft with no lines
    pub fn new(kind: DocumentKind, date: NaiveDate) -> Self {
        let mut document = LedgerDocument::draft(kind, date);
        document.entries.clear();
        Self { document }
    }

    /// Set the display number
    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.document.number = number.into();
        self
    }

    /// Set the currency
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.document.currency = currency.into();
        self
    }

    /// Set the notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.document.notes = notes.into();
        self
    }

    /// Attach vendor details (expenses)
    pub fn vendor(mut self, vendor: ExpenseVendor) -> Self {
        self.document.vendor = Some(vendor);
        self
    }

    /// Add an attachment record
    pub fn attachment(mut self, name: impl Into<String>, size: u64) -> Self {
        self.document.attachments.push(Attachment {
            name: name.into(),
            size,
        });
        self
    }

    /// Add a debit line
    pub fn debit(
        mut self,
        account: impl Into<AccountRef>,
        description: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        self.document
            .entries
            .push(LedgerEntry::debit(account, description, amount));
        self
    }

    /// Add a credit line
    pub fn credit(
        mut self,
        account: impl Into<AccountRef>,
        description: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        self.document
            .entries
            .push(LedgerEntry::credit(account, description, amount));
        self
    }

    /// Add a prepared line
    pub fn entry(mut self, entry: LedgerEntry) -> Self {
        self.document.entries.push(entry);
        self
    }

    /// Build the draft, checking the default balance rules
    pub fn build(self) -> DeskResult<LedgerDocument> {
        DefaultDocumentValidator.validate_document(&self.document)?;
        Ok(self.document)
    }
}

/// Common journal and expense patterns
pub mod patterns {
    use super::*;

    /// Expense paid in cash (debit expense, credit cash)
    pub fn expense_payment(
        date: NaiveDate,
        vendor: ExpenseVendor,
        expense_account: impl Into<AccountRef>,
        cash_account: impl Into<AccountRef>,
        description: &str,
        amount: BigDecimal,
    ) -> DeskResult<LedgerDocument> {
        DocumentBuilder::new(DocumentKind::Expense, date)
            .vendor(vendor)
            .debit(expense_account, description, amount.clone())
            .credit(cash_account, "Payment", amount)
            .build()
    }

    /// Monthly depreciation (debit depreciation expense, credit accumulated depreciation)
    pub fn depreciation(
        date: NaiveDate,
        expense_account: impl Into<AccountRef>,
        accumulated_account: impl Into<AccountRef>,
        amount: BigDecimal,
    ) -> DeskResult<LedgerDocument> {
        DocumentBuilder::new(DocumentKind::Journal, date)
            .notes("Equipment depreciation")
            .debit(expense_account, "Monthly depreciation", amount.clone())
            .credit(accumulated_account, "Accumulated depreciation", amount)
            .build()
    }

    /// Transfer between two bank or cash accounts
    pub fn transfer(
        date: NaiveDate,
        to_account: impl Into<AccountRef>,
        from_account: impl Into<AccountRef>,
        amount: BigDecimal,
    ) -> DeskResult<LedgerDocument> {
        DocumentBuilder::new(DocumentKind::Journal, date)
            .notes("Intercompany transfer")
            .debit(to_account, "Transfer in", amount.clone())
            .credit(from_account, "Transfer out", amount)
            .build()
    }

    /// Owner puts cash into the business
    pub fn owner_investment(
        date: NaiveDate,
        cash_account: impl Into<AccountRef>,
        equity_account: impl Into<AccountRef>,
        amount: BigDecimal,
    ) -> DeskResult<LedgerDocument> {
        DocumentBuilder::new(DocumentKind::Journal, date)
            .debit(cash_account, "Cash invested by owner", amount.clone())
            .credit(equity_account, "Owner's equity contribution", amount)
            .build()
    }
}
