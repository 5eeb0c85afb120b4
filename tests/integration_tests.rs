//! Integration tests for bizdesk-core

use bigdecimal::BigDecimal;
use bizdesk_core::{
    patterns,
    reports::InvoiceSummary,
    utils::{EnhancedAccountValidator, EnhancedDocumentValidator, MemoryBackend},
    AccountType, ChartAccount, Customer, DefaultDocumentValidator, Desk, DeskError,
    DocumentBuilder, DocumentKind, DocumentStage, DocumentStatus, DocumentValidator, EntrySide,
    ExpenseVendor, InvoiceDocument, InvoiceLineItem, Lead, LeadStatus, LedgerDocument, Payment,
};
use chrono::NaiveDate;
use std::str::FromStr;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn setup() -> (Desk<MemoryBackend>, MemoryBackend) {
    let backend = MemoryBackend::new();
    (Desk::new(backend.clone()), backend)
}

#[tokio::test]
async fn test_unbalanced_journal_never_reaches_backend() {
    let (mut desk, backend) = setup();

    let mut journal = LedgerDocument::draft(DocumentKind::Journal, date(15));
    journal.set_account(0, "office-supplies").unwrap();
    journal.set_amount(0, EntrySide::Debit, "150").unwrap();
    journal.add_entry();
    journal.set_account(1, "cash").unwrap();
    journal.set_amount(1, EntrySide::Credit, "100").unwrap();

    let summary = journal.balance();
    assert_eq!(summary.difference, dec("50"));
    assert!(!summary.is_balanced);

    let result = desk.submit_journal(&journal).await;
    assert!(matches!(result, Err(DeskError::Unbalanced { .. })));
    assert_eq!(backend.calls(), 0);
    assert_eq!(journal.stage(), DocumentStage::Unsaved);
}

#[tokio::test]
async fn test_missing_account_never_reaches_backend() {
    let (mut desk, backend) = setup();

    let mut expense = LedgerDocument::draft(DocumentKind::Expense, date(18));
    expense.set_account(0, "office-supplies").unwrap();
    expense.set_amount(0, EntrySide::Debit, "270").unwrap();
    expense.add_entry();
    expense.set_amount(1, EntrySide::Credit, "270").unwrap();

    let err = desk.submit_expense(&expense).await.unwrap_err();
    assert!(matches!(err, DeskError::MissingAccount { line: 1 }));
    assert!(err.is_local());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_journal_lifecycle() {
    let (mut desk, _) = setup();
    assert_eq!(desk.next_journal_number().await.unwrap(), 1);

    let journal =
        patterns::depreciation(date(31), "depreciation", "accumulated-depreciation", dec("500"))
            .unwrap();
    let submitted = desk.submit_journal(&journal).await.unwrap();

    assert_eq!(submitted.current.len(), 1);
    assert_eq!(submitted.record.stage(), DocumentStage::Submitted);
    assert_eq!(submitted.record.number, "1");
    assert_eq!(desk.next_journal_number().await.unwrap(), 2);

    let posted = desk
        .transition_document(&submitted.record, DocumentStatus::Posted)
        .await
        .unwrap();
    assert_eq!(posted.record.status, DocumentStatus::Posted);
    assert_eq!(posted.current[0].status, DocumentStatus::Posted);

    // Posted journals cannot go back to draft
    let back = desk
        .transition_document(&posted.record, DocumentStatus::Draft)
        .await;
    assert!(matches!(back, Err(DeskError::InvalidTransition { .. })));

    let reversed = desk
        .transition_document(&posted.record, DocumentStatus::Reversed)
        .await
        .unwrap();
    assert_eq!(reversed.record.stage(), DocumentStage::Closed);

    let stats = desk.document_stats(DocumentKind::Journal).await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.posted, 0);
    assert_eq!(stats.total_amount, dec("500"));
}

#[tokio::test]
async fn test_exhausted_journal_numbers() {
    let (mut desk, _) = setup();
    let journal =
        patterns::owner_investment(date(2), "1010", "3000", dec("10000")).unwrap();
    let mut saved = desk.submit_journal(&journal).await.unwrap().record;

    saved.number = u64::MAX.to_string();
    desk.submit_journal(&saved).await.unwrap();

    assert!(matches!(
        desk.next_journal_number().await,
        Err(DeskError::Decode(_))
    ));
    assert!(matches!(
        desk.submit_journal(&journal).await,
        Err(DeskError::Decode(_))
    ));
    assert_eq!(desk.list_documents(DocumentKind::Journal).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unsaved_document_cannot_change_status() {
    let (mut desk, backend) = setup();
    let journal = patterns::transfer(date(20), "bank-eur", "bank-usd", dec("2000")).unwrap();

    let result = desk
        .transition_document(&journal, DocumentStatus::Posted)
        .await;
    assert!(result.is_err());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_backend_failure_keeps_document_unsaved() {
    let (mut desk, backend) = setup();
    let expense = patterns::expense_payment(
        date(18),
        ExpenseVendor {
            name: "Office Supplies Co.".to_string(),
            ..Default::default()
        },
        "office-supplies",
        "cash",
        "Printer paper",
        dec("270"),
    )
    .unwrap();

    backend.fail_next(500, "disk full").unwrap();
    let err = desk.submit_expense(&expense).await.unwrap_err();
    assert!(matches!(err, DeskError::Backend { status: 500, .. }));
    assert!(!err.is_local());
    assert!(desk.list_documents(DocumentKind::Expense).await.unwrap().is_empty());

    // Retrying is an explicit second call
    let saved = desk.submit_expense(&expense).await.unwrap();
    assert_eq!(saved.current.len(), 1);
    assert_eq!(saved.record.vendor.as_ref().unwrap().name, "Office Supplies Co.");
}

#[tokio::test]
async fn test_invoice_flow() {
    let (mut desk, _) = setup();
    let customer = desk
        .add_customer(&Customer::new("Omar Haddad", "Gulf Trading"))
        .await
        .unwrap()
        .record;

    let mut invoice = InvoiceDocument::dated(date(10));
    invoice.bill_to(&customer);
    invoice.items[0].description = "Consulting".to_string();
    invoice.items[0].set_quantity("2");
    invoice.items[0].set_price("100");
    invoice.add_item();
    invoice.items[1] = InvoiceLineItem::new("Setup", dec("1"), dec("50"));

    let totals = invoice.totals();
    assert_eq!(totals.subtotal, dec("250"));
    assert_eq!(totals.vat, dec("12.5"));
    assert_eq!(totals.total, dec("262.5"));

    let (saved, book) = desk.submit_invoice(&invoice).await.unwrap();
    let invoice_id = saved.id.unwrap();
    assert_eq!(saved.number, "INV-0001");
    assert_eq!(book.summary.total_receivables, dec("262.50"));

    // Drafts cannot be paid directly
    assert!(matches!(
        desk.mark_invoice_paid(invoice_id).await,
        Err(DeskError::InvalidTransition { .. })
    ));

    let book = desk.mark_invoice_sent(invoice_id).await.unwrap();
    assert_eq!(book.invoices[0].status, DocumentStatus::Sent);

    let payment = Payment::new(invoice_id, "", date(25), dec("262.50"));
    let (payment, book) = desk.record_payment(&payment).await.unwrap();
    assert_eq!(payment.invoice_number, "INV-0001");
    assert_eq!(payment.customer, "Gulf Trading - Omar Haddad");
    assert_eq!(book.invoices[0].status, DocumentStatus::Paid);
    assert_eq!(
        book.summary,
        InvoiceSummary {
            total_sales: dec("262.50"),
            total_receivables: dec("0"),
            total_cash_collected: dec("262.50"),
        }
    );

    let customers = desk.list_customers().await.unwrap();
    assert_eq!(customers[0].total_invoices, 1);
    assert_eq!(customers[0].total_amount, dec("262.5"));
}

#[tokio::test]
async fn test_invalid_invoice_is_rejected_locally() {
    let (mut desk, backend) = setup();
    let mut invoice = InvoiceDocument::dated(date(10));
    invoice.customer = "Walk-in".to_string();

    let err = desk.submit_invoice(&invoice).await.unwrap_err();
    assert!(matches!(err, DeskError::InvalidLineItem { line: 0, .. }));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_invoice_as_ledger_entries() {
    let mut invoice = InvoiceDocument::dated(date(10));
    invoice.items = vec![InvoiceLineItem::new("Bolts", dec("10"), dec("22"))];

    let journal = invoice
        .ledger_entries("1200", "4000", "2200")
        .into_iter()
        .fold(
            DocumentBuilder::new(DocumentKind::Journal, date(10))
                .notes(format!("Posting for {}", invoice.number)),
            |builder, entry| builder.entry(entry),
        )
        .build()
        .unwrap();

    let summary = journal.balance();
    assert!(summary.is_balanced);
    assert_eq!(summary.total_debits, dec("231"));
}

#[tokio::test]
async fn test_lead_conversion_and_dashboard() {
    let (mut desk, _) = setup();

    let mut lead = Lead::new("Omar Haddad", "Gulf Trading");
    lead.notes = "Met at expo".to_string();
    let lead = desk.add_lead(&lead).await.unwrap().record;
    desk.add_lead(&Lead::new("Sara Khan", "Desert Logistics"))
        .await
        .unwrap();

    let converted = desk.convert_lead(lead.id.unwrap()).await.unwrap();
    assert_eq!(converted.current.len(), 1);
    assert_eq!(
        converted.record.notes,
        "Converted from lead. Original notes: Met at expo"
    );

    let leads = desk.list_leads().await.unwrap();
    assert_eq!(leads[0].status, LeadStatus::Won);

    let dashboard = desk.dashboard().await.unwrap();
    assert_eq!(dashboard.metrics.total_leads, 2);
    assert_eq!(dashboard.metrics.active_customers, 1);
    assert_eq!(dashboard.quick_stats.conversion_rate, dec("50.0"));

    let remaining = desk.delete_lead(lead.id.unwrap()).await.unwrap();
    assert_eq!(remaining.len(), 1);
}

#[tokio::test]
async fn test_custom_validators() {
    let backend = MemoryBackend::new();
    let mut desk = Desk::with_validators(
        backend.clone(),
        Box::new(EnhancedDocumentValidator),
        Box::new(EnhancedAccountValidator),
    );

    let bad_code = ChartAccount::new("CASH", "Cash", AccountType::Asset);
    assert!(desk.add_account(&bad_code).await.is_err());

    let account = desk
        .add_account(&ChartAccount::new("1000", "Cash", AccountType::Asset))
        .await
        .unwrap();
    assert_eq!(account.current.len(), 1);

    // A single blank line balances but the enhanced rules still reject it
    let mut journal = LedgerDocument::draft(DocumentKind::Journal, date(15));
    journal.set_account(0, "cash").unwrap();
    assert!(DefaultDocumentValidator.validate_document(&journal).is_ok());
    assert!(desk.submit_journal(&journal).await.is_err());
    assert_eq!(desk.list_documents(DocumentKind::Journal).await.unwrap().len(), 0);
}
