//! Journals and expenses against the in-memory backend

use bigdecimal::BigDecimal;
use bizdesk_core::ledger::account::utils::create_standard_chart;
use bizdesk_core::utils::MemoryBackend;
use bizdesk_core::{
    patterns, AccountManager, Desk, DeskError, DocumentKind, DocumentStatus, EntrySide,
    ExpenseCategory, ExpenseInput, ExpensePaymentMethod, ExpenseVendor, LedgerDocument,
};
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📒 Bizdesk Core - Journal Entries Example\n");

    let backend = MemoryBackend::new();
    let mut desk = Desk::new(backend.clone());

    // 1. Chart of accounts
    println!("📊 Setting up Chart of Accounts...");
    let mut accounts = AccountManager::new(backend.clone());
    for account in create_standard_chart(&mut accounts).await? {
        println!(
            "  ✓ {} - {} ({:?}){}",
            account.account_code,
            account.account_name,
            account.account_type,
            if account.vat_applicable { " [VAT]" } else { "" }
        );
    }
    println!();

    // 2. A journal typed line by line, the way the form fills it in
    println!("✍️  Editing a manual journal...");
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let mut journal = LedgerDocument::draft(DocumentKind::Journal, date);
    journal.notes = "Office supplies bought with petty cash".to_string();
    journal.set_account(0, "6500")?;
    journal.set_amount(0, EntrySide::Debit, "150")?;
    journal.add_entry();
    journal.set_account(1, "1000")?;
    journal.set_amount(1, EntrySide::Credit, "100")?;

    let summary = journal.balance();
    println!(
        "  Debits: {}  Credits: {}  Difference: {}",
        summary.total_debits, summary.total_credits, summary.difference
    );

    match desk.submit_journal(&journal).await {
        Err(DeskError::Unbalanced { difference, .. }) => {
            println!("  ✗ Rejected locally, off by {}", difference)
        }
        other => println!("  unexpected: {:?}", other.map(|s| s.record.number)),
    }

    journal.set_amount(1, EntrySide::Credit, "150")?;
    let saved = desk.submit_journal(&journal).await?;
    println!(
        "  ✓ Saved as journal #{} ({} on file)",
        saved.record.number,
        saved.current.len()
    );

    let posted = desk
        .transition_document(&saved.record, DocumentStatus::Posted)
        .await?;
    println!("  ✓ Journal #{} is now {}", posted.record.number, posted.record.status);
    println!("  Next journal number: {}\n", desk.next_journal_number().await?);

    // 3. Common patterns
    println!("🔁 Recording common entries...");
    let month_end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let depreciation = patterns::depreciation(month_end, "6600", "1510", BigDecimal::from(500))?;
    desk.submit_journal(&depreciation).await?;
    println!("  ✓ Monthly depreciation of AED 500");

    let expense = patterns::expense_payment(
        NaiveDate::from_ymd_opt(2024, 1, 18).unwrap(),
        ExpenseVendor {
            name: "Office Supplies Co.".to_string(),
            contact: "Sara Khan".to_string(),
            phone: "+971 4 555 0100".to_string(),
        },
        "6500",
        "1000",
        "Printer paper and toner",
        BigDecimal::from(270),
    )?;
    desk.submit_expense(&expense).await?;
    println!("  ✓ Expense paid to Office Supplies Co.");

    let rent = ExpenseInput::new(
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        ExpenseVendor {
            name: "Marina Properties".to_string(),
            ..Default::default()
        },
    )
    .category(ExpenseCategory::Rent)
    .paid_by(ExpensePaymentMethod::BankTransfer)
    .amount(BigDecimal::from(4000));
    let vat = rent.vat();
    let saved = desk.record_expense(&rent).await?;
    println!(
        "  ✓ Rent expense #{}: AED {} + VAT {} = {}",
        saved.record.number, vat.base_amount, vat.vat_amount, vat.total_amount
    );
    for line in &saved.record.entries {
        println!(
            "      {:<6} Dr {:>8}  Cr {:>8}  {}",
            line.account, line.debit, line.credit, line.description
        );
    }
    println!();

    // 4. Totals
    println!("📈 Document totals");
    for kind in [DocumentKind::Journal, DocumentKind::Expense] {
        let stats = desk.document_stats(kind).await?;
        println!(
            "  {}: {} total, {} posted, {} draft, AED {}",
            kind, stats.total, stats.posted, stats.draft, stats.total_amount
        );
    }

    Ok(())
}
