//! Leads, customers, invoices and payments against the in-memory backend

use bigdecimal::BigDecimal;
use bizdesk_core::utils::MemoryBackend;
use bizdesk_core::{
    Desk, Inventory, InventoryItem, InvoiceDocument, InvoiceLineItem, Lead, Payment,
    VatCalculation,
};
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Bizdesk Core - Invoice Flow Example\n");

    let mut desk = Desk::new(MemoryBackend::new());

    // 1. Win a lead
    println!("🤝 Converting a lead...");
    let mut lead = Lead::new("Omar Haddad", "Gulf Trading");
    lead.email = "omar@gulftrading.ae".to_string();
    lead.notes = "Met at the Dubai expo".to_string();
    let lead = desk.add_lead(&lead).await?.record;
    let customer = desk
        .convert_lead(lead.id.ok_or("lead has no id")?)
        .await?
        .record;
    println!("  ✓ {} is now a customer", customer.billing_name());
    println!("  Notes: {}\n", customer.notes);

    // 2. Raise an invoice
    println!("💰 Raising an invoice...");
    let mut invoice = InvoiceDocument::dated(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    invoice.bill_to(&customer);
    invoice.items[0].description = "Bookkeeping, January".to_string();
    invoice.items[0].set_quantity("2");
    invoice.items[0].set_price("100");
    invoice.add_item();
    invoice.items[1] =
        InvoiceLineItem::new("VAT registration", BigDecimal::from(1), BigDecimal::from(50));

    let totals = invoice.totals();
    println!("  Subtotal:  AED {}", totals.subtotal);
    println!("  VAT (5%):  AED {}", totals.vat);
    println!("  Total:     AED {}", totals.total);

    let (saved, _) = desk.submit_invoice(&invoice).await?;
    let invoice_id = saved.id.ok_or("invoice has no id")?;
    println!("  ✓ Saved as {} due {:?}\n", saved.number, saved.due_date);

    // 3. Send and collect
    println!("📬 Sending and collecting...");
    desk.mark_invoice_sent(invoice_id).await?;
    let payment = Payment::new(
        invoice_id,
        saved.number.clone(),
        NaiveDate::from_ymd_opt(2024, 1, 28).unwrap(),
        totals.total.clone(),
    );
    let (payment, book) = desk.record_payment(&payment).await?;
    println!("  ✓ {} received via {:?}", payment.amount, payment.method);
    println!(
        "  Sales: {}  Receivables: {}  Collected: {}\n",
        book.summary.total_sales, book.summary.total_receivables, book.summary.total_cash_collected
    );

    // 4. Price-inclusive amounts
    let inclusive = VatCalculation::reverse_calculate(BigDecimal::from(105));
    println!(
        "🔎 AED 105 incl. VAT = {} + {} VAT\n",
        inclusive.base_amount, inclusive.vat_amount
    );

    // 5. Stock status
    println!("📦 Inventory...");
    let mut inventory = Inventory::new();
    inventory.add(InventoryItem::new("BLT-01", "Steel bolts", "2.50", "4", "200", "50"))?;
    inventory.add(InventoryItem::new("PPR-A4", "A4 paper", "18", "25", "8", "10"))?;
    inventory.add(InventoryItem::new("TNR-85", "Toner cartridge", "240", "310", "0", "2"))?;
    for item in inventory.items() {
        println!(
            "  {} {:<16} {:>4} units  {}",
            item.item_code,
            item.item_name,
            item.current_quantity,
            item.status()
        );
    }
    let stats = inventory.stats();
    println!(
        "  {} items, {} need reordering, stock value AED {}",
        stats.total_items, stats.low_stock, stats.total_value
    );

    let dashboard = desk.dashboard().await?;
    println!(
        "\n📊 Dashboard: {} leads, {} customers, conversion {}%",
        dashboard.metrics.total_leads,
        dashboard.metrics.active_customers,
        dashboard.quick_stats.conversion_rate
    );

    Ok(())
}
