//! Summary figures for the dashboard, invoicing and accounting screens

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::crm::{Customer, Lead, LeadStatus, Vendor};
use crate::ledger::invoice::InvoiceDocument;
use crate::tax::vat::vat_rate;
use crate::types::*;
use crate::utils::lenient;

/// Payment cycle in days reported until the backend tracks real payment dates
pub const DEFAULT_PAYMENT_CYCLE_DAYS: u64 = 32;

/// Sales, receivables and cash collected across all invoices
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceSummary {
    #[serde(deserialize_with = "lenient::amount")]
    pub total_sales: BigDecimal,
    /// Invoices not yet paid
    #[serde(deserialize_with = "lenient::amount")]
    pub total_receivables: BigDecimal,
    /// Paid invoices
    #[serde(deserialize_with = "lenient::amount")]
    pub total_cash_collected: BigDecimal,
}

impl InvoiceSummary {
    /// Summarise a set of invoices, rounding each figure to 2 dp
    pub fn from_invoices(invoices: &[InvoiceDocument]) -> Self {
        let mut total_sales = BigDecimal::from(0);
        let mut total_receivables = BigDecimal::from(0);
        let mut total_cash_collected = BigDecimal::from(0);

        for invoice in invoices {
            let total = invoice.totals().total;
            if invoice.status == DocumentStatus::Paid {
                total_cash_collected += &total;
            } else {
                total_receivables += &total;
            }
            total_sales += total;
        }

        Self {
            total_sales: total_sales.round(2),
            total_receivables: total_receivables.round(2),
            total_cash_collected: total_cash_collected.round(2),
        }
    }

    /// VAT share of the outstanding receivables
    pub fn vat_on_receivables(&self) -> BigDecimal {
        (&self.total_receivables * vat_rate()).round(2)
    }
}

/// Percentage of leads that were won, to 1 dp. Zero when there are no leads.
pub fn conversion_rate(leads: &[Lead]) -> BigDecimal {
    if leads.is_empty() {
        return BigDecimal::from(0);
    }
    let won = leads.iter().filter(|l| l.status == LeadStatus::Won).count();
    let rate = BigDecimal::from(won as u64) * BigDecimal::from(100) / BigDecimal::from(leads.len() as u64);
    rate.round(1)
}

/// Mean invoice total, to 2 dp. Zero when there are no invoices.
pub fn average_invoice_value(invoices: &[InvoiceDocument]) -> BigDecimal {
    if invoices.is_empty() {
        return BigDecimal::from(0);
    }
    let sum: BigDecimal = invoices.iter().map(|i| i.totals().total).sum();
    (sum / BigDecimal::from(invoices.len() as u64)).round(2)
}

/// Counts for the journal and expense lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total: usize,
    pub posted: usize,
    pub draft: usize,
    /// Sum of total debits across all documents
    pub total_amount: BigDecimal,
}

impl DocumentStats {
    pub fn from_documents(documents: &[LedgerDocument]) -> Self {
        Self {
            total: documents.len(),
            posted: documents
                .iter()
                .filter(|d| d.status == DocumentStatus::Posted)
                .count(),
            draft: documents
                .iter()
                .filter(|d| d.status == DocumentStatus::Draft)
                .count(),
            total_amount: documents.iter().map(|d| d.balance().total_debits).sum(),
        }
    }
}

/// Counts for the vendor list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorStats {
    pub total_vendors: usize,
    pub total_bills: u64,
    pub total_amount: BigDecimal,
    /// Vendors with at least one bill
    pub active_vendors: usize,
}

impl VendorStats {
    pub fn from_vendors(vendors: &[Vendor]) -> Self {
        Self {
            total_vendors: vendors.len(),
            total_bills: vendors.iter().map(|v| v.total_bills).sum(),
            total_amount: vendors.iter().map(|v| &v.total_amount).sum(),
            active_vendors: vendors.iter().filter(|v| v.is_active()).count(),
        }
    }
}

/// Headline figures on the dashboard
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadlineMetrics {
    pub total_leads: u64,
    pub active_customers: u64,
    #[serde(deserialize_with = "lenient::amount")]
    pub outstanding_invoices: BigDecimal,
    #[serde(rename = "cashReceivedMTD", deserialize_with = "lenient::amount")]
    pub cash_received_mtd: BigDecimal,
    #[serde(rename = "salesMTD", deserialize_with = "lenient::amount")]
    pub sales_mtd: BigDecimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_receivables: BigDecimal,
}

/// Month-on-month trend percentages
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Trends {
    #[serde(deserialize_with = "lenient::amount")]
    pub sales_trend: BigDecimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub cash_trend: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuickStats {
    #[serde(deserialize_with = "lenient::amount")]
    pub conversion_rate: BigDecimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub avg_invoice_value: BigDecimal,
    /// Days
    pub payment_cycle: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartSeries {
    #[serde(deserialize_with = "lenient::amount_list")]
    pub sales_trend_data: Vec<BigDecimal>,
    #[serde(deserialize_with = "lenient::amount_list")]
    pub collection_trend_data: Vec<BigDecimal>,
}

/// Dashboard payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardMetrics {
    pub metrics: HeadlineMetrics,
    pub trends: Trends,
    pub recent_leads: Vec<Lead>,
    pub unpaid_invoices: Vec<InvoiceDocument>,
    pub quick_stats: QuickStats,
    pub charts: ChartSeries,
}

impl DashboardMetrics {
    /// Build the dashboard from raw collections. Trends and chart series
    /// are left empty; only the backend tracks month-by-month history.
    pub fn compute(leads: &[Lead], customers: &[Customer], invoices: &[InvoiceDocument]) -> Self {
        let summary = InvoiceSummary::from_invoices(invoices);
        let unpaid: Vec<InvoiceDocument> = invoices
            .iter()
            .filter(|i| i.status != DocumentStatus::Paid)
            .cloned()
            .collect();

        Self {
            metrics: HeadlineMetrics {
                total_leads: leads.len() as u64,
                active_customers: customers.len() as u64,
                outstanding_invoices: summary.total_receivables.clone(),
                cash_received_mtd: summary.total_cash_collected,
                sales_mtd: summary.total_sales,
                total_receivables: summary.total_receivables,
            },
            trends: Trends::default(),
            recent_leads: last_n(leads, 4),
            unpaid_invoices: last_n(&unpaid, 4),
            quick_stats: QuickStats {
                conversion_rate: conversion_rate(leads),
                avg_invoice_value: average_invoice_value(invoices),
                payment_cycle: DEFAULT_PAYMENT_CYCLE_DAYS,
            },
            charts: ChartSeries::default(),
        }
    }
}

fn last_n<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items[items.len().saturating_sub(n)..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::vat::InvoiceLineItem;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn invoice(price: &str, status: DocumentStatus) -> InvoiceDocument {
        let mut inv = InvoiceDocument::dated(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        inv.customer = "Gulf Trading - Omar".to_string();
        inv.items = vec![InvoiceLineItem::new("Service", dec("1"), dec(price))];
        inv.status = status;
        inv
    }

    fn lead(status: LeadStatus) -> Lead {
        let mut lead = Lead::new("A", "B");
        lead.status = status;
        lead
    }

    #[test]
    fn test_invoice_summary() {
        let invoices = vec![
            invoice("100", DocumentStatus::Paid),
            invoice("200", DocumentStatus::Sent),
            invoice("33.333", DocumentStatus::Overdue),
        ];

        let summary = InvoiceSummary::from_invoices(&invoices);
        assert_eq!(summary.total_cash_collected, dec("105.00"));
        assert_eq!(summary.total_receivables, dec("245.00"));
        assert_eq!(summary.total_sales, dec("350.00"));
        assert_eq!(summary.vat_on_receivables(), dec("12.25"));
    }

    #[test]
    fn test_summary_reads_camel_case() {
        let summary: InvoiceSummary = serde_json::from_value(serde_json::json!({
            "totalSales": 1050.0,
            "totalReceivables": "525.5",
            "totalCashCollected": null
        }))
        .unwrap();
        assert_eq!(summary.total_receivables, dec("525.5"));
        assert_eq!(summary.total_cash_collected, dec("0"));
    }

    #[test]
    fn test_conversion_rate() {
        assert_eq!(conversion_rate(&[]), dec("0"));
        let leads = vec![
            lead(LeadStatus::Won),
            lead(LeadStatus::New),
            lead(LeadStatus::Lost),
        ];
        assert_eq!(conversion_rate(&leads), dec("33.3"));
    }

    #[test]
    fn test_average_invoice_value() {
        assert_eq!(average_invoice_value(&[]), dec("0"));
        let invoices = vec![
            invoice("100", DocumentStatus::Draft),
            invoice("200", DocumentStatus::Draft),
        ];
        assert_eq!(average_invoice_value(&invoices), dec("157.50"));
    }

    #[test]
    fn test_vendor_stats() {
        let mut busy = Vendor::new("Sara", "Office Supplies Co.");
        busy.total_bills = 3;
        busy.total_amount = dec("900");
        let idle = Vendor::new("Ali", "Desert Logistics");

        let stats = VendorStats::from_vendors(&[busy, idle]);
        assert_eq!(stats.total_vendors, 2);
        assert_eq!(stats.total_bills, 3);
        assert_eq!(stats.active_vendors, 1);
        assert_eq!(stats.total_amount, dec("900"));
    }

    #[test]
    fn test_document_stats() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut posted = LedgerDocument::draft(DocumentKind::Journal, date);
        posted.entries = vec![
            LedgerEntry::debit("cash", "", dec("1200")),
            LedgerEntry::credit("sales", "", dec("1200")),
        ];
        posted.status = DocumentStatus::Posted;
        let draft = LedgerDocument::draft(DocumentKind::Journal, date);

        let stats = DocumentStats::from_documents(&[posted, draft]);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.posted, 1);
        assert_eq!(stats.draft, 1);
        assert_eq!(stats.total_amount, dec("1200"));
    }

    #[test]
    fn test_dashboard_compute() {
        let leads: Vec<Lead> = (0..6).map(|_| lead(LeadStatus::New)).collect();
        let invoices = vec![
            invoice("100", DocumentStatus::Paid),
            invoice("200", DocumentStatus::Sent),
        ];

        let dashboard = DashboardMetrics::compute(&leads, &[], &invoices);
        assert_eq!(dashboard.metrics.total_leads, 6);
        assert_eq!(dashboard.recent_leads.len(), 4);
        assert_eq!(dashboard.unpaid_invoices.len(), 1);
        assert_eq!(dashboard.metrics.outstanding_invoices, dec("210.00"));
        assert_eq!(dashboard.quick_stats.payment_cycle, DEFAULT_PAYMENT_CYCLE_DAYS);
    }
}
