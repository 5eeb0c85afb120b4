//! # Bizdesk Core
//!
//! The accounting and CRM core behind a small-business desk: manual journals,
//! expenses and invoices checked with double-entry rules, VAT line-item totals,
//! inventory stock status, and a typed client for the bookkeeping REST backend.
//!
//! ## Features
//!
//! - **Balance calculator**: debit/credit totals with a 0.01 tolerance
//! - **VAT totals**: subtotal, 5% VAT and total for invoice line items
//! - **Expense input**: category and payment method posted with 5% input VAT
//! - **Stock status**: out-of-stock / low-stock / in-stock classification
//! - **Document lifecycle**: typed statuses with one-way, per-kind transitions
//! - **Backend abstraction**: trait-based collaborator with HTTP and in-memory implementations
//! - **Refetch after mutation**: every successful write returns the fresh collection
//!
//! ## Quick Start
//!
//! ```rust
//! use bizdesk_core::{calculate_balance, LedgerEntry};
//! use bigdecimal::BigDecimal;
//!
//! let entries = vec![
//!     LedgerEntry::debit("office-supplies", "Printer paper", BigDecimal::from(150)),
//!     LedgerEntry::credit("cash", "Petty cash", BigDecimal::from(150)),
//! ];
//! assert!(calculate_balance(&entries).is_balanced);
//! ```

pub mod client;
pub mod config;
pub mod crm;
pub mod inventory;
pub mod ledger;
pub mod navigation;
pub mod reports;
pub mod tax;
pub mod telemetry;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use crm::*;
pub use inventory::*;
pub use ledger::*;
pub use tax::vat::*;
pub use traits::*;
pub use types::*;

// Re-export posting patterns for convenience
pub use ledger::document::patterns;
