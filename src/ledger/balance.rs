//! Debit/credit balance calculation

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::LedgerEntry;

/// Tolerance for treating debits and credits as equal (0.01)
pub fn balance_tolerance() -> BigDecimal {
    BigDecimal::new(1.into(), 2)
}

/// Totals derived from a set of ledger lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub total_debits: BigDecimal,
    pub total_credits: BigDecimal,
    /// `total_debits - total_credits`
    pub difference: BigDecimal,
    /// `|difference| < 0.01`
    pub is_balanced: bool,
}

/// Sum both sides of the lines and check they agree within the tolerance.
///
/// Pure: recomputing on the same lines always yields the same summary, so it
/// is safe to call after every edit.
pub fn calculate_balance(entries: &[LedgerEntry]) -> BalanceSummary {
    let total_debits: BigDecimal = entries.iter().map(|e| &e.debit).sum();
    let total_credits: BigDecimal = entries.iter().map(|e| &e.credit).sum();
    let difference = &total_debits - &total_credits;
    let is_balanced = difference.abs() < balance_tolerance();

    BalanceSummary {
        total_debits,
        total_credits,
        difference,
        is_balanced,
    }
}
