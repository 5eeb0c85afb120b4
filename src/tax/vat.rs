//! VAT calculation for invoice line items.
//!
//! A single flat rate of 5% applies to every item. There is no multi-rate or
//! jurisdiction model and amounts are assumed to be in AED.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::{lenient, wire};
use crate::utils::validation::parse_amount;

/// VAT rate as a percentage
pub const VAT_PERCENT: u32 = 5;

/// VAT rate as a fraction (0.05)
pub fn vat_rate() -> BigDecimal {
    BigDecimal::new(VAT_PERCENT.into(), 2)
}

/// VAT breakdown for a single amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatCalculation {
    /// Amount before VAT
    pub base_amount: BigDecimal,
    /// VAT on the base amount
    pub vat_amount: BigDecimal,
    /// Amount including VAT
    pub total_amount: BigDecimal,
}

impl VatCalculation {
    /// Add VAT to a base amount
    pub fn calculate(base_amount: BigDecimal) -> Self {
        let vat_amount = &base_amount * vat_rate();
        let total_amount = &base_amount + &vat_amount;
        Self {
            base_amount,
            vat_amount,
            total_amount,
        }
    }

    /// Split a VAT-inclusive amount into base and VAT
    pub fn reverse_calculate(total_amount: BigDecimal) -> Self {
        let divisor = BigDecimal::from(100 + VAT_PERCENT);
        let base_amount = (&total_amount * BigDecimal::from(100)) / divisor;
        let vat_amount = &total_amount - &base_amount;
        Self {
            base_amount,
            vat_amount,
            total_amount,
        }
    }
}

/// One billable line on an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        serialize_with = "wire::amount"
    )]
    pub quantity: BigDecimal,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        serialize_with = "wire::amount"
    )]
    pub price: BigDecimal,
    /// `quantity × price`, refreshed on every quantity or price edit
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        serialize_with = "wire::amount"
    )]
    pub amount: BigDecimal,
}

impl Default for InvoiceLineItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: BigDecimal::from(1),
            price: BigDecimal::from(0),
            amount: BigDecimal::from(0),
        }
    }
}

impl InvoiceLineItem {
    /// Create a line item with its amount already worked out
    pub fn new(description: impl Into<String>, quantity: BigDecimal, price: BigDecimal) -> Self {
        let amount = &quantity * &price;
        Self {
            description: description.into(),
            quantity,
            price,
            amount,
        }
    }

    /// Apply raw quantity input; invalid input counts as zero
    pub fn set_quantity(&mut self, input: &str) {
        self.quantity = parse_amount(input);
        self.recalculate_amount();
    }

    /// Apply raw price input; invalid input counts as zero
    pub fn set_price(&mut self, input: &str) {
        self.price = parse_amount(input);
        self.recalculate_amount();
    }

    fn recalculate_amount(&mut self) {
        self.amount = &self.quantity * &self.price;
    }

    /// Reason this item cannot be submitted, if any
    pub fn problem(&self) -> Option<&'static str> {
        let zero = BigDecimal::from(0);
        if self.description.trim().is_empty() {
            Some("description is required")
        } else if self.quantity <= zero {
            Some("quantity must be greater than zero")
        } else if self.price <= zero {
            Some("price must be greater than zero")
        } else {
            None
        }
    }
}

/// Derived invoice totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: BigDecimal,
    pub vat: BigDecimal,
    pub total: BigDecimal,
}

/// Subtotal, VAT and total for a set of line items. Empty input gives zeros.
pub fn calculate_totals(items: &[InvoiceLineItem]) -> InvoiceTotals {
    let subtotal: BigDecimal = items.iter().map(|item| &item.amount).sum();
    let calculation = VatCalculation::calculate(subtotal);

    InvoiceTotals {
        subtotal: calculation.base_amount,
        vat: calculation.vat_amount,
        total: calculation.total_amount,
    }
}

/// Reject items with an empty description or a zero quantity or price
pub fn validate_line_items(items: &[InvoiceLineItem]) -> DeskResult<()> {
    if items.is_empty() {
        return Err(DeskError::Validation(
            "An invoice needs at least one line item".to_string(),
        ));
    }

    for (line, item) in items.iter().enumerate() {
        if let Some(reason) = item.problem() {
            return Err(DeskError::InvalidLineItem {
                line,
                reason: reason.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_vat_calculation() {
        let calc = VatCalculation::calculate(BigDecimal::from(1000));
        assert_eq!(calc.vat_amount, BigDecimal::from(50));
        assert_eq!(calc.total_amount, BigDecimal::from(1050));
    }

    #[test]
    fn test_vat_reverse_calculation() {
        let calc = VatCalculation::reverse_calculate(BigDecimal::from(1050));
        assert_eq!(calc.base_amount, BigDecimal::from(1000));
        assert_eq!(calc.vat_amount, BigDecimal::from(50));
    }

    #[test]
    fn test_invoice_totals() {
        let items = vec![
            InvoiceLineItem::new("Consulting", dec("2"), dec("100")),
            InvoiceLineItem::new("Setup", dec("1"), dec("50")),
        ];

        let totals = calculate_totals(&items);
        assert_eq!(totals.subtotal, dec("250"));
        assert_eq!(totals.vat, dec("12.5"));
        assert_eq!(totals.total, dec("262.5"));
        assert_eq!(calculate_totals(&items), totals);
    }

    #[test]
    fn test_empty_totals() {
        let totals = calculate_totals(&[]);
        assert_eq!(totals.subtotal, dec("0"));
        assert_eq!(totals.vat, dec("0"));
        assert_eq!(totals.total, dec("0"));
    }

    #[test]
    fn test_edits_recompute_amount() {
        let mut item = InvoiceLineItem::default();
        item.set_price("19.99");
        assert_eq!(item.amount, dec("19.99"));

        item.set_quantity("3");
        assert_eq!(item.amount, dec("59.97"));

        item.set_quantity("three");
        assert_eq!(item.amount, dec("0"));
    }

    #[test]
    fn test_line_item_validation() {
        let good = InvoiceLineItem::new("Bolts", dec("10"), dec("22"));
        let no_desc = InvoiceLineItem::new(" ", dec("1"), dec("5"));
        let no_price = InvoiceLineItem::new("Nails", dec("1"), dec("0"));

        assert!(validate_line_items(&[good.clone()]).is_ok());
        assert!(validate_line_items(&[]).is_err());
        assert!(matches!(
            validate_line_items(&[good.clone(), no_desc]),
            Err(DeskError::InvalidLineItem { line: 1, .. })
        ));
        assert!(matches!(
            validate_line_items(&[no_price, good]),
            Err(DeskError::InvalidLineItem { line: 0, .. })
        ));
    }
}
