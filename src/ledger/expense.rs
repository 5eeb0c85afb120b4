//! Expense input: a categorised expense with 5% input VAT, posted as
//! expense + VAT receivable against the payment account

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::document::DocumentBuilder;
use crate::tax::vat::{vat_rate, VatCalculation, VAT_PERCENT};
use crate::types::*;
use crate::utils::validation::parse_amount;

/// Account debited with the VAT paid on expenses
pub const INPUT_VAT_ACCOUNT: &str = "2010";

/// What the money was spent on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Rent,
    Utilities,
    Marketing,
    Professional,
    General,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Rent,
        ExpenseCategory::Utilities,
        ExpenseCategory::Marketing,
        ExpenseCategory::Professional,
        ExpenseCategory::General,
    ];

    /// Expense account the category posts to
    pub fn account_code(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "6100",
            ExpenseCategory::Utilities => "6200",
            ExpenseCategory::Marketing => "6300",
            ExpenseCategory::Professional => "6400",
            ExpenseCategory::General => "6500",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "Rent Expense",
            ExpenseCategory::Utilities => "Utilities Expense",
            ExpenseCategory::Marketing => "Marketing & Advertising",
            ExpenseCategory::Professional => "Professional Fees",
            ExpenseCategory::General => "General & Admin Expense",
        }
    }
}

/// How an expense was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpensePaymentMethod {
    /// On account, settled later through payables
    Credit,
    Cash,
    Card,
    BankTransfer,
}

impl ExpensePaymentMethod {
    pub const ALL: [ExpensePaymentMethod; 4] = [
        ExpensePaymentMethod::Credit,
        ExpensePaymentMethod::Cash,
        ExpensePaymentMethod::Card,
        ExpensePaymentMethod::BankTransfer,
    ];

    /// Account credited with the VAT-inclusive total
    pub fn account_code(&self) -> &'static str {
        match self {
            ExpensePaymentMethod::Credit => "2000",
            ExpensePaymentMethod::Cash => "1000",
            ExpensePaymentMethod::Card | ExpensePaymentMethod::BankTransfer => "1010",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExpensePaymentMethod::Credit => "Credit",
            ExpensePaymentMethod::Cash => "Cash",
            ExpensePaymentMethod::Card => "Card",
            ExpensePaymentMethod::BankTransfer => "Bank Transfer",
        }
    }
}

/// Expense as entered on the expense form.
///
/// `amount` excludes VAT. The posting is always generated from the category,
/// payment method and amount, so it balances by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseInput {
    pub date: NaiveDate,
    pub vendor: ExpenseVendor,
    pub category: Option<ExpenseCategory>,
    pub payment_method: Option<ExpensePaymentMethod>,
    pub amount: BigDecimal,
    pub currency: String,
    pub notes: String,
}

impl ExpenseInput {
    /// Blank input for a vendor
    pub fn new(date: NaiveDate, vendor: ExpenseVendor) -> Self {
        Self {
            date,
            vendor,
            category: None,
            payment_method: None,
            amount: BigDecimal::from(0),
            currency: DEFAULT_CURRENCY.to_string(),
            notes: String::new(),
        }
    }

    pub fn category(mut self, category: ExpenseCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn paid_by(mut self, method: ExpensePaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn amount(mut self, amount: BigDecimal) -> Self {
        self.amount = amount;
        self
    }

    /// Apply raw amount input; invalid input counts as zero
    pub fn set_amount(&mut self, input: &str) {
        self.amount = parse_amount(input);
    }

    /// Net amount, VAT rounded to the fil and the VAT-inclusive total
    pub fn vat(&self) -> VatCalculation {
        let vat_amount = (&self.amount * vat_rate()).round(2);
        VatCalculation {
            base_amount: self.amount.clone(),
            total_amount: &self.amount + &vat_amount,
            vat_amount,
        }
    }

    fn checked(&self) -> DeskResult<(ExpenseCategory, ExpensePaymentMethod)> {
        let category = self
            .category
            .ok_or_else(|| DeskError::Validation("Please select an expense category".to_string()))?;
        let method = self
            .payment_method
            .ok_or_else(|| DeskError::Validation("Please select a payment method".to_string()))?;
        if self.amount <= BigDecimal::from(0) {
            return Err(DeskError::Validation("Please enter a valid amount".to_string()));
        }
        if self.vendor.name.trim().is_empty() {
            return Err(DeskError::Validation("Vendor name is required".to_string()));
        }
        Ok((category, method))
    }

    /// Check the form fields in the order the form reports them
    pub fn validate(&self) -> DeskResult<()> {
        self.checked().map(|_| ())
    }

    /// Expense document with the generated posting
    pub fn to_document(&self) -> DeskResult<LedgerDocument> {
        let (category, method) = self.checked()?;
        let vat = self.vat();

        let mut builder = DocumentBuilder::new(DocumentKind::Expense, self.date)
            .currency(self.currency.clone())
            .notes(self.notes.clone())
            .vendor(self.vendor.clone())
            .debit(
                category.account_code(),
                format!("Record {}", category.name()),
                vat.base_amount,
            );
        if vat.vat_amount > BigDecimal::from(0) {
            builder = builder.debit(
                INPUT_VAT_ACCOUNT,
                format!("Record VAT receivable ({}%)", VAT_PERCENT),
                vat.vat_amount,
            );
        }
        builder
            .credit(
                method.account_code(),
                format!("Record {}", method.name()),
                vat.total_amount,
            )
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn input() -> ExpenseInput {
        ExpenseInput::new(
            NaiveDate::from_ymd_opt(2024, 1, 18).unwrap(),
            ExpenseVendor {
                name: "Office Supplies Co.".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_posting_adds_input_vat() {
        let doc = input()
            .category(ExpenseCategory::General)
            .paid_by(ExpensePaymentMethod::Cash)
            .amount(dec("100"))
            .to_document()
            .unwrap();

        assert_eq!(doc.kind, DocumentKind::Expense);
        assert_eq!(doc.entries.len(), 3);
        assert_eq!(doc.entries[0].account.as_str(), "6500");
        assert_eq!(doc.entries[0].debit, dec("100"));
        assert_eq!(doc.entries[1].account.as_str(), INPUT_VAT_ACCOUNT);
        assert_eq!(doc.entries[1].debit, dec("5"));
        assert_eq!(doc.entries[2].account.as_str(), "1000");
        assert_eq!(doc.entries[2].credit, dec("105"));
        assert!(doc.balance().is_balanced);
        assert_eq!(doc.vendor.unwrap().name, "Office Supplies Co.");
    }

    #[test]
    fn test_vat_is_rounded_to_two_places() {
        let mut expense = input()
            .category(ExpenseCategory::Utilities)
            .paid_by(ExpensePaymentMethod::BankTransfer);
        expense.set_amount("33.33");

        let vat = expense.vat();
        assert_eq!(vat.vat_amount, dec("1.67"));
        assert_eq!(vat.total_amount, dec("35.00"));

        let doc = expense.to_document().unwrap();
        assert_eq!(doc.entries[2].account.as_str(), "1010");
        assert_eq!(doc.balance().difference, dec("0"));
    }

    #[test]
    fn test_payment_accounts() {
        assert_eq!(ExpensePaymentMethod::Credit.account_code(), "2000");
        assert_eq!(ExpensePaymentMethod::Card.account_code(), "1010");
        assert_eq!(ExpenseCategory::Rent.account_code(), "6100");
        assert_eq!(
            serde_json::to_value(ExpensePaymentMethod::BankTransfer).unwrap(),
            "bank_transfer"
        );
    }

    #[test]
    fn test_validation_order() {
        let message = |e: ExpenseInput| match e.validate() {
            Err(DeskError::Validation(m)) => m,
            other => panic!("expected validation error, got {:?}", other),
        };

        assert_eq!(message(input()), "Please select an expense category");
        assert_eq!(
            message(input().category(ExpenseCategory::Rent)),
            "Please select a payment method"
        );
        assert_eq!(
            message(
                input()
                    .category(ExpenseCategory::Rent)
                    .paid_by(ExpensePaymentMethod::Cash)
            ),
            "Please enter a valid amount"
        );

        let mut nameless = input()
            .category(ExpenseCategory::Rent)
            .paid_by(ExpensePaymentMethod::Cash)
            .amount(dec("10"));
        nameless.vendor.name = "  ".to_string();
        assert_eq!(message(nameless), "Vendor name is required");
    }
}
