//! Validation and input coercion utilities

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

use crate::traits::*;
use crate::types::*;

/// Parse a money input the way the forms do: thousands separators are
/// stripped and anything unparseable counts as zero.
pub fn parse_amount(input: &str) -> BigDecimal {
    let cleaned = input.trim().replace(',', "");
    if cleaned.is_empty() {
        return BigDecimal::from(0);
    }
    BigDecimal::from_str(&cleaned).unwrap_or_else(|_| BigDecimal::from(0))
}

/// Parse a whole-number quantity input. Fractions are truncated, invalid and
/// negative input becomes zero.
pub fn parse_quantity(input: &str) -> i64 {
    let cleaned = input.trim().replace(',', "");
    let whole = cleaned.split('.').next().unwrap_or("");
    whole.parse::<i64>().map(|q| q.max(0)).unwrap_or(0)
}

/// Parse a date in ISO form or the long `November 10, 2025` form the backend
/// writes for converted customers.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%B %d, %Y"))
        .ok()
}

/// Validate that an amount is not negative
pub fn validate_non_negative_amount(amount: &BigDecimal, what: &str) -> DeskResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(DeskError::Validation(format!("{} cannot be negative", what)))
    } else {
        Ok(())
    }
}

/// Validate that a required text field is filled in
pub fn validate_required(value: &str, field: &str) -> DeskResult<()> {
    if value.trim().is_empty() {
        return Err(DeskError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Validate an account code: digits only, at most 10 characters
pub fn validate_account_code(code: &str) -> DeskResult<()> {
    validate_required(code, "Account code")?;

    if code.len() > 10 {
        return Err(DeskError::Validation(
            "Account code cannot exceed 10 characters".to_string(),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(DeskError::Validation(
            "Account code can only contain digits".to_string(),
        ));
    }

    Ok(())
}

/// Validate that an account name is valid
pub fn validate_account_name(name: &str) -> DeskResult<()> {
    validate_required(name, "Account name")?;

    if name.len() > 100 {
        return Err(DeskError::Validation(
            "Account name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate document notes length
pub fn validate_notes(notes: &str) -> DeskResult<()> {
    if notes.len() > 500 {
        return Err(DeskError::Validation(
            "Notes cannot exceed 500 characters".to_string(),
        ));
    }
    Ok(())
}

/// Stricter document validator for desks that want more than the balance rules
pub struct EnhancedDocumentValidator;

impl DocumentValidator for EnhancedDocumentValidator {
    fn validate_document(&self, document: &LedgerDocument) -> DeskResult<()> {
        // Basic validation
        DefaultDocumentValidator.validate_document(document)?;

        validate_required(&document.currency, "Currency")?;
        validate_notes(&document.notes)?;

        if document.entries.len() < 2 {
            return Err(DeskError::Validation(
                "A document needs at least two lines for double-entry bookkeeping".to_string(),
            ));
        }

        let zero = BigDecimal::from(0);
        if document
            .entries
            .iter()
            .all(|e| e.debit == zero && e.credit == zero)
        {
            return Err(DeskError::Validation(
                "A document needs at least one non-zero line".to_string(),
            ));
        }

        Ok(())
    }
}

/// Stricter chart-of-accounts validator
pub struct EnhancedAccountValidator;

impl AccountValidator for EnhancedAccountValidator {
    fn validate_account(&self, account: &ChartAccount) -> DeskResult<()> {
        validate_account_code(&account.account_code)?;
        validate_account_name(&account.account_name)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_defaults_to_zero() {
        assert_eq!(parse_amount(""), BigDecimal::from(0));
        assert_eq!(parse_amount("abc"), BigDecimal::from(0));
        assert_eq!(parse_amount("NaN"), BigDecimal::from(0));
        assert_eq!(parse_amount(" 2,000.50 "), BigDecimal::from_str("2000.50").unwrap());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("12"), 12);
        assert_eq!(parse_quantity("1,200"), 1200);
        assert_eq!(parse_quantity("7.9"), 7);
        assert_eq!(parse_quantity("-3"), 0);
        assert_eq!(parse_quantity("lots"), 0);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-15"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("January 5, 2024"), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(parse_date("15/01/2024"), None);
    }

    #[test]
    fn test_account_code_rules() {
        assert!(validate_account_code("1000").is_ok());
        assert!(validate_account_code("").is_err());
        assert!(validate_account_code("10A0").is_err());
        assert!(validate_account_code("12345678901").is_err());
    }

    #[test]
    fn test_enhanced_document_validator_needs_two_lines() {
        let mut doc = LedgerDocument::draft(
            DocumentKind::Journal,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        );
        doc.entries = vec![LedgerEntry::debit("cash", "", BigDecimal::from(0))];

        let err = EnhancedDocumentValidator.validate_document(&doc).unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));
    }
}
