//! Line editing for journals and expenses

use bigdecimal::BigDecimal;

use crate::ledger::balance::{calculate_balance, BalanceSummary};
use crate::types::*;
use crate::utils::validation::parse_amount;

impl LedgerDocument {
    /// Current totals for the document's lines
    pub fn balance(&self) -> BalanceSummary {
        calculate_balance(&self.entries)
    }

    /// Append a blank line
    pub fn add_entry(&mut self) {
        self.entries.push(LedgerEntry::blank());
    }

    /// Remove a line. The last remaining line is never removed.
    pub fn remove_entry(&mut self, index: usize) -> DeskResult<()> {
        self.check_line(index)?;
        if self.entries.len() > 1 {
            self.entries.remove(index);
        }
        Ok(())
    }

    /// Pick the account for a line
    pub fn set_account(&mut self, index: usize, account: impl Into<AccountRef>) -> DeskResult<()> {
        self.check_line(index)?;
        self.entries[index].account = account.into();
        Ok(())
    }

    /// Set a line description
    pub fn set_description(&mut self, index: usize, description: impl Into<String>) -> DeskResult<()> {
        self.check_line(index)?;
        self.entries[index].description = description.into();
        Ok(())
    }

    /// Apply raw input typed into a debit or credit cell.
    ///
    /// Separators are stripped and unparseable text counts as zero. Filling in
    /// one side clears the other, so a line never carries both.
    pub fn set_amount(&mut self, index: usize, side: EntrySide, input: &str) -> DeskResult<()> {
        self.check_line(index)?;
        let cleaned = input.trim().replace(',', "");
        let amount = parse_amount(&cleaned);

        let entry = &mut self.entries[index];
        match side {
            EntrySide::Debit => entry.debit = amount,
            EntrySide::Credit => entry.credit = amount,
        }

        if !cleaned.is_empty() {
            match side.opposite() {
                EntrySide::Debit => entry.debit = BigDecimal::from(0),
                EntrySide::Credit => entry.credit = BigDecimal::from(0),
            }
        }

        Ok(())
    }

    fn check_line(&self, index: usize) -> DeskResult<()> {
        if index >= self.entries.len() {
            return Err(DeskError::NotFound(format!(
                "line {} of {} {}",
                index, self.kind, self.number
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> LedgerDocument {
        LedgerDocument::draft(
            DocumentKind::Expense,
            NaiveDate::from_ymd_opt(2024, 1, 18).unwrap(),
        )
    }

    #[test]
    fn test_filling_one_side_clears_the_other() {
        let mut doc = draft();
        doc.set_amount(0, EntrySide::Debit, "150").unwrap();
        doc.set_amount(0, EntrySide::Credit, "1,150.25").unwrap();

        assert_eq!(doc.entries[0].debit, BigDecimal::from(0));
        assert_eq!(doc.entries[0].credit, "1150.25".parse::<BigDecimal>().unwrap());
        assert!(doc.entries[0].is_well_formed());
    }

    #[test]
    fn test_clearing_a_cell_keeps_the_other_side() {
        let mut doc = draft();
        doc.set_amount(0, EntrySide::Debit, "150").unwrap();
        doc.set_amount(0, EntrySide::Credit, "").unwrap();

        assert_eq!(doc.entries[0].debit, BigDecimal::from(150));
        assert_eq!(doc.entries[0].credit, BigDecimal::from(0));
    }

    #[test]
    fn test_garbage_input_counts_as_zero() {
        let mut doc = draft();
        doc.set_amount(0, EntrySide::Debit, "12abc").unwrap();
        assert_eq!(doc.entries[0].debit, BigDecimal::from(0));
    }

    #[test]
    fn test_last_line_is_kept() {
        let mut doc = draft();
        doc.add_entry();
        doc.remove_entry(1).unwrap();
        doc.remove_entry(0).unwrap();
        assert_eq!(doc.entries.len(), 1);
        assert!(doc.remove_entry(3).is_err());
    }

    #[test]
    fn test_balance_follows_edits() {
        let mut doc = draft();
        doc.set_account(0, "equipment").unwrap();
        doc.set_amount(0, EntrySide::Debit, "500").unwrap();
        doc.add_entry();
        doc.set_account(1, "cash").unwrap();
        doc.set_description(1, "Card payment").unwrap();
        doc.set_amount(1, EntrySide::Credit, "500").unwrap();

        let summary = doc.balance();
        assert!(summary.is_balanced);
        assert_eq!(summary.total_debits, BigDecimal::from(500));
    }
}
