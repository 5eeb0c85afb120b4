//! Chart of accounts management

use tracing::debug;

use crate::traits::*;
use crate::types::*;

/// Account manager for handling chart of accounts operations
pub struct AccountManager<B: Backend> {
    backend: B,
    validator: Box<dyn AccountValidator>,
}

impl<B: Backend> AccountManager<B> {
    /// Create a new account manager
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            validator: Box::new(DefaultAccountValidator),
        }
    }

    /// Create a new account manager with custom validator
    pub fn with_validator(backend: B, validator: Box<dyn AccountValidator>) -> Self {
        Self { backend, validator }
    }

    /// Add an account to the chart
    pub async fn add_account(&mut self, account: &ChartAccount) -> DeskResult<Synced<ChartAccount>> {
        self.validator.validate_account(account)?;

        // Check if the code is already taken
        let existing = self.backend.list_accounts().await?;
        if existing.iter().any(|a| a.account_code == account.account_code) {
            return Err(DeskError::Validation(format!(
                "Account with code '{}' already exists",
                account.account_code
            )));
        }

        debug!(code = %account.account_code, "adding account");
        let saved = self.backend.add_account(account).await?;
        Ok(Synced {
            record: saved,
            current: self.backend.list_accounts().await?,
        })
    }

    /// Update a saved account
    pub async fn edit_account(&mut self, account: &ChartAccount) -> DeskResult<Synced<ChartAccount>> {
        self.validator.validate_account(account)?;
        if account.id.is_none() {
            return Err(DeskError::Validation(format!(
                "Account '{}' must be saved before it can be edited",
                account.account_code
            )));
        }

        let saved = self.backend.edit_account(account).await?;
        Ok(Synced {
            record: saved,
            current: self.backend.list_accounts().await?,
        })
    }

    /// Delete an account, returning the remaining chart
    pub async fn delete_account(&mut self, account_id: u64) -> DeskResult<Vec<ChartAccount>> {
        self.backend.delete_account(account_id).await?;
        self.backend.list_accounts().await
    }

    /// List all accounts
    pub async fn list_accounts(&self) -> DeskResult<Vec<ChartAccount>> {
        self.backend.list_accounts().await
    }

    /// List accounts by type
    pub async fn list_accounts_by_type(&self, account_type: AccountType) -> DeskResult<Vec<ChartAccount>> {
        Ok(self
            .backend
            .list_accounts()
            .await?
            .into_iter()
            .filter(|a| a.account_type == account_type)
            .collect())
    }

    /// Find an account by its code
    pub async fn get_account_required(&self, account_code: &str) -> DeskResult<ChartAccount> {
        self.backend
            .list_accounts()
            .await?
            .into_iter()
            .find(|a| a.account_code == account_code)
            .ok_or_else(|| DeskError::NotFound(format!("account {}", account_code)))
    }
}

/// Utility functions for working with accounts
pub mod utils {
    use super::*;

    /// Standard chart of accounts for a small UAE business, VAT accounts included
    pub fn standard_chart() -> Vec<ChartAccount> {
        vec![
            // Assets
            ChartAccount::new("1000", "Petty Cash", AccountType::Asset),
            ChartAccount::new("1010", "Main Bank Account", AccountType::Asset),
            ChartAccount::new("1200", "Accounts Receivable", AccountType::Asset),
            ChartAccount::new("1300", "Inventory", AccountType::Asset),
            ChartAccount::new("1500", "Equipment", AccountType::Asset),
            ChartAccount::new("1510", "Accumulated Depreciation", AccountType::Asset),
            // Liabilities
            ChartAccount::new("2000", "Accounts Payable", AccountType::Liability),
            ChartAccount::new("2010", "VAT Receivable", AccountType::Liability).with_vat(),
            ChartAccount::new("2100", "Loans Payable", AccountType::Liability),
            ChartAccount::new("2200", "VAT Payable", AccountType::Liability).with_vat(),
            // Equity
            ChartAccount::new("3000", "Owner's Equity", AccountType::Equity),
            ChartAccount::new("3200", "Retained Earnings", AccountType::Equity),
            // Income
            ChartAccount::new("4000", "Sales Revenue", AccountType::Income).with_vat(),
            ChartAccount::new("4100", "Service Revenue", AccountType::Income).with_vat(),
            // Expenses
            ChartAccount::new("5000", "Cost of Goods Sold", AccountType::Expense),
            ChartAccount::new("6100", "Rent Expense", AccountType::Expense).with_vat(),
            ChartAccount::new("6200", "Utilities Expense", AccountType::Expense).with_vat(),
            ChartAccount::new("6300", "Marketing & Advertising", AccountType::Expense).with_vat(),
            ChartAccount::new("6400", "Professional Fees", AccountType::Expense).with_vat(),
            ChartAccount::new("6500", "General & Admin Expense", AccountType::Expense).with_vat(),
            ChartAccount::new("6600", "Depreciation Expense", AccountType::Expense),
        ]
    }

    /// Add every account of the standard chart through the manager
    pub async fn create_standard_chart<B: Backend>(
        account_manager: &mut AccountManager<B>,
    ) -> DeskResult<Vec<ChartAccount>> {
        let mut created = Vec::new();
        for account in standard_chart() {
            created.push(account_manager.add_account(&account).await?.record);
        }
        Ok(created)
    }
}
