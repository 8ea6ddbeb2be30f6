use log::debug;
use std::sync::Arc;

use crate::accounts::accounts_errors::AccountError;
use crate::accounts::accounts_model::{Account, AccountSummary, NewAccount};
use crate::accounts::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::db::{DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::holdings::HoldingsServiceTrait;
use crate::ledger::TransactionRepositoryTrait;
use crate::sip::SipRepositoryTrait;

/// Service for account management.
///
/// The ledger and SIP mandates reference accounts by name, so renames
/// cascade through both tables in one database transaction.
pub struct AccountService {
    pool: Arc<DbPool>,
    repository: Arc<dyn AccountRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    sip_repository: Arc<dyn SipRepositoryTrait>,
    holdings_service: Arc<dyn HoldingsServiceTrait>,
}

impl AccountService {
    pub fn new(
        pool: Arc<DbPool>,
        repository: Arc<dyn AccountRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        sip_repository: Arc<dyn SipRepositoryTrait>,
        holdings_service: Arc<dyn HoldingsServiceTrait>,
    ) -> Self {
        Self {
            pool,
            repository,
            transaction_repository,
            sip_repository,
            holdings_service,
        }
    }
}

impl AccountServiceTrait for AccountService {
    fn get_account(&self, account_id: &str) -> Result<Account> {
        Ok(self.repository.get_account(account_id)?)
    }

    fn list_accounts(&self) -> Result<Vec<AccountSummary>> {
        let accounts = self.repository.get_accounts()?;
        let mut summaries = Vec::with_capacity(accounts.len());
        for account in accounts {
            let transaction_count = self
                .transaction_repository
                .count_for_account(&account.name)?;
            let holdings_count = self
                .holdings_service
                .get_holdings(None, Some(&account.name))?
                .len();
            summaries.push(AccountSummary {
                account,
                transaction_count,
                holdings_count,
            });
        }
        Ok(summaries)
    }

    fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        debug!("Creating account '{}'", new_account.name);
        Ok(self.repository.create_account(new_account)?)
    }

    fn rename_account(&self, account_id: &str, new_name: &str) -> Result<Account> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::Account(AccountError::InvalidData(
                "Account name cannot be empty".to_string(),
            )));
        }

        let existing = self.repository.get_account(account_id)?;
        if existing.is_default {
            return Err(Error::Account(AccountError::InvalidOperation(
                "The default account cannot be renamed".to_string(),
            )));
        }
        if existing.name == new_name {
            return Ok(existing);
        }

        debug!("Renaming account '{}' to '{}'", existing.name, new_name);
        let repository = self.repository.clone();
        let transaction_repository = self.transaction_repository.clone();
        let sip_repository = self.sip_repository.clone();
        let old_name = existing.name.clone();

        self.pool.execute(move |conn| -> Result<Account> {
            let renamed = repository.rename_in_transaction(conn, account_id, new_name)?;
            transaction_repository.rename_account_in_transaction(conn, &old_name, new_name)?;
            sip_repository.rename_account_in_transaction(conn, &old_name, new_name)?;
            Ok(renamed)
        })
    }

    /// Deletes an empty account. Accounts still referenced by ledger rows
    /// or SIP mandates must be emptied first.
    fn delete_account(&self, account_id: &str) -> Result<()> {
        let account = self.repository.get_account(account_id)?;
        if account.is_default {
            return Err(Error::Account(AccountError::InvalidOperation(
                "The default account cannot be deleted".to_string(),
            )));
        }

        let transaction_count = self.transaction_repository.count_for_account(&account.name)?;
        if transaction_count > 0 {
            return Err(Error::Account(AccountError::InvalidOperation(format!(
                "Account '{}' still has {} transactions",
                account.name, transaction_count
            ))));
        }
        let mandate_count = self.sip_repository.count_for_account(&account.name)?;
        if mandate_count > 0 {
            return Err(Error::Account(AccountError::InvalidOperation(format!(
                "Account '{}' still has {} SIP mandates",
                account.name, mandate_count
            ))));
        }

        debug!("Deleting account '{}'", account.name);
        Ok(self.repository.delete_account(account_id)?)
    }
}
