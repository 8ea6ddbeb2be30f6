use diesel::sqlite::SqliteConnection;

use crate::accounts::accounts_errors::Result;
use crate::accounts::accounts_model::{Account, AccountSummary, NewAccount};

/// Trait defining the contract for account repository implementations
pub trait AccountRepositoryTrait: Send + Sync {
    fn get_account(&self, account_id: &str) -> Result<Account>;
    fn get_account_by_name(&self, name: &str) -> Result<Account>;
    fn get_accounts(&self) -> Result<Vec<Account>>;
    fn create_account(&self, new_account: NewAccount) -> Result<Account>;
    fn rename_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
        new_name: &str,
    ) -> Result<Account>;
    fn delete_account(&self, account_id: &str) -> Result<()>;
}

/// Trait defining the contract for account service implementations
pub trait AccountServiceTrait: Send + Sync {
    fn get_account(&self, account_id: &str) -> crate::errors::Result<Account>;
    fn list_accounts(&self) -> crate::errors::Result<Vec<AccountSummary>>;
    fn create_account(&self, new_account: NewAccount) -> crate::errors::Result<Account>;
    fn rename_account(&self, account_id: &str, new_name: &str) -> crate::errors::Result<Account>;
    fn delete_account(&self, account_id: &str) -> crate::errors::Result<()>;
}
