use diesel::sqlite::SqliteConnection;

use crate::ledger::ledger_errors::Result;
use crate::ledger::ledger_model::{
    NewTransaction, Transaction, TransactionDetails, TransactionUpdate,
};

/// Trait defining the contract for ledger repository implementations
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;
    fn get_transactions(&self) -> Result<Vec<Transaction>>;
    fn filter_transactions(
        &self,
        scheme_code: Option<&str>,
        account_name: Option<&str>,
        txn_type: Option<&str>,
        plan_kind: Option<&str>,
    ) -> Result<Vec<Transaction>>;
    fn get_transactions_for_holding(
        &self,
        scheme_code: &str,
        account_name: &str,
    ) -> Result<Vec<Transaction>>;
    fn get_transactions_for_holding_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
        account_name: &str,
    ) -> Result<Vec<Transaction>>;
    fn get_buys_newest_first_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
        account_name: &str,
    ) -> Result<Vec<Transaction>>;
    fn get_transaction_details(
        &self,
        scheme_code: Option<&str>,
        account_name: Option<&str>,
        plan_kind: Option<&str>,
    ) -> Result<Vec<TransactionDetails>>;
    fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    fn create_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        new_transaction: NewTransaction,
    ) -> Result<Transaction>;
    fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction>;
    fn update_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        update: TransactionUpdate,
    ) -> Result<Transaction>;
    fn delete_transaction(&self, transaction_id: &str) -> Result<()>;
    fn delete_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: &str,
    ) -> Result<()>;
    fn delete_for_scheme(&self, scheme_code: &str) -> Result<usize>;
    fn delete_for_scheme_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
    ) -> Result<usize>;
    fn delete_for_mandate_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
        account_name: &str,
    ) -> Result<usize>;
    fn shrink_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: &str,
        new_amount: f64,
        new_units: f64,
    ) -> Result<Transaction>;
    fn convert_plan_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
        account_name: &str,
    ) -> Result<usize>;
    fn rename_account_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        old_name: &str,
        new_name: &str,
    ) -> Result<usize>;
    fn count_for_account(&self, account_name: &str) -> Result<i64>;
}

/// Trait defining the contract for ledger service implementations
pub trait TransactionServiceTrait: Send + Sync {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;
    fn get_transactions(&self) -> Result<Vec<Transaction>>;
    fn search_transactions(
        &self,
        scheme_code: Option<&str>,
        account_name: Option<&str>,
        txn_type: Option<&str>,
        plan_kind: Option<&str>,
    ) -> Result<Vec<Transaction>>;
    fn get_transaction_details(
        &self,
        scheme_code: Option<&str>,
        account_name: Option<&str>,
        plan_kind: Option<&str>,
    ) -> Result<Vec<TransactionDetails>>;
    fn record_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction>;
    fn delete_transaction(&self, transaction_id: &str) -> Result<()>;
    fn delete_scheme_history(&self, scheme_code: &str) -> Result<usize>;
}
