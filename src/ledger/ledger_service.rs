use log::debug;
use std::sync::Arc;

use crate::ledger::ledger_errors::Result;
use crate::ledger::ledger_model::{
    NewTransaction, Transaction, TransactionDetails, TransactionUpdate,
};
use crate::ledger::ledger_traits::{TransactionRepositoryTrait, TransactionServiceTrait};

/// Service for recording and querying ledger transactions
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn TransactionRepositoryTrait>) -> Self {
        Self { repository }
    }
}

impl TransactionServiceTrait for TransactionService {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.repository.get_transaction(transaction_id)
    }

    fn get_transactions(&self) -> Result<Vec<Transaction>> {
        self.repository.get_transactions()
    }

    fn search_transactions(
        &self,
        scheme_code: Option<&str>,
        account_name: Option<&str>,
        txn_type: Option<&str>,
        plan_kind: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        self.repository
            .filter_transactions(scheme_code, account_name, txn_type, plan_kind)
    }

    fn get_transaction_details(
        &self,
        scheme_code: Option<&str>,
        account_name: Option<&str>,
        plan_kind: Option<&str>,
    ) -> Result<Vec<TransactionDetails>> {
        self.repository
            .get_transaction_details(scheme_code, account_name, plan_kind)
    }

    fn record_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        debug!(
            "Recording {} for scheme {} in account {}",
            new_transaction.txn_type, new_transaction.scheme_code, new_transaction.account_name
        );
        self.repository.create_transaction(new_transaction)
    }

    fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction> {
        debug!("Updating transaction {}", update.id);
        self.repository.update_transaction(update)
    }

    fn delete_transaction(&self, transaction_id: &str) -> Result<()> {
        debug!("Deleting transaction {}", transaction_id);
        self.repository.delete_transaction(transaction_id)
    }

    fn delete_scheme_history(&self, scheme_code: &str) -> Result<usize> {
        let removed = self.repository.delete_for_scheme(scheme_code)?;
        debug!("Removed {} transactions for scheme {}", removed, scheme_code);
        Ok(removed)
    }
}
