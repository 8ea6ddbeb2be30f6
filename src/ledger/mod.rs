pub(crate) mod ledger_errors;
pub(crate) mod ledger_model;
pub(crate) mod ledger_repository;
pub(crate) mod ledger_service;
pub(crate) mod ledger_traits;

pub use ledger_errors::{LedgerError, Result};
pub use ledger_model::{
    NewTransaction, PlanKind, Transaction, TransactionDB, TransactionDetails, TransactionType,
    TransactionUpdate,
};
pub use ledger_repository::TransactionRepository;
pub use ledger_service::TransactionService;
pub use ledger_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
