use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalculatorError>;

/// Errors raised while replaying the ledger into holdings
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),
    #[error(
        "Cannot sell {requested} units of scheme {scheme_code} in account {account_name}; only {held} held"
    )]
    UnitsNotHeld {
        scheme_code: String,
        account_name: String,
        requested: f64,
        held: f64,
    },
    #[error("Unsupported transaction type: {0}")]
    UnsupportedTransactionType(String),
    #[error("Calculation failed: {0}")]
    Calculation(String),
}
