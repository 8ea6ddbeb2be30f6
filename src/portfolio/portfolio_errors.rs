use thiserror::Error;

use crate::errors::Error;
use crate::holdings::CalculatorError;

/// Errors from the money-weighted return solver
#[derive(Debug, Error)]
pub enum XirrError {
    #[error("At least two cash flows are required")]
    InsufficientCashFlows,
    #[error("Rate solver did not converge")]
    NoConvergence,
}

impl From<XirrError> for Error {
    fn from(err: XirrError) -> Self {
        Error::Calculator(CalculatorError::Calculation(err.to_string()))
    }
}
