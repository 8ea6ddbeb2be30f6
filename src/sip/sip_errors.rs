use diesel::result::Error as DieselError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SipError>;

/// Custom error type for SIP mandate operations
#[derive(Debug, Error)]
pub enum SipError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),
}

impl From<DieselError> for SipError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => SipError::NotFound("Record not found".to_string()),
            _ => SipError::DatabaseError(err.to_string()),
        }
    }
}
