use diesel::result::Error as DieselError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemeError>;

/// Custom error type for scheme catalog operations
#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for SchemeError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => SchemeError::NotFound("Record not found".to_string()),
            _ => SchemeError::DatabaseError(err.to_string()),
        }
    }
}
