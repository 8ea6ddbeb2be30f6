use diesel::result::Error as DieselError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatchlistError>;

/// Custom error type for watchlist operations
#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for WatchlistError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => WatchlistError::NotFound("Record not found".to_string()),
            _ => WatchlistError::DatabaseError(err.to_string()),
        }
    }
}
