pub mod db;

pub mod accounts;
pub mod holdings;
pub mod ledger;

pub mod constants;
pub mod errors;
pub mod portfolio;
pub mod schema;
pub mod schemes;
pub mod sip;
pub mod watchlist;

pub use errors::{Error, Result};
pub use holdings::*;
pub use ledger::*;
