use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::AMOUNT_TOLERANCE;
use crate::ledger::ledger_errors::LedgerError;
use crate::ledger::Result;

/// Side of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
        }
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BUY" => Ok(TransactionType::Buy),
            "SELL" => Ok(TransactionType::Sell),
            other => Err(LedgerError::InvalidData(format!(
                "Unknown transaction type '{}'",
                other
            ))),
        }
    }
}

/// Investment plan a BUY belongs to. SELL rows carry no plan kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanKind {
    Sip,
    Lumpsum,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::Sip => "SIP",
            PlanKind::Lumpsum => "LUMPSUM",
        }
    }
}

impl FromStr for PlanKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SIP" => Ok(PlanKind::Sip),
            "LUMPSUM" => Ok(PlanKind::Lumpsum),
            other => Err(LedgerError::InvalidData(format!(
                "Unknown plan kind '{}'",
                other
            ))),
        }
    }
}

/// Domain model for one atomic buy/sell entry in the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub scheme_code: String,
    pub account_name: String,
    pub txn_type: String,
    pub plan_kind: Option<String>,
    pub amount: f64,
    pub units: f64,
    pub nav_price: f64,
    pub txn_date: NaiveDate,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for ledger transactions
#[derive(
    Queryable,
    Selectable,
    Identifiable,
    Insertable,
    AsChangeset,
    PartialEq,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct TransactionDB {
    pub id: String,
    pub scheme_code: String,
    pub account_name: String,
    pub txn_type: String,
    pub plan_kind: Option<String>,
    pub amount: f64,
    pub units: f64,
    pub nav_price: f64,
    pub txn_date: NaiveDate,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        Self {
            id: db.id,
            scheme_code: db.scheme_code,
            account_name: db.account_name,
            txn_type: db.txn_type,
            plan_kind: db.plan_kind,
            amount: db.amount,
            units: db.units,
            nav_price: db.nav_price,
            txn_date: db.txn_date,
            remarks: db.remarks,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Input model for recording a new transaction.
///
/// `units` may be omitted; it is then derived as `amount / nav_price`.
/// When both sides are given they must agree within the float tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub id: Option<String>,
    pub scheme_code: String,
    pub account_name: String,
    pub txn_type: String,
    pub plan_kind: Option<String>,
    pub amount: f64,
    pub units: Option<f64>,
    pub nav_price: f64,
    pub txn_date: NaiveDate,
    pub remarks: Option<String>,
}

impl NewTransaction {
    /// Validates the new transaction data
    pub fn validate(&self) -> Result<()> {
        if self.scheme_code.trim().is_empty() {
            return Err(LedgerError::InvalidData(
                "Scheme code cannot be empty".to_string(),
            ));
        }
        if self.account_name.trim().is_empty() {
            return Err(LedgerError::InvalidData(
                "Account name cannot be empty".to_string(),
            ));
        }
        TransactionType::from_str(&self.txn_type)?;
        if let Some(kind) = self.plan_kind.as_deref() {
            PlanKind::from_str(kind)?;
        }
        if self.nav_price <= 0.0 {
            return Err(LedgerError::InvalidData(
                "NAV price must be positive".to_string(),
            ));
        }
        if self.amount <= 0.0 {
            return Err(LedgerError::InvalidData(
                "Amount must be positive".to_string(),
            ));
        }
        if let Some(units) = self.units {
            if units <= 0.0 {
                return Err(LedgerError::InvalidData(
                    "Units must be positive".to_string(),
                ));
            }
            if (units * self.nav_price - self.amount).abs() > AMOUNT_TOLERANCE {
                return Err(LedgerError::InvalidData(format!(
                    "Amount {} does not match units {} at NAV {}",
                    self.amount, units, self.nav_price
                )));
            }
        }
        Ok(())
    }

    /// Units as given, or derived from the amount/NAV identity.
    pub fn resolved_units(&self) -> f64 {
        self.units.unwrap_or(self.amount / self.nav_price)
    }
}

/// Input model for editing an existing transaction.
///
/// Edits keep the `amount == units * nav_price` identity by recomputing
/// units from the (possibly changed) amount and NAV.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub id: String,
    pub scheme_code: String,
    pub account_name: String,
    pub txn_type: String,
    pub plan_kind: Option<String>,
    pub amount: f64,
    pub nav_price: f64,
    pub txn_date: NaiveDate,
    pub remarks: Option<String>,
}

impl TransactionUpdate {
    /// Validates the transaction update data
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(LedgerError::InvalidData(
                "Transaction ID is required for updates".to_string(),
            ));
        }
        if self.scheme_code.trim().is_empty() {
            return Err(LedgerError::InvalidData(
                "Scheme code cannot be empty".to_string(),
            ));
        }
        if self.account_name.trim().is_empty() {
            return Err(LedgerError::InvalidData(
                "Account name cannot be empty".to_string(),
            ));
        }
        TransactionType::from_str(&self.txn_type)?;
        if self.nav_price <= 0.0 {
            return Err(LedgerError::InvalidData(
                "NAV price must be positive".to_string(),
            ));
        }
        if self.amount <= 0.0 {
            return Err(LedgerError::InvalidData(
                "Amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Display-ready transaction with scheme metadata joined on
#[derive(Queryable, Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub id: String,
    pub scheme_code: String,
    pub account_name: String,
    pub txn_type: String,
    pub plan_kind: Option<String>,
    pub amount: f64,
    pub units: f64,
    pub nav_price: f64,
    pub txn_date: NaiveDate,
    pub remarks: Option<String>,
    pub scheme_name: String,
    pub category: Option<String>,
    pub fund_house: Option<String>,
}
