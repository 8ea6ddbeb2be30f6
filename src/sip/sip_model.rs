use chrono::{Datelike, NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::sip::sip_errors::{Result, SipError};

/// Lifecycle state of a SIP mandate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SipStatus {
    Active,
    Inactive,
    Completed,
}

impl SipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SipStatus::Active => "ACTIVE",
            SipStatus::Inactive => "INACTIVE",
            SipStatus::Completed => "COMPLETED",
        }
    }
}

impl FromStr for SipStatus {
    type Err = SipError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACTIVE" => Ok(SipStatus::Active),
            "INACTIVE" => Ok(SipStatus::Inactive),
            "COMPLETED" => Ok(SipStatus::Completed),
            other => Err(SipError::InvalidData(format!(
                "Unknown SIP status '{}'",
                other
            ))),
        }
    }
}

/// A monthly SIP commitment for one (scheme, account) pair.
#[derive(
    Queryable,
    Selectable,
    Identifiable,
    Insertable,
    AsChangeset,
    Serialize,
    Deserialize,
    PartialEq,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::sip_mandates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct SipMandate {
    pub id: String,
    pub scheme_code: String,
    pub account_name: String,
    pub sip_amount: f64,
    pub start_date: NaiveDate,
    pub duration_years: f64,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl SipMandate {
    pub fn total_months(&self) -> i64 {
        (self.duration_years * 12.0).round() as i64
    }

    pub fn target_amount(&self) -> f64 {
        self.total_months() as f64 * self.sip_amount
    }

    /// Whole months since the start date, counting the current month once
    /// its installment day has been reached, clamped to the mandate term.
    pub fn months_elapsed(&self, as_of: NaiveDate) -> i64 {
        let raw = (as_of.year() as i64 - self.start_date.year() as i64) * 12
            + (as_of.month() as i64 - self.start_date.month() as i64)
            + if as_of.day() >= self.start_date.day() {
                1
            } else {
                0
            };
        raw.clamp(0, self.total_months())
    }
}

/// Input model for registering a new SIP mandate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSipMandate {
    pub id: Option<String>,
    pub scheme_code: String,
    pub account_name: String,
    pub sip_amount: f64,
    pub start_date: NaiveDate,
    pub duration_years: f64,
}

impl NewSipMandate {
    pub fn validate(&self) -> Result<()> {
        if self.scheme_code.trim().is_empty() {
            return Err(SipError::InvalidData(
                "Scheme code cannot be empty".to_string(),
            ));
        }
        if self.account_name.trim().is_empty() {
            return Err(SipError::InvalidData(
                "Account name cannot be empty".to_string(),
            ));
        }
        if self.sip_amount <= 0.0 {
            return Err(SipError::InvalidData(
                "SIP amount must be positive".to_string(),
            ));
        }
        if self.duration_years <= 0.0 {
            return Err(SipError::InvalidData(
                "Duration must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input model for editing an existing SIP mandate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SipMandateUpdate {
    pub id: String,
    pub sip_amount: f64,
    pub start_date: NaiveDate,
    pub duration_years: f64,
    pub status: String,
}

impl SipMandateUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(SipError::InvalidData(
                "Mandate ID is required for updates".to_string(),
            ));
        }
        if self.sip_amount <= 0.0 {
            return Err(SipError::InvalidData(
                "SIP amount must be positive".to_string(),
            ));
        }
        if self.duration_years <= 0.0 {
            return Err(SipError::InvalidData(
                "Duration must be positive".to_string(),
            ));
        }
        SipStatus::from_str(&self.status)?;
        Ok(())
    }
}

/// Progress view of one mandate against its SIP ledger rows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandateStats {
    pub mandate: SipMandate,
    pub scheme_name: String,
    pub total_months: i64,
    pub months_elapsed: i64,
    pub target_amount: f64,
    pub expected_invested: f64,
    pub actual_invested: f64,
    pub ledger_units: f64,
    pub installments_paid: i64,
    pub progress_pct: f64,
    pub is_paid_this_month: bool,
}

/// Statement figures a mandate is reconciled against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    pub mandate_id: String,
    pub statement_amount: f64,
    pub statement_units: f64,
    pub nav_price: f64,
    pub txn_date: NaiveDate,
    /// A shortfall is treated as a redemption instead of a data fix.
    pub is_redemption: bool,
    pub remarks: Option<String>,
}

/// One planned mutation of an existing BUY row during a correction walk.
#[derive(Debug, Clone, PartialEq)]
pub enum BuyEdit {
    Remove {
        transaction_id: String,
    },
    Shrink {
        transaction_id: String,
        new_amount: f64,
        new_units: f64,
    },
}

/// What reconciliation decided to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcilePlan {
    /// Ledger and statement agree within tolerance.
    InSync,
    /// Statement shows more than the ledger: record a catch-up BUY.
    RecordBuy { amount: f64, units: f64 },
    /// Confirmed redemption: record a SELL for the shortfall.
    RecordSell { amount: f64, units: f64 },
    /// Data fix: unwind recent buys until the ledger matches.
    Correct { edits: Vec<BuyEdit> },
}

/// Result of applying a reconciliation plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub mandate_id: String,
    pub action: String,
    pub amount_delta: f64,
    pub units_delta: f64,
    pub rows_changed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn mandate(start: NaiveDate, years: f64, amount: f64) -> SipMandate {
        SipMandate {
            id: "m1".to_string(),
            scheme_code: "120503".to_string(),
            account_name: "Default".to_string(),
            sip_amount: amount,
            start_date: start,
            duration_years: years,
            status: "ACTIVE".to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn target_is_months_times_amount() {
        let m = mandate(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 2.0, 1000.0);
        assert_eq!(m.total_months(), 24);
        assert!((m.target_amount() - 24_000.0).abs() < 1e-9);
    }

    #[test]
    fn months_elapsed_counts_current_month_after_installment_day() {
        let m = mandate(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 2.0, 1000.0);
        let before_day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let on_day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(m.months_elapsed(before_day), 2);
        assert_eq!(m.months_elapsed(on_day), 3);
    }

    #[test]
    fn months_elapsed_is_clamped_to_the_term() {
        let m = mandate(NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(), 1.0, 1000.0);
        let far_future = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(m.months_elapsed(far_future), 12);

        let before_start = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap();
        assert_eq!(m.months_elapsed(before_start), 0);
    }
}
