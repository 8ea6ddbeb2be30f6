use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{LONG_TERM_DAYS, UNITS_EPSILON};

/// Returns true when a unit balance is large enough to count as a position.
pub fn is_units_significant(units: f64) -> bool {
    units.abs() > UNITS_EPSILON
}

/// Capital-gains classification of a holding.
///
/// A holding turns long-term once 365 days have passed since the first
/// purchase; exactly 365 days counts as long-term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxStatus {
    ShortTerm,
    LongTerm,
}

impl TaxStatus {
    pub fn classify(first_invested_date: NaiveDate, as_of: NaiveDate) -> Self {
        let held_days = (as_of - first_invested_date).num_days();
        if held_days >= LONG_TERM_DAYS {
            TaxStatus::LongTerm
        } else {
            TaxStatus::ShortTerm
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxStatus::ShortTerm => "SHORT_TERM",
            TaxStatus::LongTerm => "LONG_TERM",
        }
    }
}

/// Derived view of one (scheme, account) position. Never persisted; always
/// recomputed from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSnapshot {
    pub scheme_code: String,
    pub account_name: String,
    pub scheme_name: String,
    pub category: Option<String>,
    pub fund_house: Option<String>,
    pub units: f64,
    /// Remaining cost basis after sells under the weighted-average method.
    pub invested_amount: f64,
    /// Total BUY rupees over the life of the holding, before any sells.
    pub gross_invested: f64,
    pub avg_nav: f64,
    pub current_nav: f64,
    /// Date the current NAV was published, when the catalog knows it.
    pub nav_date: Option<NaiveDate>,
    pub current_value: f64,
    pub unrealized_pnl: f64,
    pub realized_value: f64,
    pub realized_pnl: f64,
    pub return_pct: f64,
    pub first_invested_date: Option<NaiveDate>,
    pub last_txn_date: Option<NaiveDate>,
    /// Capital-gains treatment the position would get if sold today,
    /// judged from the first purchase date.
    pub tax_status: Option<TaxStatus>,
}

/// Ledger replay totals for one (scheme, account) pair, before any NAV
/// is attached.
#[derive(Debug, Clone, Default)]
pub struct HoldingTotals {
    pub units: f64,
    pub invested_amount: f64,
    pub gross_invested: f64,
    pub avg_nav: f64,
    pub realized_value: f64,
    pub realized_pnl: f64,
    pub first_txn_date: Option<NaiveDate>,
    pub last_txn_date: Option<NaiveDate>,
}

/// Request to redeem part of a holding. Units are derived from the
/// amount/NAV identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRequest {
    pub scheme_code: String,
    pub account_name: String,
    pub amount: f64,
    pub nav_price: f64,
    pub txn_date: NaiveDate,
    pub remarks: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_term_at_exactly_365_days() {
        let bought = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let a_year_later = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(
            TaxStatus::classify(bought, a_year_later),
            TaxStatus::LongTerm
        );
    }

    #[test]
    fn short_term_below_365_days() {
        let bought = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let almost = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(TaxStatus::classify(bought, almost), TaxStatus::ShortTerm);
    }

    #[test]
    fn epsilon_units_are_not_significant() {
        assert!(!is_units_significant(0.00005));
        assert!(is_units_significant(0.5));
    }
}
