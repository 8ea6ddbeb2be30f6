use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, ValidationError};
use crate::holdings::HoldingSnapshot;

/// Headline figures across every open holding in scope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_invested: f64,
    pub current_value: f64,
    pub unrealized_pnl: f64,
    pub realized_pnl: f64,
    pub return_pct: f64,
    /// Money-weighted annual return; absent when the solver cannot
    /// converge (e.g. a brand-new portfolio).
    pub xirr: Option<f64>,
    pub holdings_count: usize,
}

/// A holding enriched with its own money-weighted return
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingView {
    #[serde(flatten)]
    pub snapshot: HoldingSnapshot,
    /// Absent when the holding's own cash-flow series does not converge.
    pub xirr: Option<f64>,
}

/// Full portfolio view: the summary plus the holdings behind it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub summary: PortfolioSummary,
    pub holdings: Vec<HoldingView>,
}

/// Dimension a portfolio can be sliced along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grouping {
    Amc,
    Category,
    AssetClass,
    Account,
}

impl FromStr for Grouping {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_uppercase().as_str() {
            "AMC" => Ok(Grouping::Amc),
            "CATEGORY" => Ok(Grouping::Category),
            "ASSET_CLASS" => Ok(Grouping::AssetClass),
            "ACCOUNT" => Ok(Grouping::Account),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown grouping '{}'",
                other
            )))),
        }
    }
}

/// One slice of the portfolio along a grouping dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSlice {
    pub label: String,
    pub invested_amount: f64,
    pub current_value: f64,
    pub unrealized_pnl: f64,
    pub return_pct: f64,
    /// Share of the total portfolio value, in percent.
    pub weight_pct: f64,
    pub holdings_count: usize,
}

/// How long a holding has been open, in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeBucket {
    UnderOneYear,
    OneYear,
    TwoYears,
    ThreeYears,
    FourYears,
    FivePlusYears,
}

impl AgeBucket {
    pub fn from_months(months: i64) -> Self {
        match months / 12 {
            i64::MIN..=0 => AgeBucket::UnderOneYear,
            1 => AgeBucket::OneYear,
            2 => AgeBucket::TwoYears,
            3 => AgeBucket::ThreeYears,
            4 => AgeBucket::FourYears,
            _ => AgeBucket::FivePlusYears,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBucket::UnderOneYear => "<1Y",
            AgeBucket::OneYear => "1Y",
            AgeBucket::TwoYears => "2Y",
            AgeBucket::ThreeYears => "3Y",
            AgeBucket::FourYears => "4Y",
            AgeBucket::FivePlusYears => "5Y+",
        }
    }
}

/// One age bucket of the portfolio, oldest money first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeSlice {
    pub bucket: AgeBucket,
    pub label: String,
    pub invested_amount: f64,
    pub current_value: f64,
    pub holdings_count: usize,
}

/// Value split by capital-gains treatment, for planning redemptions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionReadiness {
    pub long_term_value: f64,
    pub short_term_value: f64,
    pub long_term_holdings: usize,
    pub short_term_holdings: usize,
    /// Share of portfolio value already past the long-term threshold.
    pub long_term_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_buckets_step_yearly_then_saturate() {
        assert_eq!(AgeBucket::from_months(0), AgeBucket::UnderOneYear);
        assert_eq!(AgeBucket::from_months(11), AgeBucket::UnderOneYear);
        assert_eq!(AgeBucket::from_months(12), AgeBucket::OneYear);
        assert_eq!(AgeBucket::from_months(23), AgeBucket::OneYear);
        assert_eq!(AgeBucket::from_months(48), AgeBucket::FourYears);
        assert_eq!(AgeBucket::from_months(60), AgeBucket::FivePlusYears);
        assert_eq!(AgeBucket::from_months(200), AgeBucket::FivePlusYears);
    }

    #[test]
    fn grouping_parses_case_insensitively() {
        use std::str::FromStr;
        assert_eq!(Grouping::from_str("amc").unwrap(), Grouping::Amc);
        assert_eq!(
            Grouping::from_str("ASSET_CLASS").unwrap(),
            Grouping::AssetClass
        );
        assert!(Grouping::from_str("FLAVOR").is_err());
    }
}
