use chrono::NaiveDate;

use crate::constants::DAYS_PER_YEAR;
use crate::portfolio::portfolio_errors::XirrError;

/// One dated cash flow: negative for money in, positive for money out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: f64,
}

impl CashFlow {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

const INITIAL_GUESS: f64 = 0.1;
const TOLERANCE: f64 = 1e-6;
const MAX_ITERATIONS: u32 = 100;
const RATE_FLOOR: f64 = -0.99;
const RATE_CEILING: f64 = 10.0;

/// Annualized internal rate of return for irregular cash flows, by
/// Newton-Raphson on the discounted-sum function.
///
/// Needs at least one inflow and one outflow; a series of same-signed
/// flows has no root and reports [`XirrError::NoConvergence`]. The rate
/// search stays inside (-99%, +1000%).
pub fn xirr(flows: &[CashFlow]) -> Result<f64, XirrError> {
    if flows.len() < 2 {
        return Err(XirrError::InsufficientCashFlows);
    }
    let has_negative = flows.iter().any(|f| f.amount < 0.0);
    let has_positive = flows.iter().any(|f| f.amount > 0.0);
    if !has_negative || !has_positive {
        return Err(XirrError::NoConvergence);
    }

    let t0 = flows
        .iter()
        .map(|f| f.date)
        .min()
        .ok_or(XirrError::InsufficientCashFlows)?;
    let years: Vec<f64> = flows
        .iter()
        .map(|f| (f.date - t0).num_days() as f64 / DAYS_PER_YEAR)
        .collect();

    let mut rate = INITIAL_GUESS;
    for _ in 0..MAX_ITERATIONS {
        let mut value = 0.0;
        let mut derivative = 0.0;
        for (flow, &t) in flows.iter().zip(&years) {
            let discount = (1.0 + rate).powf(t);
            value += flow.amount / discount;
            if t > 0.0 {
                derivative -= t * flow.amount / ((1.0 + rate).powf(t + 1.0));
            }
        }

        if value.abs() < TOLERANCE {
            return Ok(rate);
        }
        if derivative.abs() < f64::EPSILON || !derivative.is_finite() {
            return Err(XirrError::NoConvergence);
        }

        let next = rate - value / derivative;
        if !next.is_finite() || next <= RATE_FLOOR || next > RATE_CEILING {
            return Err(XirrError::NoConvergence);
        }
        rate = next;
    }

    Err(XirrError::NoConvergence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn single_year_round_trip_is_ten_percent() {
        let flows = vec![
            CashFlow::new(date("2023-01-01"), -1000.0),
            CashFlow::new(date("2024-01-01"), 1100.0),
        ];
        let rate = xirr(&flows).unwrap();
        assert!((rate - 0.10).abs() < 1e-4, "rate was {}", rate);
    }

    #[test]
    fn half_year_gain_annualizes_above_the_simple_return() {
        let flows = vec![
            CashFlow::new(date("2023-01-01"), -1000.0),
            // +5% over half a year is a little over 10% annualized
            CashFlow::new(date("2023-07-02"), 1050.0),
        ];
        let rate = xirr(&flows).unwrap();
        assert!(rate > 0.09 && rate < 0.12, "rate was {}", rate);
    }

    #[test]
    fn losing_position_has_a_negative_rate() {
        let flows = vec![
            CashFlow::new(date("2023-01-01"), -1000.0),
            CashFlow::new(date("2024-01-01"), 900.0),
        ];
        let rate = xirr(&flows).unwrap();
        assert!((rate + 0.10).abs() < 1e-4, "rate was {}", rate);
    }

    #[test]
    fn monthly_contributions_converge() {
        let mut flows: Vec<CashFlow> = (1..=12)
            .map(|m| CashFlow::new(NaiveDate::from_ymd_opt(2023, m, 5).unwrap(), -1000.0))
            .collect();
        flows.push(CashFlow::new(date("2024-01-05"), 12_600.0));

        let rate = xirr(&flows).unwrap();
        assert!(rate > 0.0 && rate < 0.25, "rate was {}", rate);
    }

    #[test]
    fn same_signed_flows_cannot_converge() {
        let flows = vec![
            CashFlow::new(date("2023-01-01"), -1000.0),
            CashFlow::new(date("2023-06-01"), -1000.0),
        ];
        assert!(matches!(xirr(&flows), Err(XirrError::NoConvergence)));
    }

    #[test]
    fn a_single_flow_is_rejected() {
        let flows = vec![CashFlow::new(date("2023-01-01"), -1000.0)];
        assert!(matches!(
            xirr(&flows),
            Err(XirrError::InsufficientCashFlows)
        ));
    }
}
