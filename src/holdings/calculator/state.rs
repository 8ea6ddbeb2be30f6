use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::constants::{ROUNDING_SCALE, UNITS_EPSILON};
use crate::holdings::holdings_errors::{CalculatorError, Result};

/// Running weighted-average-cost state for one (scheme, account) pair.
///
/// All arithmetic happens in `Decimal`; callers convert back to `f64`
/// only at the snapshot boundary.
#[derive(Debug, Default, Clone)]
pub(super) struct HoldingState {
    pub(super) units: Decimal,
    /// Cost basis remaining against the units still held.
    pub(super) cost_basis: Decimal,
    /// Sum of all BUY amounts ever, untouched by sells.
    pub(super) gross_invested: Decimal,
    pub(super) realized_value: Decimal,
    pub(super) realized_pnl: Decimal,
    /// Average cost as of the last transaction, kept after a full exit
    /// so closed positions still display their entry price.
    last_avg_nav: Decimal,
    pub(super) first_txn_date: Option<NaiveDate>,
    pub(super) last_txn_date: Option<NaiveDate>,
}

fn to_decimal(value: f64, what: &str) -> Result<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| CalculatorError::Calculation(format!("Non-finite {}: {}", what, value)))
}

impl HoldingState {
    pub(super) fn apply_buy(&mut self, units: f64, amount: f64, date: NaiveDate) -> Result<()> {
        let units = to_decimal(units, "units")?;
        let amount = to_decimal(amount, "amount")?;

        self.units += units;
        self.cost_basis += amount;
        self.gross_invested += amount;
        if !self.units.is_zero() {
            self.last_avg_nav = (self.cost_basis / self.units).round_dp(ROUNDING_SCALE);
        }
        self.touch(date);
        Ok(())
    }

    pub(super) fn apply_sell(
        &mut self,
        scheme_code: &str,
        account_name: &str,
        units: f64,
        amount: f64,
        date: NaiveDate,
    ) -> Result<()> {
        let units_sold = to_decimal(units, "units")?;
        let amount = to_decimal(amount, "amount")?;
        let epsilon = Decimal::from_f64(UNITS_EPSILON).unwrap_or(Decimal::ZERO);

        if units_sold > self.units + epsilon {
            return Err(CalculatorError::UnitsNotHeld {
                scheme_code: scheme_code.to_string(),
                account_name: account_name.to_string(),
                requested: units_sold.to_f64().unwrap_or(0.0),
                held: self.units.to_f64().unwrap_or(0.0),
            });
        }

        let avg_cost_at_sale = if self.units.is_zero() {
            Decimal::ZERO
        } else {
            self.cost_basis / self.units
        };
        let cost_removed = (avg_cost_at_sale * units_sold).round_dp(ROUNDING_SCALE);
        self.last_avg_nav = avg_cost_at_sale.round_dp(ROUNDING_SCALE);

        self.units -= units_sold;
        self.cost_basis -= cost_removed;
        self.realized_value += amount;
        self.realized_pnl += amount - cost_removed;

        // Selling out entirely may leave float dust; clear it.
        if self.units.abs() <= epsilon {
            self.units = Decimal::ZERO;
            self.cost_basis = Decimal::ZERO;
        }
        self.touch(date);
        Ok(())
    }

    pub(super) fn avg_nav(&self) -> Decimal {
        if self.units.is_zero() {
            self.last_avg_nav
        } else {
            (self.cost_basis / self.units).round_dp(ROUNDING_SCALE)
        }
    }

    fn touch(&mut self, date: NaiveDate) {
        if self.first_txn_date.map_or(true, |d| date < d) {
            self.first_txn_date = Some(date);
        }
        if self.last_txn_date.map_or(true, |d| date > d) {
            self.last_txn_date = Some(date);
        }
    }
}
