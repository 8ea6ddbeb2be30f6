use std::collections::HashMap;
use std::str::FromStr;

use log::{debug, error};
use rust_decimal::prelude::ToPrimitive;

use super::state::HoldingState;
use crate::holdings::holdings_errors::{CalculatorError, Result};
use crate::holdings::holdings_model::HoldingTotals;
use crate::ledger::{Transaction, TransactionType};

/// Key identifying a single holding: (scheme_code, account_name).
pub type HoldingKey = (String, String);

/// Replays ledger transactions into per-holding totals using the
/// weighted-average cost method.
///
/// Transactions are sorted chronologically before replay; within a day the
/// insertion order (created_at, then id) breaks ties so that a same-day
/// buy-then-sell pair replays in the order it was recorded.
#[derive(Default, Debug, Clone)]
pub struct HoldingsCalculator {}

impl HoldingsCalculator {
    pub fn new() -> Self {
        HoldingsCalculator {}
    }

    pub fn calculate(
        &self,
        mut transactions: Vec<Transaction>,
    ) -> Result<HashMap<HoldingKey, HoldingTotals>> {
        debug!("Replaying {} ledger transactions", transactions.len());

        transactions.sort_by(|a, b| {
            a.txn_date
                .cmp(&b.txn_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut states: HashMap<HoldingKey, HoldingState> = HashMap::new();

        for txn in &transactions {
            let key = (txn.scheme_code.clone(), txn.account_name.clone());
            let state = states.entry(key).or_default();

            let txn_type = TransactionType::from_str(&txn.txn_type).map_err(|_| {
                error!(
                    "Unsupported transaction type in ledger row {}: {}",
                    txn.id, txn.txn_type
                );
                CalculatorError::UnsupportedTransactionType(txn.txn_type.clone())
            })?;

            match txn_type {
                TransactionType::Buy => state.apply_buy(txn.units, txn.amount, txn.txn_date)?,
                TransactionType::Sell => state.apply_sell(
                    &txn.scheme_code,
                    &txn.account_name,
                    txn.units,
                    txn.amount,
                    txn.txn_date,
                )?,
            }
        }

        let mut totals = HashMap::with_capacity(states.len());
        for (key, state) in states {
            totals.insert(
                key,
                HoldingTotals {
                    units: state.units.to_f64().unwrap_or(0.0),
                    invested_amount: state.cost_basis.to_f64().unwrap_or(0.0),
                    gross_invested: state.gross_invested.to_f64().unwrap_or(0.0),
                    avg_nav: state.avg_nav().to_f64().unwrap_or(0.0),
                    realized_value: state.realized_value.to_f64().unwrap_or(0.0),
                    realized_pnl: state.realized_pnl.to_f64().unwrap_or(0.0),
                    first_txn_date: state.first_txn_date,
                    last_txn_date: state.last_txn_date,
                },
            );
        }
        Ok(totals)
    }

    /// Totals for a single holding; `None` when the pair has no history.
    pub fn calculate_holding(
        &self,
        transactions: Vec<Transaction>,
        scheme_code: &str,
        account_name: &str,
    ) -> Result<Option<HoldingTotals>> {
        let key = (scheme_code.to_string(), account_name.to_string());
        Ok(self.calculate(transactions)?.remove(&key))
    }
}
