use chrono::Utc;
use log::debug;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::constants::UNITS_EPSILON;
use crate::db::{DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::holdings::calculator::HoldingsCalculator;
use crate::holdings::holdings_errors::CalculatorError;
use crate::holdings::holdings_model::{
    is_units_significant, HoldingSnapshot, HoldingTotals, RedemptionRequest, TaxStatus,
};
use crate::ledger::{NewTransaction, Transaction, TransactionRepositoryTrait, TransactionType};
use crate::schemes::{Scheme, SchemeRepositoryTrait};

/// Trait defining the contract for holdings service implementations
pub trait HoldingsServiceTrait: Send + Sync {
    fn get_holdings(
        &self,
        plan_kind: Option<&str>,
        account_name: Option<&str>,
    ) -> Result<Vec<HoldingSnapshot>>;
    fn get_holding(&self, scheme_code: &str, account_name: &str) -> Result<HoldingSnapshot>;
    fn redeem(&self, request: RedemptionRequest) -> Result<Transaction>;
}

/// Plan kinds that funded each (scheme, account) position, read off its
/// BUY rows. Sells carry no plan kind; they net against the whole
/// position and never narrow a holding's view.
pub fn funded_plan_kinds(
    transactions: &[Transaction],
) -> HashMap<(String, String), BTreeSet<String>> {
    let mut plans: HashMap<(String, String), BTreeSet<String>> = HashMap::new();
    for transaction in transactions {
        if transaction.txn_type != TransactionType::Buy.as_str() {
            continue;
        }
        if let Some(plan) = &transaction.plan_kind {
            plans
                .entry((
                    transaction.scheme_code.clone(),
                    transaction.account_name.clone(),
                ))
                .or_default()
                .insert(plan.clone());
        }
    }
    plans
}

/// Derives holding snapshots from the ledger and processes redemptions
pub struct HoldingsService {
    pool: Arc<DbPool>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    scheme_repository: Arc<dyn SchemeRepositoryTrait>,
    calculator: HoldingsCalculator,
}

impl HoldingsService {
    pub fn new(
        pool: Arc<DbPool>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        scheme_repository: Arc<dyn SchemeRepositoryTrait>,
    ) -> Self {
        Self {
            pool,
            transaction_repository,
            scheme_repository,
            calculator: HoldingsCalculator::new(),
        }
    }

    fn build_snapshot(
        &self,
        scheme_code: String,
        account_name: String,
        totals: HoldingTotals,
        scheme: Option<&Scheme>,
    ) -> HoldingSnapshot {
        let current_nav = scheme.map_or(0.0, |s| s.net_asset_value);
        let current_value = totals.units * current_nav;
        let unrealized_pnl = current_value - totals.invested_amount;
        let return_pct = if totals.invested_amount > 0.0 {
            unrealized_pnl / totals.invested_amount * 100.0
        } else {
            0.0
        };
        let tax_status = totals
            .first_txn_date
            .map(|d| TaxStatus::classify(d, Utc::now().date_naive()));

        HoldingSnapshot {
            scheme_name: scheme.map_or_else(|| scheme_code.clone(), |s| s.scheme_name.clone()),
            category: scheme.and_then(|s| s.category.clone()),
            fund_house: scheme.and_then(|s| s.fund_house.clone()),
            scheme_code,
            account_name,
            units: totals.units,
            invested_amount: totals.invested_amount,
            gross_invested: totals.gross_invested,
            avg_nav: totals.avg_nav,
            current_nav,
            nav_date: scheme.and_then(|s| s.nav_date),
            current_value,
            unrealized_pnl,
            realized_value: totals.realized_value,
            realized_pnl: totals.realized_pnl,
            return_pct,
            first_invested_date: totals.first_txn_date,
            last_txn_date: totals.last_txn_date,
            tax_status,
        }
    }
}

impl HoldingsServiceTrait for HoldingsService {
    /// Open positions derived from the ledger, optionally narrowed to one
    /// plan kind or account. Fully redeemed holdings are dropped.
    ///
    /// The replay always covers each holding's full ledger: sells draw on
    /// the whole position regardless of which plan funded it, so a plan
    /// filter selects which holdings appear, never which rows back them.
    fn get_holdings(
        &self,
        plan_kind: Option<&str>,
        account_name: Option<&str>,
    ) -> Result<Vec<HoldingSnapshot>> {
        let transactions =
            self.transaction_repository
                .filter_transactions(None, account_name, None, None)?;
        let plans = funded_plan_kinds(&transactions);
        let totals = self.calculator.calculate(transactions)?;

        let schemes: HashMap<String, Scheme> = self
            .scheme_repository
            .get_schemes()?
            .into_iter()
            .map(|s| (s.scheme_code.clone(), s))
            .collect();

        let mut snapshots: Vec<HoldingSnapshot> = totals
            .into_iter()
            .filter(|(key, t)| {
                is_units_significant(t.units)
                    && plan_kind.map_or(true, |plan| {
                        plans.get(key).map_or(false, |kinds| kinds.contains(plan))
                    })
            })
            .map(|((scheme_code, account), t)| {
                let scheme = schemes.get(&scheme_code);
                self.build_snapshot(scheme_code, account, t, scheme)
            })
            .collect();

        snapshots.sort_by(|a, b| {
            a.scheme_name
                .cmp(&b.scheme_name)
                .then_with(|| a.account_name.cmp(&b.account_name))
        });
        Ok(snapshots)
    }

    fn get_holding(&self, scheme_code: &str, account_name: &str) -> Result<HoldingSnapshot> {
        let transactions = self
            .transaction_repository
            .get_transactions_for_holding(scheme_code, account_name)?;
        let totals = self
            .calculator
            .calculate_holding(transactions, scheme_code, account_name)?
            .ok_or_else(|| {
                Error::Ledger(crate::ledger::LedgerError::NotFound(format!(
                    "No holding for scheme {} in account {}",
                    scheme_code, account_name
                )))
            })?;

        let scheme = self.scheme_repository.get_scheme(scheme_code).ok();
        Ok(self.build_snapshot(
            scheme_code.to_string(),
            account_name.to_string(),
            totals,
            scheme.as_ref(),
        ))
    }

    /// Records a redemption as a SELL, rejecting it when the holding does
    /// not cover the derived units. The availability check and the insert
    /// run in one database transaction.
    fn redeem(&self, request: RedemptionRequest) -> Result<Transaction> {
        debug!(
            "Redeeming {} from scheme {} in account {}",
            request.amount, request.scheme_code, request.account_name
        );

        let repository = self.transaction_repository.clone();
        let calculator = self.calculator.clone();

        self.pool.execute(|conn| -> Result<Transaction> {
            let transactions = repository.get_transactions_for_holding_in_transaction(
                conn,
                &request.scheme_code,
                &request.account_name,
            )?;
            let held = calculator
                .calculate_holding(transactions, &request.scheme_code, &request.account_name)?
                .map_or(0.0, |t| t.units);

            let units_to_sell = request.amount / request.nav_price;
            if units_to_sell > held + UNITS_EPSILON {
                return Err(Error::Calculator(CalculatorError::UnitsNotHeld {
                    scheme_code: request.scheme_code.clone(),
                    account_name: request.account_name.clone(),
                    requested: units_to_sell,
                    held,
                }));
            }

            let sell = NewTransaction {
                id: None,
                scheme_code: request.scheme_code.clone(),
                account_name: request.account_name.clone(),
                txn_type: TransactionType::Sell.as_str().to_string(),
                plan_kind: None,
                amount: request.amount,
                units: None,
                nav_price: request.nav_price,
                txn_date: request.txn_date,
                remarks: request.remarks.clone(),
            };
            Ok(repository.create_in_transaction(conn, sell)?)
        })
    }
}
