use chrono::{Datelike, Utc};
use log::{debug, info};
use std::sync::Arc;

use crate::db::{DbPool, DbTransactionExecutor};
use crate::errors::Result;
use crate::holdings::HoldingsCalculator;
use crate::ledger::{NewTransaction, PlanKind, TransactionRepositoryTrait, TransactionType};
use crate::schemes::SchemeRepositoryTrait;
use crate::sip::reconciler::plan_reconciliation;
use crate::sip::sip_model::{
    BuyEdit, MandateStats, NewSipMandate, ReconcileOutcome, ReconcilePlan, ReconcileRequest,
    SipMandate, SipMandateUpdate, SipStatus,
};
use crate::sip::sip_traits::{SipRepositoryTrait, SipServiceTrait};

/// Service for SIP mandates: progress tracking and statement reconciliation
pub struct SipService {
    pool: Arc<DbPool>,
    repository: Arc<dyn SipRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    scheme_repository: Arc<dyn SchemeRepositoryTrait>,
    calculator: HoldingsCalculator,
}

impl SipService {
    pub fn new(
        pool: Arc<DbPool>,
        repository: Arc<dyn SipRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        scheme_repository: Arc<dyn SchemeRepositoryTrait>,
    ) -> Self {
        Self {
            pool,
            repository,
            transaction_repository,
            scheme_repository,
            calculator: HoldingsCalculator::new(),
        }
    }

    fn build_stats(&self, mandate: SipMandate) -> Result<MandateStats> {
        let sip_buys = self.transaction_repository.filter_transactions(
            Some(&mandate.scheme_code),
            Some(&mandate.account_name),
            Some(TransactionType::Buy.as_str()),
            Some(PlanKind::Sip.as_str()),
        )?;

        let today = Utc::now().date_naive();
        let actual_invested: f64 = sip_buys.iter().map(|t| t.amount).sum();
        let ledger_units: f64 = sip_buys.iter().map(|t| t.units).sum();
        let installments_paid = sip_buys.len() as i64;
        let is_paid_this_month = sip_buys
            .iter()
            .any(|t| t.txn_date.year() == today.year() && t.txn_date.month() == today.month());

        let target_amount = mandate.target_amount();
        let months_elapsed = mandate.months_elapsed(today);
        let progress_pct = if target_amount > 0.0 {
            actual_invested / target_amount * 100.0
        } else {
            0.0
        };

        let scheme_name = self
            .scheme_repository
            .get_scheme(&mandate.scheme_code)
            .map(|s| s.scheme_name)
            .unwrap_or_else(|_| mandate.scheme_code.clone());

        Ok(MandateStats {
            total_months: mandate.total_months(),
            months_elapsed,
            target_amount,
            expected_invested: months_elapsed as f64 * mandate.sip_amount,
            actual_invested,
            ledger_units,
            installments_paid,
            progress_pct,
            is_paid_this_month,
            scheme_name,
            mandate,
        })
    }

}

impl SipServiceTrait for SipService {
    fn get_mandate(&self, mandate_id: &str) -> Result<SipMandate> {
        Ok(self.repository.get_mandate(mandate_id)?)
    }

    fn list_mandates(&self, account_name: Option<&str>) -> Result<Vec<SipMandate>> {
        Ok(self.repository.get_mandates(account_name)?)
    }

    fn create_mandate(&self, new_mandate: NewSipMandate) -> Result<SipMandate> {
        debug!(
            "Registering SIP mandate for scheme {} in account {}",
            new_mandate.scheme_code, new_mandate.account_name
        );
        Ok(self.repository.create_mandate(new_mandate)?)
    }

    fn update_mandate(&self, update: SipMandateUpdate) -> Result<SipMandate> {
        Ok(self.repository.update_mandate(update)?)
    }

    /// Deletes a mandate, optionally wiping the SIP buys it generated.
    /// Returns the number of ledger rows removed.
    fn delete_mandate(&self, mandate_id: &str, delete_transactions: bool) -> Result<usize> {
        let mandate = self.repository.get_mandate(mandate_id)?;
        let repository = self.repository.clone();
        let transaction_repository = self.transaction_repository.clone();

        self.pool.execute(move |conn| -> Result<usize> {
            let removed = if delete_transactions {
                transaction_repository.delete_for_mandate_in_transaction(
                    conn,
                    &mandate.scheme_code,
                    &mandate.account_name,
                )?
            } else {
                0
            };
            repository.delete_in_transaction(conn, &mandate.id)?;
            Ok(removed)
        })
    }

    fn get_mandate_stats(&self, mandate_id: &str) -> Result<MandateStats> {
        let mandate = self.repository.get_mandate(mandate_id)?;
        self.build_stats(mandate)
    }

    fn list_mandate_stats(&self, account_name: Option<&str>) -> Result<Vec<MandateStats>> {
        let mandates = self.repository.get_mandates(account_name)?;
        mandates.into_iter().map(|m| self.build_stats(m)).collect()
    }

    /// Brings the ledger in line with a fund-house statement. The
    /// statement totals describe the whole folio, so the comparison runs
    /// against the full (scheme, account) position and the correction
    /// walk may touch any of its buys.
    ///
    /// The comparison, the decision and every resulting write share one
    /// database transaction, so a failed correction leaves the ledger
    /// untouched.
    fn reconcile_mandate(&self, request: ReconcileRequest) -> Result<ReconcileOutcome> {
        let mandate = self.repository.get_mandate(&request.mandate_id)?;
        let transaction_repository = self.transaction_repository.clone();
        let calculator = self.calculator.clone();

        self.pool.execute(move |conn| -> Result<ReconcileOutcome> {
            let rows = transaction_repository.get_transactions_for_holding_in_transaction(
                conn,
                &mandate.scheme_code,
                &mandate.account_name,
            )?;
            let totals = calculator
                .calculate_holding(rows, &mandate.scheme_code, &mandate.account_name)?
                .unwrap_or_default();

            let buys = transaction_repository.get_buys_newest_first_in_transaction(
                conn,
                &mandate.scheme_code,
                &mandate.account_name,
            )?;

            let plan = plan_reconciliation(
                totals.invested_amount,
                totals.units,
                request.statement_amount,
                request.statement_units,
                request.nav_price,
                request.is_redemption,
                &buys,
            )?;

            let amount_delta = request.statement_amount - totals.invested_amount;
            let units_delta = request.statement_units - totals.units;

            let (action, rows_changed) = match plan {
                ReconcilePlan::InSync => ("IN_SYNC", 0),
                ReconcilePlan::RecordBuy { amount, units } => {
                    // Catch-up rows cover installments bought at past NAVs,
                    // so the NAV the statement implies is stamped, not the
                    // market NAV. Keeps the amount/units/NAV identity.
                    transaction_repository.create_in_transaction(
                        conn,
                        NewTransaction {
                            id: None,
                            scheme_code: mandate.scheme_code.clone(),
                            account_name: mandate.account_name.clone(),
                            txn_type: TransactionType::Buy.as_str().to_string(),
                            plan_kind: Some(PlanKind::Sip.as_str().to_string()),
                            amount,
                            units: Some(units),
                            nav_price: amount / units,
                            txn_date: request.txn_date,
                            remarks: request.remarks.clone(),
                        },
                    )?;
                    ("BUY_RECORDED", 1)
                }
                ReconcilePlan::RecordSell { amount, units } => {
                    transaction_repository.create_in_transaction(
                        conn,
                        NewTransaction {
                            id: None,
                            scheme_code: mandate.scheme_code.clone(),
                            account_name: mandate.account_name.clone(),
                            txn_type: TransactionType::Sell.as_str().to_string(),
                            plan_kind: None,
                            amount,
                            units: Some(units),
                            nav_price: amount / units,
                            txn_date: request.txn_date,
                            remarks: request.remarks.clone(),
                        },
                    )?;
                    ("SELL_RECORDED", 1)
                }
                ReconcilePlan::Correct { edits } => {
                    let count = edits.len();
                    for edit in edits {
                        match edit {
                            BuyEdit::Remove { transaction_id } => {
                                transaction_repository
                                    .delete_in_transaction(conn, &transaction_id)?;
                            }
                            BuyEdit::Shrink {
                                transaction_id,
                                new_amount,
                                new_units,
                            } => {
                                transaction_repository.shrink_in_transaction(
                                    conn,
                                    &transaction_id,
                                    new_amount,
                                    new_units,
                                )?;
                            }
                        }
                    }
                    ("CORRECTED", count)
                }
            };

            info!(
                "Reconciled mandate {}: {} ({} rows changed)",
                mandate.id, action, rows_changed
            );
            Ok(ReconcileOutcome {
                mandate_id: mandate.id.clone(),
                action: action.to_string(),
                amount_delta,
                units_delta,
                rows_changed,
            })
        })
    }

    /// Folds a finished SIP into a lumpsum position: relabels its buys
    /// and marks the mandate completed, atomically. Returns the number
    /// of buys relabeled.
    fn convert_to_lumpsum(&self, mandate_id: &str) -> Result<usize> {
        let mandate = self.repository.get_mandate(mandate_id)?;
        let repository = self.repository.clone();
        let transaction_repository = self.transaction_repository.clone();

        self.pool.execute(move |conn| -> Result<usize> {
            let converted = transaction_repository.convert_plan_in_transaction(
                conn,
                &mandate.scheme_code,
                &mandate.account_name,
            )?;
            repository.set_status_in_transaction(conn, &mandate.id, SipStatus::Completed)?;
            info!(
                "Converted mandate {} to lumpsum ({} buys relabeled)",
                mandate.id, converted
            );
            Ok(converted)
        })
    }
}
