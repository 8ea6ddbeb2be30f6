use chrono::{Datelike, NaiveDate, Utc};
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::errors::Result;
use crate::holdings::{HoldingSnapshot, HoldingsServiceTrait, TaxStatus};
use crate::ledger::{Transaction, TransactionRepositoryTrait, TransactionType};
use crate::portfolio::insights::{analyze, HealthReport};
use crate::portfolio::portfolio_model::{
    AgeBucket, AgeSlice, GroupSlice, Grouping, HoldingView, PortfolioSummary, PortfolioView,
    RedemptionReadiness,
};
use crate::portfolio::xirr::{xirr, CashFlow};
use crate::schemes::{extract_amc, sub_category, AssetClass};

/// Trait defining the contract for portfolio service implementations
pub trait PortfolioServiceTrait: Send + Sync {
    fn get_portfolio(
        &self,
        plan_kind: Option<&str>,
        account_name: Option<&str>,
    ) -> Result<PortfolioView>;
    fn get_summary(
        &self,
        plan_kind: Option<&str>,
        account_name: Option<&str>,
    ) -> Result<PortfolioSummary>;
    fn get_xirr(&self, scheme_code: Option<&str>, account_name: Option<&str>) -> Result<f64>;
    fn get_grouped(
        &self,
        grouping: Grouping,
        plan_kind: Option<&str>,
        account_name: Option<&str>,
    ) -> Result<Vec<GroupSlice>>;
    fn get_redemption_readiness(&self, account_name: Option<&str>)
        -> Result<RedemptionReadiness>;
    fn get_age_buckets(&self, account_name: Option<&str>) -> Result<Vec<AgeSlice>>;
    fn get_health_report(
        &self,
        plan_kind: Option<&str>,
        account_name: Option<&str>,
    ) -> Result<HealthReport>;
}

/// Aggregates holdings into the portfolio view, groupings and the
/// money-weighted return
pub struct PortfolioService {
    holdings_service: Arc<dyn HoldingsServiceTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
}

impl PortfolioService {
    pub fn new(
        holdings_service: Arc<dyn HoldingsServiceTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    ) -> Self {
        Self {
            holdings_service,
            transaction_repository,
        }
    }

    /// Buys are money out of pocket, sells and the terminal value money
    /// back in. The terminal value is dated at the NAV observation it was
    /// priced with.
    fn cash_flows(
        transactions: &[Transaction],
        terminal_value: f64,
        terminal_date: NaiveDate,
    ) -> Vec<CashFlow> {
        let mut flows: Vec<CashFlow> = transactions
            .iter()
            .map(|t| {
                let amount = if t.txn_type == TransactionType::Sell.as_str() {
                    t.amount
                } else {
                    -t.amount
                };
                CashFlow::new(t.txn_date, amount)
            })
            .collect();
        if terminal_value > 0.0 {
            flows.push(CashFlow::new(terminal_date, terminal_value));
        }
        flows
    }

    fn summarize(holdings: &[HoldingSnapshot], portfolio_xirr: Option<f64>) -> PortfolioSummary {
        let total_invested: f64 = holdings.iter().map(|h| h.invested_amount).sum();
        let current_value: f64 = holdings.iter().map(|h| h.current_value).sum();
        let unrealized_pnl = current_value - total_invested;
        let realized_pnl: f64 = holdings.iter().map(|h| h.realized_pnl).sum();
        let return_pct = if total_invested > 0.0 {
            unrealized_pnl / total_invested * 100.0
        } else {
            0.0
        };

        PortfolioSummary {
            total_invested,
            current_value,
            unrealized_pnl,
            realized_pnl,
            return_pct,
            xirr: portfolio_xirr,
            holdings_count: holdings.len(),
        }
    }

    /// Whole months between two dates, counting a month only once its
    /// day-of-month has been reached.
    fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
        let raw = (to.year() as i64 - from.year() as i64) * 12
            + (to.month() as i64 - from.month() as i64)
            - if to.day() < from.day() { 1 } else { 0 };
        raw.max(0)
    }

    fn group_label(grouping: Grouping, holding: &HoldingSnapshot) -> String {
        match grouping {
            Grouping::Amc => extract_amc(holding.fund_house.as_deref(), &holding.scheme_name),
            Grouping::Category => sub_category(holding.category.as_deref())
                .unwrap_or_else(|| "Uncategorized".to_string()),
            Grouping::AssetClass => AssetClass::classify(holding.category.as_deref())
                .as_str()
                .to_string(),
            Grouping::Account => holding.account_name.clone(),
        }
    }
}

impl PortfolioServiceTrait for PortfolioService {
    fn get_portfolio(
        &self,
        plan_kind: Option<&str>,
        account_name: Option<&str>,
    ) -> Result<PortfolioView> {
        let holdings = self.holdings_service.get_holdings(plan_kind, account_name)?;
        // Flows always come off each holding's full ledger; a plan filter
        // narrows which holdings contribute, never which rows back them.
        let transactions =
            self.transaction_repository
                .filter_transactions(None, account_name, None, None)?;

        let mut by_holding: HashMap<(String, String), Vec<Transaction>> = HashMap::new();
        for transaction in transactions {
            by_holding
                .entry((
                    transaction.scheme_code.clone(),
                    transaction.account_name.clone(),
                ))
                .or_default()
                .push(transaction);
        }

        let today = Utc::now().date_naive();
        let current_value: f64 = holdings.iter().map(|h| h.current_value).sum();
        let portfolio_rows: Vec<Transaction> = if plan_kind.is_some() {
            holdings
                .iter()
                .flat_map(|h| {
                    by_holding
                        .get(&(h.scheme_code.clone(), h.account_name.clone()))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect()
        } else {
            by_holding.values().flatten().cloned().collect()
        };
        let portfolio_xirr =
            xirr(&Self::cash_flows(&portfolio_rows, current_value, today)).ok();
        debug!(
            "Portfolio view: {} holdings, value {:.2}",
            holdings.len(),
            current_value
        );

        let summary = Self::summarize(&holdings, portfolio_xirr);
        let holdings = holdings
            .into_iter()
            .map(|snapshot| {
                let own_xirr = by_holding
                    .get(&(snapshot.scheme_code.clone(), snapshot.account_name.clone()))
                    .and_then(|rows| {
                        // Each holding's value is priced at its scheme's
                        // NAV date, so the terminal flow lands there too.
                        let valued_on = snapshot.nav_date.unwrap_or(today);
                        xirr(&Self::cash_flows(rows, snapshot.current_value, valued_on)).ok()
                    });
                HoldingView {
                    snapshot,
                    xirr: own_xirr,
                }
            })
            .collect();

        Ok(PortfolioView { summary, holdings })
    }

    fn get_summary(
        &self,
        plan_kind: Option<&str>,
        account_name: Option<&str>,
    ) -> Result<PortfolioSummary> {
        Ok(self.get_portfolio(plan_kind, account_name)?.summary)
    }

    /// Money-weighted return for one holding or the whole portfolio.
    /// Unlike the summary, a non-converging series is surfaced as an
    /// error here.
    fn get_xirr(&self, scheme_code: Option<&str>, account_name: Option<&str>) -> Result<f64> {
        let transactions =
            self.transaction_repository
                .filter_transactions(scheme_code, account_name, None, None)?;

        let holdings = self.holdings_service.get_holdings(None, account_name)?;
        let selected: Vec<&HoldingSnapshot> = holdings
            .iter()
            .filter(|h| scheme_code.map_or(true, |code| h.scheme_code == code))
            .collect();
        let terminal_value: f64 = selected.iter().map(|h| h.current_value).sum();

        let today = Utc::now().date_naive();
        let terminal_date = match (scheme_code, selected.first()) {
            (Some(_), Some(holding)) => holding.nav_date.unwrap_or(today),
            _ => today,
        };

        Ok(xirr(&Self::cash_flows(&transactions, terminal_value, terminal_date))?)
    }

    fn get_grouped(
        &self,
        grouping: Grouping,
        plan_kind: Option<&str>,
        account_name: Option<&str>,
    ) -> Result<Vec<GroupSlice>> {
        let holdings = self.holdings_service.get_holdings(plan_kind, account_name)?;
        let total_value: f64 = holdings.iter().map(|h| h.current_value).sum();

        let mut buckets: HashMap<String, (f64, f64, usize)> = HashMap::new();
        for holding in &holdings {
            let label = Self::group_label(grouping, holding);
            let entry = buckets.entry(label).or_insert((0.0, 0.0, 0));
            entry.0 += holding.invested_amount;
            entry.1 += holding.current_value;
            entry.2 += 1;
        }

        let mut slices: Vec<GroupSlice> = buckets
            .into_iter()
            .map(|(label, (invested, value, count))| GroupSlice {
                label,
                invested_amount: invested,
                current_value: value,
                unrealized_pnl: value - invested,
                return_pct: if invested > 0.0 {
                    (value - invested) / invested * 100.0
                } else {
                    0.0
                },
                weight_pct: if total_value > 0.0 {
                    value / total_value * 100.0
                } else {
                    0.0
                },
                holdings_count: count,
            })
            .collect();

        slices.sort_by(|a, b| b.current_value.total_cmp(&a.current_value));
        Ok(slices)
    }

    fn get_redemption_readiness(
        &self,
        account_name: Option<&str>,
    ) -> Result<RedemptionReadiness> {
        let holdings = self.holdings_service.get_holdings(None, account_name)?;

        let mut readiness = RedemptionReadiness {
            long_term_value: 0.0,
            short_term_value: 0.0,
            long_term_holdings: 0,
            short_term_holdings: 0,
            long_term_pct: 0.0,
        };
        for holding in &holdings {
            match holding.tax_status {
                Some(TaxStatus::LongTerm) => {
                    readiness.long_term_value += holding.current_value;
                    readiness.long_term_holdings += 1;
                }
                Some(TaxStatus::ShortTerm) | None => {
                    readiness.short_term_value += holding.current_value;
                    readiness.short_term_holdings += 1;
                }
            }
        }

        let total = readiness.long_term_value + readiness.short_term_value;
        if total > 0.0 {
            readiness.long_term_pct = readiness.long_term_value / total * 100.0;
        }
        Ok(readiness)
    }

    /// Splits portfolio value by how long each holding has been open.
    /// Slices come back oldest first.
    fn get_age_buckets(&self, account_name: Option<&str>) -> Result<Vec<AgeSlice>> {
        let holdings = self.holdings_service.get_holdings(None, account_name)?;
        let today = Utc::now().date_naive();

        let mut buckets: BTreeMap<AgeBucket, (f64, f64, usize)> = BTreeMap::new();
        for holding in &holdings {
            let months = holding
                .first_invested_date
                .map(|d| Self::months_between(d, today))
                .unwrap_or(0);
            let entry = buckets
                .entry(AgeBucket::from_months(months))
                .or_insert((0.0, 0.0, 0));
            entry.0 += holding.invested_amount;
            entry.1 += holding.current_value;
            entry.2 += 1;
        }

        Ok(buckets
            .into_iter()
            .rev()
            .map(|(bucket, (invested, value, count))| AgeSlice {
                bucket,
                label: bucket.as_str().to_string(),
                invested_amount: invested,
                current_value: value,
                holdings_count: count,
            })
            .collect())
    }

    fn get_health_report(
        &self,
        plan_kind: Option<&str>,
        account_name: Option<&str>,
    ) -> Result<HealthReport> {
        let view = self.get_portfolio(plan_kind, account_name)?;
        let snapshots: Vec<HoldingSnapshot> = view
            .holdings
            .iter()
            .map(|h| h.snapshot.clone())
            .collect();
        Ok(analyze(&view.summary, &snapshots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date_str: &str, txn_type: &str, amount: f64) -> Transaction {
        let txn_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap();
        Transaction {
            id: "t1".to_string(),
            scheme_code: "120503".to_string(),
            account_name: "Default".to_string(),
            txn_type: txn_type.to_string(),
            plan_kind: None,
            amount,
            units: amount / 100.0,
            nav_price: 100.0,
            txn_date,
            remarks: None,
            created_at: txn_date.and_hms_opt(10, 0, 0).unwrap(),
            updated_at: txn_date.and_hms_opt(10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn terminal_value_lands_on_the_date_it_was_priced() {
        let rows = vec![row("2024-01-01", "BUY", 1000.0)];
        let valued_on = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();

        let flows = PortfolioService::cash_flows(&rows, 1100.0, valued_on);
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[1].date, valued_on);
        assert!((flows[1].amount - 1100.0).abs() < 1e-9);
    }

    #[test]
    fn buys_flow_out_and_sells_flow_in() {
        let rows = vec![
            row("2024-01-01", "BUY", 1000.0),
            row("2024-03-01", "SELL", 400.0),
        ];
        let flows =
            PortfolioService::cash_flows(&rows, 0.0, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

        assert_eq!(flows.len(), 2);
        assert!((flows[0].amount + 1000.0).abs() < 1e-9);
        assert!((flows[1].amount - 400.0).abs() < 1e-9);
    }
}
