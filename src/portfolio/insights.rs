use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::holdings::HoldingSnapshot;
use crate::portfolio::portfolio_model::PortfolioSummary;
use crate::schemes::{extract_amc, AssetClass};

const BASE_SCORE: i32 = 50;
const INFLATION_PCT: f64 = 6.0;
const CONCENTRATION_LIMIT_PCT: f64 = 40.0;
const EQUITY_HEAVY_PCT: f64 = 90.0;
const DEBT_CUSHION_PCT: f64 = 10.0;
const AMC_LIMIT_PCT: f64 = 40.0;
const INDEX_MEANINGFUL_PCT: f64 = 5.0;
const DIP_PCT: f64 = -10.0;
const STAR_PCT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Good,
    Warning,
    Suggestion,
}

/// One observation about the portfolio's health
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub severity: Severity,
    pub title: String,
    pub detail: String,
    pub score_delta: i32,
}

/// Rule-based health check over the whole portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// 0 to 100, anchored at 50 for an empty slate.
    pub score: i32,
    pub insights: Vec<Insight>,
}

/// Scores the portfolio against a fixed set of allocation and return
/// heuristics. Each triggered rule contributes an insight and shifts the
/// score from its base of 50.
pub fn analyze(summary: &PortfolioSummary, holdings: &[HoldingSnapshot]) -> HealthReport {
    let mut insights = Vec::new();
    let total_value: f64 = holdings.iter().map(|h| h.current_value).sum();

    if let Some(xirr) = summary.xirr {
        let xirr_pct = xirr * 100.0;
        if xirr_pct > INFLATION_PCT {
            insights.push(Insight {
                severity: Severity::Good,
                title: "Beating inflation".to_string(),
                detail: format!(
                    "Annualized return of {:.1}% is ahead of the {:.0}% inflation mark",
                    xirr_pct, INFLATION_PCT
                ),
                score_delta: 10,
            });
        } else {
            insights.push(Insight {
                severity: Severity::Warning,
                title: "Trailing inflation".to_string(),
                detail: format!(
                    "Annualized return of {:.1}% is below the {:.0}% inflation mark",
                    xirr_pct, INFLATION_PCT
                ),
                score_delta: -10,
            });
        }
    }

    if total_value > 0.0 {
        if let Some(top) = holdings
            .iter()
            .max_by(|a, b| a.current_value.total_cmp(&b.current_value))
        {
            let weight = top.current_value / total_value * 100.0;
            if weight > CONCENTRATION_LIMIT_PCT {
                insights.push(Insight {
                    severity: Severity::Warning,
                    title: "Concentrated position".to_string(),
                    detail: format!(
                        "{} makes up {:.0}% of the portfolio",
                        top.scheme_name, weight
                    ),
                    score_delta: -10,
                });
            }
        }

        let mut class_values: HashMap<AssetClass, f64> = HashMap::new();
        for h in holdings {
            *class_values
                .entry(AssetClass::classify(h.category.as_deref()))
                .or_insert(0.0) += h.current_value;
        }
        let equity_pct =
            class_values.get(&AssetClass::Equity).copied().unwrap_or(0.0) / total_value * 100.0;
        let debt_pct =
            class_values.get(&AssetClass::Debt).copied().unwrap_or(0.0) / total_value * 100.0;

        if equity_pct > EQUITY_HEAVY_PCT {
            insights.push(Insight {
                severity: Severity::Warning,
                title: "Equity heavy".to_string(),
                detail: format!("Equity funds hold {:.0}% of the portfolio", equity_pct),
                score_delta: -5,
            });
        }
        if debt_pct >= DEBT_CUSHION_PCT {
            insights.push(Insight {
                severity: Severity::Good,
                title: "Debt cushion in place".to_string(),
                detail: format!("Debt funds hold {:.0}% of the portfolio", debt_pct),
                score_delta: 5,
            });
        } else {
            insights.push(Insight {
                severity: Severity::Suggestion,
                title: "Thin debt cushion".to_string(),
                detail: format!(
                    "Debt funds hold only {:.0}%; {:.0}% would soften drawdowns",
                    debt_pct, DEBT_CUSHION_PCT
                ),
                score_delta: -5,
            });
        }

        let mut amc_values: HashMap<String, f64> = HashMap::new();
        for h in holdings {
            let amc = extract_amc(h.fund_house.as_deref(), &h.scheme_name);
            *amc_values.entry(amc).or_insert(0.0) += h.current_value;
        }
        if let Some((amc, value)) = amc_values
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
        {
            let weight = value / total_value * 100.0;
            if weight > AMC_LIMIT_PCT && amc_values.len() > 1 {
                insights.push(Insight {
                    severity: Severity::Warning,
                    title: "Single fund house dominates".to_string(),
                    detail: format!("{} manages {:.0}% of the portfolio", amc, weight),
                    score_delta: -5,
                });
            }
        }

        let index_value: f64 = holdings
            .iter()
            .filter(|h| h.scheme_name.to_lowercase().contains("index"))
            .map(|h| h.current_value)
            .sum();
        if index_value / total_value * 100.0 > INDEX_MEANINGFUL_PCT {
            insights.push(Insight {
                severity: Severity::Good,
                title: "Passive exposure".to_string(),
                detail: "Index funds form a meaningful share of the portfolio".to_string(),
                score_delta: 5,
            });
        }

        if let Some(star) = holdings
            .iter()
            .filter(|h| h.return_pct > STAR_PCT)
            .max_by(|a, b| a.return_pct.total_cmp(&b.return_pct))
        {
            insights.push(Insight {
                severity: Severity::Good,
                title: "Star performer".to_string(),
                detail: format!(
                    "{} is up {:.0}% from cost",
                    star.scheme_name, star.return_pct
                ),
                score_delta: 5,
            });
        }

        let dips: Vec<&HoldingSnapshot> =
            holdings.iter().filter(|h| h.return_pct < DIP_PCT).collect();
        if !dips.is_empty() {
            insights.push(Insight {
                severity: Severity::Suggestion,
                title: "Averaging opportunity".to_string(),
                detail: format!(
                    "{} holding(s) are down more than {:.0}% from cost",
                    dips.len(),
                    -DIP_PCT
                ),
                score_delta: 0,
            });
        }
    }

    let score = (BASE_SCORE + insights.iter().map(|i| i.score_delta).sum::<i32>()).clamp(0, 100);
    HealthReport { score, insights }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(name: &str, category: &str, invested: f64, value: f64) -> HoldingSnapshot {
        HoldingSnapshot {
            scheme_code: name.to_string(),
            account_name: "Default".to_string(),
            scheme_name: name.to_string(),
            category: Some(category.to_string()),
            fund_house: None,
            units: 1.0,
            invested_amount: invested,
            gross_invested: invested,
            avg_nav: invested,
            current_nav: value,
            nav_date: None,
            current_value: value,
            unrealized_pnl: value - invested,
            realized_value: 0.0,
            realized_pnl: 0.0,
            return_pct: if invested > 0.0 {
                (value - invested) / invested * 100.0
            } else {
                0.0
            },
            first_invested_date: None,
            last_txn_date: None,
            tax_status: None,
        }
    }

    fn summary(xirr: Option<f64>) -> PortfolioSummary {
        PortfolioSummary {
            total_invested: 10_000.0,
            current_value: 11_000.0,
            unrealized_pnl: 1000.0,
            realized_pnl: 0.0,
            return_pct: 10.0,
            xirr,
            holdings_count: 2,
        }
    }

    #[test]
    fn good_portfolio_scores_above_base() {
        let holdings = vec![
            snapshot("Nifty Index Fund", "Equity Scheme - Index Fund", 6000.0, 6600.0),
            snapshot("Liquid Fund", "Debt Scheme - Liquid Fund", 4000.0, 4400.0),
        ];
        let report = analyze(&summary(Some(0.12)), &holdings);
        assert!(report.score > BASE_SCORE, "score was {}", report.score);
    }

    #[test]
    fn concentrated_equity_portfolio_is_flagged() {
        let holdings = vec![snapshot(
            "Small Cap Fund",
            "Equity Scheme - Small Cap Fund",
            10_000.0,
            11_000.0,
        )];
        let report = analyze(&summary(Some(0.03)), &holdings);

        assert!(report.score < BASE_SCORE, "score was {}", report.score);
        assert!(report
            .insights
            .iter()
            .any(|i| i.title == "Concentrated position"));
        assert!(report
            .insights
            .iter()
            .any(|i| i.title == "Trailing inflation"));
    }

    #[test]
    fn empty_portfolio_sits_at_base_score() {
        let report = analyze(&summary(None), &[]);
        assert_eq!(report.score, BASE_SCORE);
    }

    #[test]
    fn a_big_winner_earns_a_star() {
        let holdings = vec![
            snapshot("Flexi Cap Fund", "Equity Scheme - Flexi Cap Fund", 5000.0, 6500.0),
            snapshot("Liquid Fund", "Debt Scheme - Liquid Fund", 5000.0, 5100.0),
        ];
        let report = analyze(&summary(None), &holdings);
        assert!(report.insights.iter().any(|i| i.title == "Star performer"));
    }

    #[test]
    fn deep_dips_surface_an_averaging_suggestion() {
        let holdings = vec![
            snapshot("Fallen Fund", "Equity Scheme - Mid Cap Fund", 1000.0, 800.0),
            snapshot("Liquid Fund", "Debt Scheme - Liquid Fund", 9000.0, 9100.0),
        ];
        let report = analyze(&summary(None), &holdings);
        assert!(report
            .insights
            .iter()
            .any(|i| i.title == "Averaging opportunity"));
    }
}
