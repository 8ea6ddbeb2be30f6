use crate::constants::{AMOUNT_TOLERANCE, UNITS_TOLERANCE};
use crate::ledger::Transaction;
use crate::sip::sip_errors::{Result, SipError};
use crate::sip::sip_model::{BuyEdit, ReconcilePlan};

/// Decides how to bring the ledger in line with a statement.
///
/// The decision is pure: callers load the current totals and the BUY rows
/// (newest first) and apply the returned plan atomically.
///
/// A surplus on the statement becomes a catch-up BUY. A shortfall becomes
/// a SELL when the caller confirms a redemption happened; otherwise it is
/// treated as bad data and recent buys are unwound, newest first, until
/// the ledger matches.
pub fn plan_reconciliation(
    ledger_invested: f64,
    ledger_units: f64,
    statement_amount: f64,
    statement_units: f64,
    nav_price: f64,
    is_redemption: bool,
    buys_newest_first: &[Transaction],
) -> Result<ReconcilePlan> {
    if nav_price <= 0.0 {
        return Err(SipError::InvalidData(
            "NAV price must be positive".to_string(),
        ));
    }

    let amount_delta = statement_amount - ledger_invested;
    let units_delta = statement_units - ledger_units;

    if amount_delta.abs() <= AMOUNT_TOLERANCE && units_delta.abs() <= UNITS_TOLERANCE {
        return Ok(ReconcilePlan::InSync);
    }

    // The amount delta drives the direction; the units delta only takes
    // over when the amounts agree within tolerance.
    let (driving_amount, driving_units) = if amount_delta.abs() > AMOUNT_TOLERANCE {
        let units = if units_delta.abs() > UNITS_TOLERANCE {
            units_delta
        } else {
            amount_delta / nav_price
        };
        (amount_delta, units)
    } else {
        (units_delta * nav_price, units_delta)
    };

    if driving_amount > 0.0 {
        return Ok(ReconcilePlan::RecordBuy {
            amount: driving_amount,
            units: driving_units,
        });
    }

    if is_redemption {
        return Ok(ReconcilePlan::RecordSell {
            amount: -driving_amount,
            units: -driving_units,
        });
    }

    // Correction walk: unwind the most recent buys until the overstated
    // amount is gone. A partially covered buy is shrunk, not removed.
    let mut remaining = -driving_amount;
    let mut edits = Vec::new();
    for buy in buys_newest_first {
        if remaining <= AMOUNT_TOLERANCE {
            break;
        }
        if remaining >= buy.amount - AMOUNT_TOLERANCE {
            edits.push(BuyEdit::Remove {
                transaction_id: buy.id.clone(),
            });
            remaining -= buy.amount;
        } else {
            let new_amount = buy.amount - remaining;
            edits.push(BuyEdit::Shrink {
                transaction_id: buy.id.clone(),
                new_amount,
                new_units: new_amount / buy.nav_price,
            });
            remaining = 0.0;
        }
    }

    if remaining > AMOUNT_TOLERANCE {
        return Err(SipError::InsufficientHistory(format!(
            "Ledger buys cover only part of the {:.2} overstatement; {:.2} left unmatched",
            -driving_amount, remaining
        )));
    }

    Ok(ReconcilePlan::Correct { edits })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::NewTransaction;
    use chrono::NaiveDate;

    fn buy(id: &str, date_str: &str, amount: f64, nav: f64) -> Transaction {
        let txn_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap();
        Transaction {
            id: id.to_string(),
            scheme_code: "120503".to_string(),
            account_name: "Default".to_string(),
            txn_type: "BUY".to_string(),
            plan_kind: Some("SIP".to_string()),
            amount,
            units: amount / nav,
            nav_price: nav,
            txn_date,
            remarks: None,
            created_at: txn_date.and_hms_opt(10, 0, 0).unwrap(),
            updated_at: txn_date.and_hms_opt(10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn within_tolerance_is_in_sync() {
        let plan = plan_reconciliation(2000.5, 100.0004, 2000.0, 100.0, 20.0, false, &[]).unwrap();
        assert_eq!(plan, ReconcilePlan::InSync);
    }

    #[test]
    fn surplus_becomes_a_catch_up_buy() {
        let plan = plan_reconciliation(1000.0, 100.0, 1500.0, 150.0, 10.0, false, &[]).unwrap();
        match plan {
            ReconcilePlan::RecordBuy { amount, units } => {
                assert!((amount - 500.0).abs() < 1e-9);
                assert!((units - 50.0).abs() < 1e-9);
            }
            other => panic!("expected RecordBuy, got {:?}", other),
        }
    }

    #[test]
    fn surplus_without_units_derives_them_from_nav() {
        let plan = plan_reconciliation(1000.0, 100.0, 1500.0, 100.0, 10.0, false, &[]).unwrap();
        match plan {
            ReconcilePlan::RecordBuy { units, .. } => assert!((units - 50.0).abs() < 1e-9),
            other => panic!("expected RecordBuy, got {:?}", other),
        }
    }

    #[test]
    fn confirmed_shortfall_becomes_a_sell() {
        let plan = plan_reconciliation(1000.0, 100.0, 600.0, 60.0, 10.0, true, &[]).unwrap();
        match plan {
            ReconcilePlan::RecordSell { amount, units } => {
                assert!((amount - 400.0).abs() < 1e-9);
                assert!((units - 40.0).abs() < 1e-9);
            }
            other => panic!("expected RecordSell, got {:?}", other),
        }
    }

    #[test]
    fn unconfirmed_shortfall_shrinks_the_newest_buy() {
        let buys = vec![buy("feb", "2024-02-05", 1000.0, 10.0)];
        let plan = plan_reconciliation(1000.0, 100.0, 600.0, 60.0, 10.0, false, &buys).unwrap();

        assert_eq!(
            plan,
            ReconcilePlan::Correct {
                edits: vec![BuyEdit::Shrink {
                    transaction_id: "feb".to_string(),
                    new_amount: 600.0,
                    new_units: 60.0,
                }]
            }
        );
    }

    #[test]
    fn deep_correction_removes_whole_buys_then_shrinks() {
        // 3000 on the ledger, statement says 200: drop the newest 1000,
        // drop the next 1000, shrink the oldest to 200.
        let buys = vec![
            buy("mar", "2024-03-05", 1000.0, 10.0),
            buy("feb", "2024-02-05", 1000.0, 10.0),
            buy("jan", "2024-01-05", 1000.0, 10.0),
        ];
        let plan = plan_reconciliation(3000.0, 300.0, 200.0, 20.0, 10.0, false, &buys).unwrap();

        assert_eq!(
            plan,
            ReconcilePlan::Correct {
                edits: vec![
                    BuyEdit::Remove {
                        transaction_id: "mar".to_string()
                    },
                    BuyEdit::Remove {
                        transaction_id: "feb".to_string()
                    },
                    BuyEdit::Shrink {
                        transaction_id: "jan".to_string(),
                        new_amount: 200.0,
                        new_units: 20.0,
                    },
                ]
            }
        );
    }

    #[test]
    fn correction_walk_leaves_older_buys_untouched() {
        // Removing 1800 consumes the newest buy whole and shrinks the
        // next one; the oldest never enters the walk.
        let buys = vec![
            buy("mar", "2024-03-05", 1000.0, 10.0),
            buy("feb", "2024-02-05", 1000.0, 10.0),
            buy("jan", "2024-01-05", 1000.0, 10.0),
        ];
        let plan = plan_reconciliation(3000.0, 300.0, 1200.0, 120.0, 10.0, false, &buys).unwrap();

        assert_eq!(
            plan,
            ReconcilePlan::Correct {
                edits: vec![
                    BuyEdit::Remove {
                        transaction_id: "mar".to_string()
                    },
                    BuyEdit::Shrink {
                        transaction_id: "feb".to_string(),
                        new_amount: 200.0,
                        new_units: 20.0,
                    },
                ]
            }
        );
    }

    #[test]
    fn catch_up_buy_at_historic_navs_keeps_the_ledger_identity() {
        // Statement units reflect installments bought at much lower NAVs
        // than today's. The row is stamped with the NAV the statement
        // implies, so it still satisfies the amount/units/NAV identity.
        let plan = plan_reconciliation(0.0, 0.0, 2000.0, 190.0, 12.0, false, &[]).unwrap();
        let (amount, units) = match plan {
            ReconcilePlan::RecordBuy { amount, units } => (amount, units),
            other => panic!("expected RecordBuy, got {:?}", other),
        };

        let row = NewTransaction {
            id: None,
            scheme_code: "120503".to_string(),
            account_name: "Default".to_string(),
            txn_type: "BUY".to_string(),
            plan_kind: Some("SIP".to_string()),
            amount,
            units: Some(units),
            nav_price: amount / units,
            txn_date: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            remarks: None,
        };
        assert!(row.validate().is_ok());
    }

    #[test]
    fn exact_cover_removes_without_a_shrink() {
        let buys = vec![
            buy("feb", "2024-02-05", 1000.0, 10.0),
            buy("jan", "2024-01-05", 1000.0, 10.0),
        ];
        let plan = plan_reconciliation(2000.0, 200.0, 1000.0, 100.0, 10.0, false, &buys).unwrap();

        assert_eq!(
            plan,
            ReconcilePlan::Correct {
                edits: vec![BuyEdit::Remove {
                    transaction_id: "feb".to_string()
                }]
            }
        );
    }

    #[test]
    fn overstatement_beyond_history_is_an_error() {
        let buys = vec![buy("jan", "2024-01-05", 1000.0, 10.0)];
        let result = plan_reconciliation(5000.0, 500.0, 1000.0, 100.0, 10.0, false, &buys);
        assert!(matches!(result, Err(SipError::InsufficientHistory(_))));
    }

    #[test]
    fn units_only_drift_is_reconciled_too() {
        let plan = plan_reconciliation(1000.0, 100.0, 1000.0, 100.5, 10.0, false, &[]).unwrap();
        match plan {
            ReconcilePlan::RecordBuy { amount, units } => {
                assert!((amount - 5.0).abs() < 1e-9);
                assert!((units - 0.5).abs() < 1e-9);
            }
            other => panic!("expected RecordBuy, got {:?}", other),
        }
    }
}
