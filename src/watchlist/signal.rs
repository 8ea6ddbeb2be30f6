use serde::{Deserialize, Serialize};

/// Suggested action for a tracked scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchSignal {
    /// Down more than 10% on the tracked position: buying opportunity.
    DipBuy,
    /// Within 10% either way: keep adding.
    Accumulate,
    /// Target NAV reached or the target value covered.
    TargetSell,
    /// Within 50 rupees of the target value.
    EarlySell,
    Hold,
}

impl WatchSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchSignal::DipBuy => "DIP_BUY",
            WatchSignal::Accumulate => "ACCUMULATE",
            WatchSignal::TargetSell => "TARGET_SELL",
            WatchSignal::EarlySell => "EARLY_SELL",
            WatchSignal::Hold => "HOLD",
        }
    }
}

const DIP_THRESHOLD_PCT: f64 = -10.0;
const ACCUMULATE_CEILING_PCT: f64 = 10.0;
const EARLY_SELL_BAND: f64 = 50.0;

/// Classifies a tracked position. Target checks outrank return-based
/// signals: a reached target always reads as a sell.
pub fn classify_signal(
    current_nav: f64,
    units: f64,
    invested_amount: f64,
    target_nav: Option<f64>,
) -> WatchSignal {
    let current_value = current_nav * units;

    if let Some(target_nav) = target_nav {
        let value_shortfall = target_nav * units - current_value;
        if current_nav >= target_nav || value_shortfall <= 0.0 {
            return WatchSignal::TargetSell;
        }
        if value_shortfall <= EARLY_SELL_BAND {
            return WatchSignal::EarlySell;
        }
    }

    if invested_amount <= 0.0 {
        return WatchSignal::Hold;
    }

    let return_pct = (current_value - invested_amount) / invested_amount * 100.0;
    if return_pct < DIP_THRESHOLD_PCT {
        WatchSignal::DipBuy
    } else if return_pct <= ACCUMULATE_CEILING_PCT {
        WatchSignal::Accumulate
    } else {
        WatchSignal::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_drawdown_reads_dip_buy() {
        // 100 units bought for 1000, now worth 850
        assert_eq!(classify_signal(8.5, 100.0, 1000.0, None), WatchSignal::DipBuy);
    }

    #[test]
    fn flat_position_reads_accumulate() {
        assert_eq!(
            classify_signal(10.5, 100.0, 1000.0, None),
            WatchSignal::Accumulate
        );
        assert_eq!(
            classify_signal(9.5, 100.0, 1000.0, None),
            WatchSignal::Accumulate
        );
    }

    #[test]
    fn strong_gain_without_target_reads_hold() {
        assert_eq!(classify_signal(15.0, 100.0, 1000.0, None), WatchSignal::Hold);
    }

    #[test]
    fn reached_target_nav_reads_target_sell() {
        assert_eq!(
            classify_signal(20.0, 100.0, 1000.0, Some(20.0)),
            WatchSignal::TargetSell
        );
    }

    #[test]
    fn near_target_value_reads_early_sell() {
        // Target value 2000, current value 1960: 40 short
        assert_eq!(
            classify_signal(19.6, 100.0, 1000.0, Some(20.0)),
            WatchSignal::EarlySell
        );
    }

    #[test]
    fn far_from_target_falls_back_to_return_signal() {
        assert_eq!(
            classify_signal(10.0, 100.0, 1000.0, Some(20.0)),
            WatchSignal::Accumulate
        );
    }

    #[test]
    fn zero_investment_reads_hold() {
        assert_eq!(classify_signal(10.0, 0.0, 0.0, None), WatchSignal::Hold);
    }
}
