mod holdings_calculator;
mod state;

pub use holdings_calculator::{HoldingKey, HoldingsCalculator};
