pub mod calculator;
pub mod holdings_errors;
pub mod holdings_model;
pub mod holdings_service;

pub use calculator::{HoldingKey, HoldingsCalculator};
pub use holdings_errors::CalculatorError;
pub use holdings_model::{
    is_units_significant, HoldingSnapshot, HoldingTotals, RedemptionRequest, TaxStatus,
};
pub use holdings_service::{funded_plan_kinds, HoldingsService, HoldingsServiceTrait};

#[cfg(test)]
pub(crate) mod tests;
