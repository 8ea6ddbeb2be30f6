pub(crate) mod insights;
pub(crate) mod portfolio_errors;
pub(crate) mod portfolio_model;
pub(crate) mod portfolio_service;
pub(crate) mod xirr;

pub use insights::{analyze, HealthReport, Insight, Severity};
pub use portfolio_errors::XirrError;
pub use portfolio_model::{
    AgeBucket, AgeSlice, GroupSlice, Grouping, HoldingView, PortfolioSummary, PortfolioView,
    RedemptionReadiness,
};
pub use portfolio_service::{PortfolioService, PortfolioServiceTrait};
pub use xirr::{xirr, CashFlow};
