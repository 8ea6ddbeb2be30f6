/// Account every ledger row falls back to when none is given
pub const DEFAULT_ACCOUNT_NAME: &str = "Default";

/// Rupee tolerance below which a reconciliation delta is treated as float noise
pub const AMOUNT_TOLERANCE: f64 = 1.0;

/// Unit tolerance below which a reconciliation delta is treated as float noise
pub const UNITS_TOLERANCE: f64 = 0.001;

/// Unit threshold for a holding to count as live
pub const UNITS_EPSILON: f64 = 0.0001;

/// Day-count convention for holding periods and XIRR exponents
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Holding period (days) at which a sale turns long term
pub const LONG_TERM_DAYS: i64 = 365;

/// Decimal places kept on monetary aggregates
pub const ROUNDING_SCALE: u32 = 8;
