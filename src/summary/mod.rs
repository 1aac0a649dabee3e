//! Monthly financial aggregation for dashboards.
//!
//! Computes income/expense totals, the month balance, and the per-category
//! expense breakdown for a single month, and repeats that computation over
//! a 6 or 12 month window for trend charts. Recurring transactions are
//! projected into months after their anchor without ever being persisted.

mod aggregation;
mod summary_endpoint;
mod trend_endpoint;

pub(crate) use aggregation::{
    compute_monthly_summary, month_range, validate_month, validate_year,
};
pub(crate) use summary_endpoint::get_summary_endpoint;
pub(crate) use trend_endpoint::get_summary_trend_endpoint;
