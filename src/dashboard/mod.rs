//! Dashboard module
//!
//! Provides the main page: the transaction form and list, the current
//! balance, charts for the selected time range and AI insights.

mod aggregation;
mod charts;
mod handlers;

pub use handlers::get_dashboard_page;
