//! Dashboard module
//!
//! Provides an overview page showing the user's spending by month and by
//! category, and persists those charts as per-user artifacts.

mod aggregation;
mod artifacts;
mod charts;
mod handlers;
mod tables;

pub use artifacts::{ChartArtifacts, ChartKind, ChartRenderer};
pub use handlers::{get_chart, get_dashboard_page};
