//! Aggregations behind the tender dashboard panels.
//!
//! This crate handles:
//! - Cost distribution bucketing (linear or logarithmic edges)
//! - Euro label formatting
//! - Summary metrics (count, total, average, median)
//! - Sector, procedure type and category breakdowns
//! - Submission timeline and recent tenders table

pub mod labels;
pub mod cost_distribution;
pub mod summary;
pub mod breakdown;
pub mod timeline;
pub mod engine;

pub use cost_distribution::{compute_cost_distribution, CostDistributionAggregator};
pub use labels::format_cost;
pub use summary::SummaryMetrics;
pub use breakdown::CategoryCount;
pub use timeline::{RecentTender, TimelinePoint};
pub use engine::{DashboardEngine, DashboardSnapshot};
