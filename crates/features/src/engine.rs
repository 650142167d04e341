//! Dashboard engine.
//!
//! Combines all panel aggregations into a single snapshot for rendering.

use crate::{
    breakdown::{procedure_breakdown, sector_breakdown, top_categories, CategoryCount},
    cost_distribution::CostDistributionAggregator,
    summary::SummaryMetrics,
    timeline::{monthly_timeline, recent_tenders, RecentTender, TimelinePoint},
};
use serde::{Deserialize, Serialize};
use tendly_core::{Bucket, Config, Result, TenderRecord};
use tracing::info;

/// Everything the dashboard renders for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Headline metrics.
    pub summary: SummaryMetrics,
    /// Cost histogram (empty or single bucket for insufficient data).
    pub cost_distribution: Vec<Bucket>,
    /// Tenders per sector.
    pub sectors: Vec<CategoryCount>,
    /// Tenders per procedure type.
    pub procedure_types: Vec<CategoryCount>,
    /// Tenders per submission month.
    pub timeline: Vec<TimelinePoint>,
    /// Top CPV categories by value.
    pub top_categories: Vec<CategoryCount>,
    /// Most recent tenders.
    pub recent_tenders: Vec<RecentTender>,
}

impl DashboardSnapshot {
    /// Whether the selection left no records with a usable cost.
    pub fn is_empty(&self) -> bool {
        self.summary.total_tenders == 0
    }
}

/// Dashboard engine.
#[derive(Debug, Clone)]
pub struct DashboardEngine {
    distribution: CostDistributionAggregator,
    top_categories: usize,
    recent_limit: usize,
}

impl DashboardEngine {
    /// Create a new engine from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            distribution: CostDistributionAggregator::from_config(&config.distribution)?,
            top_categories: config.dashboard.top_categories,
            recent_limit: config.dashboard.recent_limit,
        })
    }

    /// The cost distribution aggregator in use.
    pub fn distribution(&self) -> &CostDistributionAggregator {
        &self.distribution
    }

    /// Compute all panels for the given (already filtered) records.
    pub fn snapshot(&self, records: &[TenderRecord]) -> DashboardSnapshot {
        let snapshot = DashboardSnapshot {
            summary: SummaryMetrics::from_records(records),
            cost_distribution: self.distribution.compute(records),
            sectors: sector_breakdown(records),
            procedure_types: procedure_breakdown(records),
            timeline: monthly_timeline(records),
            top_categories: top_categories(records, self.top_categories),
            recent_tenders: recent_tenders(records, self.recent_limit),
        };

        info!(
            records = records.len(),
            tenders = snapshot.summary.total_tenders,
            buckets = snapshot.cost_distribution.len(),
            "dashboard snapshot computed"
        );

        snapshot
    }
}
