//! Headline metrics shown above the charts.

use crate::labels::{format_compact, format_total_value};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median};
use tendly_core::TenderRecord;

/// Count, total, average and median over records with a usable cost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Number of tenders with a usable cost.
    pub total_tenders: u64,
    /// Sum of estimated costs.
    pub total_value: f64,
    /// Mean estimated cost (0 when empty).
    pub average_cost: f64,
    /// Median estimated cost (0 when empty).
    pub median_cost: f64,
}

impl SummaryMetrics {
    /// Compute metrics from records.
    pub fn from_records(records: &[TenderRecord]) -> Self {
        let costs: Vec<f64> = records
            .iter()
            .filter_map(TenderRecord::included_cost)
            .collect();

        if costs.is_empty() {
            return Self::default();
        }

        let total_value: f64 = costs.iter().sum();
        let total_tenders = costs.len() as u64;
        let average_cost = total_value / costs.len() as f64;
        let median_cost = Data::new(costs).median();

        Self {
            total_tenders,
            total_value,
            average_cost,
            median_cost,
        }
    }

    /// Total value card label, e.g. "€2.3B".
    pub fn total_value_label(&self) -> String {
        format_total_value(self.total_value)
    }

    /// Average cost card label.
    pub fn average_cost_label(&self) -> String {
        format_compact(self.average_cost)
    }

    /// Median cost card label.
    pub fn median_cost_label(&self) -> String {
        format_compact(self.median_cost)
    }
}
