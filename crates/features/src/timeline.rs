//! Submission timeline and the recent tenders table.

use crate::labels::format_cost_full;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tendly_core::TenderRecord;

/// Number of tenders with a submission deadline in a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Month as `YYYY-MM`.
    pub month: String,
    /// Number of tenders.
    pub count: u64,
}

/// Monthly counts by submission deadline, oldest first.
///
/// Only records with a usable cost and a deadline are counted.
pub fn monthly_timeline(records: &[TenderRecord]) -> Vec<TimelinePoint> {
    let mut months: BTreeMap<(i32, u32), u64> = BTreeMap::new();

    for record in records {
        if record.included_cost().is_none() {
            continue;
        }
        if let Some(deadline) = record.submission_deadline {
            *months.entry((deadline.year(), deadline.month())).or_insert(0) += 1;
        }
    }

    months
        .into_iter()
        .map(|((year, month), count)| TimelinePoint {
            month: format!("{year:04}-{month:02}"),
            count,
        })
        .collect()
}

/// One row of the recent tenders table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTender {
    /// Tender name.
    pub tender_name: String,
    /// Estimated cost, e.g. "€1,234,567".
    pub estimated_cost: String,
    /// CPV category name.
    pub category: Option<String>,
    /// Sector code.
    pub sector_code: Option<String>,
    /// Submission deadline.
    pub submission_deadline: Option<NaiveDate>,
}

/// Tenders sorted by submission deadline, latest first, undated last.
pub fn recent_tenders(records: &[TenderRecord], limit: usize) -> Vec<RecentTender> {
    let mut rows: Vec<(&TenderRecord, f64)> = records
        .iter()
        .filter_map(|r| r.included_cost().map(|cost| (r, cost)))
        .collect();

    // None sorts before Some, so reverse puts undated rows last.
    rows.sort_by(|a, b| b.0.submission_deadline.cmp(&a.0.submission_deadline));

    rows.into_iter()
        .take(limit)
        .map(|(record, cost)| RecentTender {
            tender_name: record.tender_name.clone(),
            estimated_cost: format_cost_full(cost),
            category: record.primary_cpv_name.clone(),
            sector_code: record.sector_code.clone(),
            submission_deadline: record.submission_deadline,
        })
        .collect()
}
