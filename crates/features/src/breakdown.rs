//! Categorical breakdowns: sector, procedure type and CPV category.
//!
//! Records without a value in the grouped column are left out of that
//! breakdown; there is no catch-all category.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use tendly_core::TenderRecord;

/// Count and total value for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category key (code or name).
    pub key: String,
    /// Number of tenders.
    pub count: u64,
    /// Sum of estimated costs.
    pub total_value: f64,
}

/// Group records with a usable cost and a present key by a key column.
fn group_by<F>(records: &[TenderRecord], key_fn: F) -> Vec<CategoryCount>
where
    F: Fn(&TenderRecord) -> Option<&str>,
{
    let mut groups: HashMap<&str, (u64, f64)> = HashMap::new();

    for record in records {
        if let (Some(cost), Some(key)) = (record.included_cost(), key_fn(record)) {
            let entry = groups.entry(key).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += cost;
        }
    }

    groups
        .into_iter()
        .map(|(key, (count, total_value))| CategoryCount {
            key: key.to_string(),
            count,
            total_value,
        })
        .collect()
}

/// Sort by count descending, then key.
fn sort_by_count(mut counts: Vec<CategoryCount>) -> Vec<CategoryCount> {
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    counts
}

/// Tenders per procurement sector.
pub fn sector_breakdown(records: &[TenderRecord]) -> Vec<CategoryCount> {
    sort_by_count(group_by(records, |r| r.sector_code.as_deref()))
}

/// Tenders per procedure type.
pub fn procedure_breakdown(records: &[TenderRecord]) -> Vec<CategoryCount> {
    sort_by_count(group_by(records, |r| r.procedure_type_code.as_deref()))
}

/// The `n` CPV categories with the highest total estimated value.
pub fn top_categories(records: &[TenderRecord], n: usize) -> Vec<CategoryCount> {
    let mut counts = group_by(records, |r| r.primary_cpv_name.as_deref());
    counts.sort_by_key(|c| (Reverse(OrderedFloat(c.total_value)), c.key.clone()));
    counts.truncate(n);
    counts
}
