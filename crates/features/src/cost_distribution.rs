//! Cost distribution histogram.
//!
//! Buckets the estimated cost of tenders into contiguous ranges. Records
//! with an absent, zero, or classified cost are excluded before edges are
//! derived. Edges are spaced either linearly or in log10 space; the latter
//! suits the heavily right-skewed cost column, where values run from
//! hundreds of euros to many millions.
//!
//! Buckets are half-open `[lower, upper)` except the last one, which is
//! closed so the maximum cost is counted.

use crate::labels::bucket_label;
use tendly_core::config::{DistributionConfig, MAX_BUCKET_COUNT};
use tendly_core::{Bucket, BucketingMode, Error, Result, TenderRecord};
use tracing::debug;

/// Default number of buckets in the dashboard histogram.
pub const DEFAULT_BUCKET_COUNT: usize = 50;

/// Stateless cost distribution aggregator.
#[derive(Debug, Clone, Copy)]
pub struct CostDistributionAggregator {
    bucket_count: usize,
    mode: BucketingMode,
}

impl Default for CostDistributionAggregator {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            mode: BucketingMode::Logarithmic,
        }
    }
}

impl CostDistributionAggregator {
    /// Create a new aggregator. Fails if `bucket_count` is zero or above
    /// [`MAX_BUCKET_COUNT`].
    pub fn new(bucket_count: usize, mode: BucketingMode) -> Result<Self> {
        if bucket_count == 0 {
            return Err(Error::invalid_configuration(
                "bucket_count must be positive",
            ));
        }
        if bucket_count > MAX_BUCKET_COUNT {
            return Err(Error::invalid_configuration(format!(
                "bucket_count must be at most {MAX_BUCKET_COUNT}, got {bucket_count}"
            )));
        }
        Ok(Self { bucket_count, mode })
    }

    /// Create an aggregator from the distribution section of the config.
    pub fn from_config(config: &DistributionConfig) -> Result<Self> {
        Self::new(config.bucket_count, config.mode)
    }

    /// Requested number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Edge spacing mode.
    pub fn mode(&self) -> BucketingMode {
        self.mode
    }

    /// Compute the bucketed distribution of the given records.
    ///
    /// Returns an empty vector when no record has a usable cost, and a single
    /// zero-width bucket when all usable costs are equal.
    pub fn compute(&self, records: &[TenderRecord]) -> Vec<Bucket> {
        let costs: Vec<f64> = records
            .iter()
            .filter_map(TenderRecord::included_cost)
            .collect();

        if costs.is_empty() {
            debug!(records = records.len(), "no usable costs, empty distribution");
            return Vec::new();
        }

        let (min_cost, max_cost) = costs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| {
                (lo.min(c), hi.max(c))
            });

        if min_cost == max_cost {
            return vec![Bucket {
                lower_bound: min_cost,
                upper_bound: max_cost,
                count: costs.len() as u64,
                total_value: costs.iter().sum(),
                label: bucket_label(min_cost, max_cost),
            }];
        }

        let edges = bucket_edges(min_cost, max_cost, self.bucket_count, self.mode);
        let n = edges.len() - 1;
        let mut counts = vec![0u64; n];
        let mut totals = vec![0.0f64; n];

        for &cost in &costs {
            let idx = bucket_index(&edges, cost);
            counts[idx] += 1;
            totals[idx] += cost;
        }

        debug!(
            included = costs.len(),
            excluded = records.len() - costs.len(),
            buckets = n,
            mode = %self.mode,
            min_cost,
            max_cost,
            "computed cost distribution"
        );

        edges
            .windows(2)
            .zip(counts.into_iter().zip(totals))
            .map(|(bounds, (count, total_value))| Bucket {
                lower_bound: bounds[0],
                upper_bound: bounds[1],
                count,
                total_value,
                label: bucket_label(bounds[0], bounds[1]),
            })
            .collect()
    }
}

/// Compute the cost distribution in one call.
pub fn compute_cost_distribution(
    records: &[TenderRecord],
    bucket_count: usize,
    mode: BucketingMode,
) -> Result<Vec<Bucket>> {
    Ok(CostDistributionAggregator::new(bucket_count, mode)?.compute(records))
}

/// Derive bucket edges over `[min, max]`.
///
/// Requires `min < max`; `min` must be positive in logarithmic mode.
/// `bucket_count` is clamped to `1..=MAX_BUCKET_COUNT`. The first and last
/// edges are exactly `min` and `max`.
/// Returns `bucket_count + 1` edges unless floating-point rounding collapses
/// neighbouring edges, in which case duplicates are dropped so every bucket
/// keeps a positive width.
pub fn bucket_edges(min: f64, max: f64, bucket_count: usize, mode: BucketingMode) -> Vec<f64> {
    let bucket_count = bucket_count.clamp(1, MAX_BUCKET_COUNT);
    let n = bucket_count as f64;
    let mut edges: Vec<f64> = match mode {
        BucketingMode::Linear => {
            let width = (max - min) / n;
            (0..=bucket_count)
                .map(|i| min + i as f64 * width)
                .collect()
        }
        BucketingMode::Logarithmic => {
            let log_min = min.log10();
            let step = (max.log10() - log_min) / n;
            (0..=bucket_count)
                .map(|i| 10f64.powf(log_min + i as f64 * step))
                .collect()
        }
    };

    let mut floor = min;
    for edge in edges.iter_mut() {
        *edge = edge.clamp(floor, max);
        floor = *edge;
    }
    edges[0] = min;
    edges[bucket_count] = max;
    edges.dedup();
    edges
}

/// Index of the bucket containing `cost`.
///
/// Half-open on the upper end, except the last bucket which also takes
/// values equal to the final edge.
fn bucket_index(edges: &[f64], cost: f64) -> usize {
    let last = edges.len() - 2;
    edges
        .partition_point(|&edge| edge <= cost)
        .saturating_sub(1)
        .min(last)
}
