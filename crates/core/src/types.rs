//! Core data types for the tender dashboard.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single procurement record as returned by the query layer.
///
/// Numeric fields are validated once at the query boundary, so downstream
/// code can assume a present cost is a real, non-negative number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenderRecord {
    /// Procurement identifier.
    pub procurement_id: i64,
    /// Tender name.
    pub tender_name: String,
    /// Estimated cost in euros (absent when classified or unrecorded).
    pub estimated_cost: Option<f64>,
    /// Whether the cost estimate is withheld.
    pub is_cost_classified: bool,
    /// Procurement sector code.
    pub sector_code: Option<String>,
    /// Procedure type code.
    pub procedure_type_code: Option<String>,
    /// Primary CPV code.
    pub primary_cpv_code: Option<String>,
    /// Primary CPV name (category).
    pub primary_cpv_name: Option<String>,
    /// Publication date.
    pub publication_date: Option<NaiveDate>,
    /// Submission deadline.
    pub submission_deadline: Option<NaiveDate>,
}

impl TenderRecord {
    /// Create a record with only an id and a name.
    pub fn new(procurement_id: i64, tender_name: impl Into<String>) -> Self {
        Self {
            procurement_id,
            tender_name: tender_name.into(),
            ..Default::default()
        }
    }

    /// Cost usable for numeric aggregation.
    ///
    /// Returns `None` when the cost is absent, zero or negative, non-finite,
    /// or classified.
    #[inline]
    pub fn included_cost(&self) -> Option<f64> {
        if self.is_cost_classified {
            return None;
        }
        self.estimated_cost
            .filter(|cost| cost.is_finite() && *cost > 0.0)
    }
}

/// Filter parameters applied by the query layer.
///
/// Every predicate is optional; bounds are inclusive. A cost bound excludes
/// records without a cost, the same way a SQL comparison against NULL does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenderFilters {
    /// Minimum estimated cost.
    pub cost_min: Option<f64>,
    /// Maximum estimated cost.
    pub cost_max: Option<f64>,
    /// Exact sector code.
    pub sector_code: Option<String>,
    /// Exact procedure type code.
    pub procedure_type_code: Option<String>,
    /// Earliest publication date.
    pub published_from: Option<NaiveDate>,
    /// Latest publication date.
    pub published_to: Option<NaiveDate>,
}

impl TenderFilters {
    /// Check whether a record satisfies all active predicates.
    pub fn matches(&self, record: &TenderRecord) -> bool {
        if let Some(min) = self.cost_min {
            match record.estimated_cost {
                Some(cost) if cost >= min => {}
                _ => return false,
            }
        }
        if let Some(max) = self.cost_max {
            match record.estimated_cost {
                Some(cost) if cost <= max => {}
                _ => return false,
            }
        }
        if let Some(sector) = &self.sector_code {
            if record.sector_code.as_deref() != Some(sector.as_str()) {
                return false;
            }
        }
        if let Some(procedure) = &self.procedure_type_code {
            if record.procedure_type_code.as_deref() != Some(procedure.as_str()) {
                return false;
            }
        }
        if let Some(from) = self.published_from {
            match record.publication_date {
                Some(date) if date >= from => {}
                _ => return false,
            }
        }
        if let Some(to) = self.published_to {
            match record.publication_date {
                Some(date) if date <= to => {}
                _ => return false,
            }
        }
        true
    }

    /// Serialized form used as a cache key.
    pub fn cache_key(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How bucket edges are spaced over the cost range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketingMode {
    /// Equal-width buckets in cost space.
    Linear,
    /// Equal-width buckets in log10 space.
    #[default]
    Logarithmic,
}

impl fmt::Display for BucketingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketingMode::Linear => write!(f, "linear"),
            BucketingMode::Logarithmic => write!(f, "logarithmic"),
        }
    }
}

impl FromStr for BucketingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(BucketingMode::Linear),
            "log" | "logarithmic" => Ok(BucketingMode::Logarithmic),
            other => Err(Error::invalid_configuration(format!(
                "unknown bucketing mode '{other}'"
            ))),
        }
    }
}

/// One bar of the cost distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Inclusive lower bound.
    pub lower_bound: f64,
    /// Upper bound (exclusive, except for the last bucket).
    pub upper_bound: f64,
    /// Number of records in the bucket.
    pub count: u64,
    /// Sum of the costs of those records.
    pub total_value: f64,
    /// Human-readable range, e.g. "€20K–€45K".
    pub label: String,
}

impl Bucket {
    /// Width of the bucket in euros.
    #[inline]
    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }
}
