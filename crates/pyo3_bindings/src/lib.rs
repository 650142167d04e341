//! PyO3 bindings for the tender dashboard.
//!
//! Exposes the Rust aggregations to a Python rendering layer:
//! - Cost distribution bucketing and label formatting
//! - Cached SQLite tender queries
//! - Full dashboard snapshots (as JSON)

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

use tendly_core::{
    Bucket as RustBucket,
    BucketingMode,
    Config as RustConfig,
    Result as RustResult,
    TenderRecord as RustTenderRecord,
};
use tendly_features::{DashboardEngine, CostDistributionAggregator};
use tendly_ingestion::{cached_source, SqliteTenderSource, TenderSource};

mod convert;
mod error;

use convert::{format_date, parse_date};
use error::to_py_err;

fn parse_mode(mode: &str) -> PyResult<BucketingMode> {
    mode.parse().map_err(to_py_err)
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// A single procurement record. Dates are `YYYY-MM-DD` strings.
#[pyclass]
#[derive(Clone)]
pub struct TenderRecord {
    #[pyo3(get, set)]
    pub procurement_id: i64,
    #[pyo3(get, set)]
    pub tender_name: String,
    #[pyo3(get, set)]
    pub estimated_cost: Option<f64>,
    #[pyo3(get, set)]
    pub is_cost_classified: bool,
    #[pyo3(get, set)]
    pub sector_code: Option<String>,
    #[pyo3(get, set)]
    pub procedure_type_code: Option<String>,
    #[pyo3(get, set)]
    pub primary_cpv_code: Option<String>,
    #[pyo3(get, set)]
    pub primary_cpv_name: Option<String>,
    #[pyo3(get, set)]
    pub publication_date: Option<String>,
    #[pyo3(get, set)]
    pub submission_deadline: Option<String>,
}

#[pymethods]
impl TenderRecord {
    #[new]
    #[pyo3(signature = (
        procurement_id,
        tender_name,
        estimated_cost=None,
        is_cost_classified=false,
        sector_code=None,
        procedure_type_code=None,
        primary_cpv_code=None,
        primary_cpv_name=None,
        publication_date=None,
        submission_deadline=None,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        procurement_id: i64,
        tender_name: String,
        estimated_cost: Option<f64>,
        is_cost_classified: bool,
        sector_code: Option<String>,
        procedure_type_code: Option<String>,
        primary_cpv_code: Option<String>,
        primary_cpv_name: Option<String>,
        publication_date: Option<String>,
        submission_deadline: Option<String>,
    ) -> Self {
        TenderRecord {
            procurement_id,
            tender_name,
            estimated_cost,
            is_cost_classified,
            sector_code,
            procedure_type_code,
            primary_cpv_code,
            primary_cpv_name,
            publication_date,
            submission_deadline,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "TenderRecord(procurement_id={}, tender_name={:?}, estimated_cost={:?})",
            self.procurement_id, self.tender_name, self.estimated_cost
        )
    }
}

impl TenderRecord {
    fn to_rust(&self) -> RustResult<RustTenderRecord> {
        Ok(RustTenderRecord {
            procurement_id: self.procurement_id,
            tender_name: self.tender_name.clone(),
            estimated_cost: self.estimated_cost,
            is_cost_classified: self.is_cost_classified,
            sector_code: self.sector_code.clone(),
            procedure_type_code: self.procedure_type_code.clone(),
            primary_cpv_code: self.primary_cpv_code.clone(),
            primary_cpv_name: self.primary_cpv_name.clone(),
            publication_date: parse_date(self.publication_date.as_deref())?,
            submission_deadline: parse_date(self.submission_deadline.as_deref())?,
        })
    }
}

impl From<RustTenderRecord> for TenderRecord {
    fn from(r: RustTenderRecord) -> Self {
        TenderRecord {
            procurement_id: r.procurement_id,
            tender_name: r.tender_name,
            estimated_cost: r.estimated_cost,
            is_cost_classified: r.is_cost_classified,
            sector_code: r.sector_code,
            procedure_type_code: r.procedure_type_code,
            primary_cpv_code: r.primary_cpv_code,
            primary_cpv_name: r.primary_cpv_name,
            publication_date: format_date(r.publication_date),
            submission_deadline: format_date(r.submission_deadline),
        }
    }
}

fn records_to_rust(records: &[TenderRecord]) -> PyResult<Vec<RustTenderRecord>> {
    records
        .iter()
        .map(TenderRecord::to_rust)
        .collect::<RustResult<_>>()
        .map_err(to_py_err)
}

/// One bar of the cost distribution.
#[pyclass]
#[derive(Clone)]
pub struct Bucket {
    #[pyo3(get)]
    pub lower_bound: f64,
    #[pyo3(get)]
    pub upper_bound: f64,
    #[pyo3(get)]
    pub count: u64,
    #[pyo3(get)]
    pub total_value: f64,
    #[pyo3(get)]
    pub label: String,
}

#[pymethods]
impl Bucket {
    fn __repr__(&self) -> String {
        format!("Bucket(label={:?}, count={})", self.label, self.count)
    }
}

impl From<RustBucket> for Bucket {
    fn from(b: RustBucket) -> Self {
        Bucket {
            lower_bound: b.lower_bound,
            upper_bound: b.upper_bound,
            count: b.count,
            total_value: b.total_value,
            label: b.label,
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Bucket the estimated costs of `records`.
///
/// Returns an empty list when no record has a usable cost, and a single
/// bucket when all usable costs are equal.
#[pyfunction]
#[pyo3(signature = (records, bucket_count=50, mode="logarithmic"))]
fn compute_cost_distribution(
    records: Vec<TenderRecord>,
    bucket_count: i64,
    mode: &str,
) -> PyResult<Vec<Bucket>> {
    let bucket_count = convert::bucket_count(bucket_count).map_err(to_py_err)?;
    let aggregator =
        CostDistributionAggregator::new(bucket_count, parse_mode(mode)?).map_err(to_py_err)?;
    let records = records_to_rust(&records)?;
    Ok(aggregator.compute(&records).into_iter().map(Bucket::from).collect())
}

/// Format a euro amount the way bucket labels do: "€1.5M", "€45K", "€500".
#[pyfunction]
fn format_cost(value: f64) -> String {
    tendly_features::format_cost(value)
}

// ============================================================================
// Query and Engine Wrappers
// ============================================================================

/// SQLite tender query, cached per filter selection unless `cache` is off.
#[pyclass(name = "TenderQuery", unsendable)]
pub struct PyTenderQuery {
    inner: Box<dyn TenderSource>,
}

#[pymethods]
impl PyTenderQuery {
    #[new]
    #[pyo3(signature = (path, table="estonian_tender_details", ttl_seconds=600, cache=true))]
    fn new(path: &str, table: &str, ttl_seconds: u64, cache: bool) -> PyResult<Self> {
        let config = convert::query_config(path, table, ttl_seconds, cache).map_err(to_py_err)?;
        let source = SqliteTenderSource::from_config(&config.database).map_err(to_py_err)?;
        Ok(PyTenderQuery {
            inner: cached_source(source, &config.cache).map_err(to_py_err)?,
        })
    }

    /// Fetch records matching the filters. Dates are `YYYY-MM-DD`.
    #[pyo3(signature = (
        min_cost=None,
        max_cost=None,
        sector=None,
        procedure=None,
        published_from=None,
        published_to=None,
    ))]
    fn fetch(
        &self,
        min_cost: Option<f64>,
        max_cost: Option<f64>,
        sector: Option<String>,
        procedure: Option<String>,
        published_from: Option<&str>,
        published_to: Option<&str>,
    ) -> PyResult<Vec<TenderRecord>> {
        let filters = convert::query_filters(
            min_cost,
            max_cost,
            sector,
            procedure,
            published_from,
            published_to,
        )
        .map_err(to_py_err)?;
        let records = self
            .inner
            .fetch_filtered_records(&filters)
            .map_err(to_py_err)?;
        Ok(records.into_iter().map(TenderRecord::from).collect())
    }

    /// Distinct (sectors, procedure types) for the filter selectors.
    fn filter_options(&self) -> PyResult<(Vec<String>, Vec<String>)> {
        let options = self.inner.filter_options().map_err(to_py_err)?;
        Ok((options.sectors, options.procedure_types))
    }

    /// Drop cached query results.
    fn invalidate(&self) {
        self.inner.invalidate();
    }
}

/// Dashboard engine producing JSON snapshots.
#[pyclass(name = "DashboardEngine")]
pub struct PyDashboardEngine {
    inner: DashboardEngine,
}

#[pymethods]
impl PyDashboardEngine {
    #[new]
    #[pyo3(signature = (bucket_count=50, mode="logarithmic", top_categories=10, recent_limit=20))]
    fn new(
        bucket_count: i64,
        mode: &str,
        top_categories: usize,
        recent_limit: usize,
    ) -> PyResult<Self> {
        let mut config = RustConfig::default();
        config.distribution.bucket_count =
            convert::bucket_count(bucket_count).map_err(to_py_err)?;
        config.distribution.mode = parse_mode(mode)?;
        config.dashboard.top_categories = top_categories;
        config.dashboard.recent_limit = recent_limit;
        Ok(PyDashboardEngine {
            inner: DashboardEngine::new(&config).map_err(to_py_err)?,
        })
    }

    /// Compute every dashboard panel and return it as a JSON string.
    fn snapshot_json(&self, records: Vec<TenderRecord>) -> PyResult<String> {
        let records = records_to_rust(&records)?;
        let snapshot = self.inner.snapshot(&records);
        serde_json::to_string(&snapshot).map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}

// ============================================================================
// Module Definition
// ============================================================================

/// Tendly - Rust aggregations for the tender dashboard.
#[pymodule]
fn tendly(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<TenderRecord>()?;
    m.add_class::<Bucket>()?;

    // Functions
    m.add_function(wrap_pyfunction!(compute_cost_distribution, m)?)?;
    m.add_function(wrap_pyfunction!(format_cost, m)?)?;

    // Engine classes
    m.add_class::<PyTenderQuery>()?;
    m.add_class::<PyDashboardEngine>()?;

    Ok(())
}
