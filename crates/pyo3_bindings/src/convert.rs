//! Conversions between Python-side arguments and dashboard types.

use chrono::NaiveDate;
use tendly_core::config::{CacheConfig, DatabaseConfig};
use tendly_core::{Config, Error, Result, TenderFilters};

/// Parse an optional `YYYY-MM-DD` string.
pub(crate) fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| Error::data(format!("invalid date '{s}': {e}")))
        })
        .transpose()
}

pub(crate) fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Python ints are signed; anything not positive is a configuration error
/// rather than an overflow.
pub(crate) fn bucket_count(value: i64) -> Result<usize> {
    if value <= 0 {
        return Err(Error::invalid_configuration(format!(
            "bucket_count must be positive, got {value}"
        )));
    }
    usize::try_from(value).map_err(|_| {
        Error::invalid_configuration(format!("bucket_count {value} is too large"))
    })
}

/// Config for a `TenderQuery`, validated.
pub(crate) fn query_config(
    path: &str,
    table: &str,
    ttl_seconds: u64,
    cache: bool,
) -> Result<Config> {
    let config = Config {
        database: DatabaseConfig {
            path: path.to_string(),
            table: table.to_string(),
        },
        cache: CacheConfig {
            enabled: cache,
            ttl_seconds,
        },
        ..Config::default()
    };
    config.validate()?;
    Ok(config)
}

/// Filters for a `TenderQuery.fetch` call.
pub(crate) fn query_filters(
    min_cost: Option<f64>,
    max_cost: Option<f64>,
    sector: Option<String>,
    procedure: Option<String>,
    published_from: Option<&str>,
    published_to: Option<&str>,
) -> Result<TenderFilters> {
    Ok(TenderFilters {
        cost_min: min_cost,
        cost_max: max_cost,
        sector_code: sector,
        procedure_type_code: procedure,
        published_from: parse_date(published_from)?,
        published_to: parse_date(published_to)?,
    })
}
