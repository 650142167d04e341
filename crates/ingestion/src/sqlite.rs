//! SQLite-backed tender source.
//!
//! Issues parameterized queries against the tender details table and
//! validates each row into a typed `TenderRecord`. Rows whose columns cannot
//! be read or that fail validation are logged and skipped.

use crate::source::{FilterOptions, TenderSource};
use chrono::NaiveDate;
use rusqlite::{params_from_iter, types::Value, Connection, OpenFlags, Row};
use std::path::Path;
use tendly_core::config::{is_sql_identifier, DatabaseConfig};
use tendly_core::{Error, Result, TenderFilters, TenderRecord};
use tracing::{debug, warn};

const RECORD_COLUMNS: &str = "procurement_id, tender_name, estimated_cost, is_cost_classified, \
     procurement_sector_code, procedure_type_code, primary_cpv_code, primary_cpv_name, \
     publication_date, submission_deadline";

fn db_err(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

/// Whether a row error comes from converting a single column value, as
/// opposed to a failure of the statement itself.
fn is_row_conversion_error(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)
    )
}

/// Raw row as stored, before validation.
#[derive(Debug)]
struct TenderRow {
    procurement_id: i64,
    tender_name: Option<String>,
    estimated_cost: Option<f64>,
    is_cost_classified: Option<bool>,
    sector_code: Option<String>,
    procedure_type_code: Option<String>,
    primary_cpv_code: Option<String>,
    primary_cpv_name: Option<String>,
    publication_date: Option<String>,
    submission_deadline: Option<String>,
}

impl TenderRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            procurement_id: row.get(0)?,
            tender_name: row.get(1)?,
            estimated_cost: row.get(2)?,
            is_cost_classified: row.get(3)?,
            sector_code: row.get(4)?,
            procedure_type_code: row.get(5)?,
            primary_cpv_code: row.get(6)?,
            primary_cpv_name: row.get(7)?,
            publication_date: row.get(8)?,
            submission_deadline: row.get(9)?,
        })
    }

    fn validate(self) -> Result<TenderRecord> {
        if let Some(cost) = self.estimated_cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(Error::data(format!(
                    "procurement {}: invalid estimated_cost {cost}",
                    self.procurement_id
                )));
            }
        }

        let publication_date = parse_date(self.publication_date.as_deref())
            .map_err(|e| Error::data(format!("procurement {}: {e}", self.procurement_id)))?;
        let submission_deadline = parse_date(self.submission_deadline.as_deref())
            .map_err(|e| Error::data(format!("procurement {}: {e}", self.procurement_id)))?;

        Ok(TenderRecord {
            procurement_id: self.procurement_id,
            tender_name: self.tender_name.unwrap_or_default(),
            estimated_cost: self.estimated_cost,
            is_cost_classified: self.is_cost_classified.unwrap_or(false),
            sector_code: self.sector_code,
            procedure_type_code: self.procedure_type_code,
            primary_cpv_code: self.primary_cpv_code,
            primary_cpv_name: self.primary_cpv_name,
            publication_date,
            submission_deadline,
        })
    }
}

/// Parse the date part of a stored date or timestamp.
///
/// Accepts `YYYY-MM-DD` optionally followed by a time component; blank
/// values are treated as missing.
fn parse_date(value: Option<&str>) -> std::result::Result<Option<NaiveDate>, String> {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| format!("invalid date '{raw}': {e}"))
}

/// Tender source reading from a SQLite table.
pub struct SqliteTenderSource {
    conn: Connection,
    table: String,
}

impl SqliteTenderSource {
    /// Open a database file read-only.
    pub fn open(path: impl AsRef<Path>, table: &str) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(db_err)?;
        Self::from_connection(conn, table)
    }

    /// Open the database described by the config.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::open(&config.path, &config.table)
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self> {
        if !is_sql_identifier(table) {
            return Err(Error::invalid_configuration(format!(
                "'{table}' is not a valid table name"
            )));
        }
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Table being queried.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Build the SELECT statement and its parameters for the filters.
    fn build_query(&self, filters: &TenderFilters) -> (String, Vec<Value>) {
        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(min) = filters.cost_min {
            clauses.push("estimated_cost >= ?");
            params.push(Value::Real(min));
        }
        if let Some(max) = filters.cost_max {
            clauses.push("estimated_cost <= ?");
            params.push(Value::Real(max));
        }
        if let Some(sector) = &filters.sector_code {
            clauses.push("procurement_sector_code = ?");
            params.push(Value::Text(sector.clone()));
        }
        if let Some(procedure) = &filters.procedure_type_code {
            clauses.push("procedure_type_code = ?");
            params.push(Value::Text(procedure.clone()));
        }
        if let Some(from) = filters.published_from {
            clauses.push("date(publication_date) >= ?");
            params.push(Value::Text(from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = filters.published_to {
            clauses.push("date(publication_date) <= ?");
            params.push(Value::Text(to.format("%Y-%m-%d").to_string()));
        }

        let mut sql = format!("SELECT {RECORD_COLUMNS} FROM {}", self.table);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY estimated_cost DESC");
        (sql, params)
    }

    fn distinct_values(&self, column: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {column} FROM {table} WHERE {column} IS NOT NULL ORDER BY {column}",
            table = self.table
        );
        let mut stmt = self.conn.prepare(&sql).map_err(db_err)?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;
        Ok(values)
    }

    /// Distinct sector codes, sorted.
    pub fn distinct_sectors(&self) -> Result<Vec<String>> {
        self.distinct_values("procurement_sector_code")
    }

    /// Distinct procedure type codes, sorted.
    pub fn distinct_procedure_types(&self) -> Result<Vec<String>> {
        self.distinct_values("procedure_type_code")
    }
}

impl TenderSource for SqliteTenderSource {
    fn fetch_filtered_records(&self, filters: &TenderFilters) -> Result<Vec<TenderRecord>> {
        let (sql, params) = self.build_query(filters);
        debug!(query = %sql, params = params.len(), "executing tender query");

        let mut stmt = self.conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params_from_iter(params), TenderRow::from_row)
            .map_err(db_err)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in rows {
            let row = match row {
                Ok(row) => row,
                Err(e) if is_row_conversion_error(&e) => {
                    skipped += 1;
                    warn!(error = %e, "skipping unreadable tender row");
                    continue;
                }
                Err(e) => return Err(db_err(e)),
            };
            match row.validate() {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    warn!(error = %e, "skipping invalid tender row");
                }
            }
        }

        debug!(records = records.len(), skipped, "tender query finished");
        Ok(records)
    }

    fn filter_options(&self) -> Result<FilterOptions> {
        Ok(FilterOptions {
            sectors: self.distinct_sectors()?,
            procedure_types: self.distinct_procedure_types()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "estonian_tender_details";

    fn setup() -> SqliteTenderSource {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE estonian_tender_details (
                procurement_id INTEGER PRIMARY KEY,
                tender_name TEXT,
                estimated_cost REAL,
                is_cost_classified INTEGER,
                procurement_sector_code TEXT,
                procedure_type_code TEXT,
                primary_cpv_code TEXT,
                primary_cpv_name TEXT,
                publication_date TEXT,
                submission_deadline TEXT
            );
            INSERT INTO estonian_tender_details VALUES
                (1, 'Road repair', 1500000, 0, 'GENERAL', 'OPEN', '45233141', 'Road maintenance', '2024-02-10', '2024-03-01 12:00:00'),
                (2, 'Office chairs', 4500, 0, 'GENERAL', 'SIMPLE', '39112000', 'Chairs', '2024-05-02', NULL),
                (3, 'Classified', NULL, 1, 'DEFENCE', 'OPEN', NULL, NULL, '2024-06-01', NULL),
                (4, 'Water pipes', 250000, 0, 'UTILITIES', 'OPEN', '44163000', 'Pipes', '2023-11-20', '2023-12-15'),
                (5, 'Broken cost', -10, 0, 'GENERAL', 'OPEN', NULL, NULL, NULL, NULL),
                (6, 'Zero cost', 0, 0, NULL, 'OPEN', NULL, NULL, '', NULL);",
        )
        .unwrap();
        SqliteTenderSource::from_connection(conn, TABLE).unwrap()
    }

    #[test]
    fn test_fetch_all_skips_invalid_rows() {
        let source = setup();
        let records = source.fetch_filtered_records(&TenderFilters::default()).unwrap();

        // Row 5 has a negative cost and is dropped at the boundary.
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].procurement_id, 1);
        assert_eq!(records[0].estimated_cost, Some(1_500_000.0));
        assert_eq!(
            records[0].submission_deadline,
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );

        let classified = records.iter().find(|r| r.procurement_id == 3).unwrap();
        assert!(classified.is_cost_classified);
        assert_eq!(classified.estimated_cost, None);

        let zero = records.iter().find(|r| r.procurement_id == 6).unwrap();
        assert_eq!(zero.publication_date, None);
        assert_eq!(zero.sector_code, None);
    }

    #[test]
    fn test_fetch_skips_rows_with_wrong_column_types() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE estonian_tender_details (
                procurement_id INTEGER PRIMARY KEY,
                tender_name TEXT,
                estimated_cost REAL,
                is_cost_classified INTEGER,
                procurement_sector_code TEXT,
                procedure_type_code TEXT,
                primary_cpv_code TEXT,
                primary_cpv_name TEXT,
                publication_date TEXT,
                submission_deadline TEXT
            );
            INSERT INTO estonian_tender_details VALUES
                (1, 'ok', 1500.0, 0, 'GENERAL', 'OPEN', NULL, NULL, '2024-01-05', NULL),
                (2, 'bad', 'n/a', 0, 'GENERAL', 'OPEN', NULL, NULL, '2024-01-06', NULL);",
        )
        .unwrap();
        let source = SqliteTenderSource::from_connection(conn, TABLE).unwrap();

        let records = source.fetch_filtered_records(&TenderFilters::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].procurement_id, 1);
        assert_eq!(records[0].estimated_cost, Some(1500.0));
    }

    #[test]
    fn test_row_conversion_errors_are_classified() {
        let conversion = rusqlite::Error::InvalidColumnType(
            2,
            "estimated_cost".into(),
            rusqlite::types::Type::Text,
        );
        assert!(is_row_conversion_error(&conversion));
        assert!(!is_row_conversion_error(&rusqlite::Error::QueryReturnedNoRows));
        assert!(!is_row_conversion_error(&rusqlite::Error::InvalidQuery));
    }

    #[test]
    fn test_fetch_with_cost_range() {
        let source = setup();
        let filters = TenderFilters {
            cost_min: Some(1_000.0),
            cost_max: Some(500_000.0),
            ..Default::default()
        };
        let mut ids: Vec<i64> = source
            .fetch_filtered_records(&filters)
            .unwrap()
            .iter()
            .map(|r| r.procurement_id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_fetch_with_codes_and_dates() {
        let source = setup();
        let filters = TenderFilters {
            sector_code: Some("GENERAL".to_string()),
            procedure_type_code: Some("OPEN".to_string()),
            published_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            published_to: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Default::default()
        };
        let records = source.fetch_filtered_records(&filters).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tender_name, "Road repair");
    }

    #[test]
    fn test_sql_and_memory_filters_agree() {
        let source = setup();
        let all = source.fetch_filtered_records(&TenderFilters::default()).unwrap();
        let filters = TenderFilters {
            cost_min: Some(4_500.0),
            published_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };

        let from_sql: Vec<i64> = source
            .fetch_filtered_records(&filters)
            .unwrap()
            .iter()
            .map(|r| r.procurement_id)
            .collect();
        let in_memory: Vec<i64> = all
            .iter()
            .filter(|r| filters.matches(r))
            .map(|r| r.procurement_id)
            .collect();
        assert_eq!(from_sql, in_memory);
    }

    #[test]
    fn test_filter_options() {
        let source = setup();
        let options = source.filter_options().unwrap();
        assert_eq!(options.sectors, vec!["DEFENCE", "GENERAL", "UTILITIES"]);
        assert_eq!(options.procedure_types, vec!["OPEN", "SIMPLE"]);
    }

    #[test]
    fn test_missing_table_is_database_error() {
        let conn = Connection::open_in_memory().unwrap();
        let source = SqliteTenderSource::from_connection(conn, "missing").unwrap();
        let err = source
            .fetch_filtered_records(&TenderFilters::default())
            .unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_invalid_table_name() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(SqliteTenderSource::from_connection(conn, "x; DROP TABLE y").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(None).unwrap(), None);
        assert_eq!(parse_date(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_date(Some("2024-03-01T10:00:00Z")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert!(parse_date(Some("01/03/2024")).is_err());
    }
}
