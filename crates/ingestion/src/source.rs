//! Record source abstraction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tendly_core::{Result, TenderFilters, TenderRecord};

/// Values available for the sidebar filter selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Distinct sector codes, sorted.
    pub sectors: Vec<String>,
    /// Distinct procedure type codes, sorted.
    pub procedure_types: Vec<String>,
}

/// A source of tender records.
pub trait TenderSource {
    /// Fetch records matching the filters.
    fn fetch_filtered_records(&self, filters: &TenderFilters) -> Result<Vec<TenderRecord>>;

    /// Distinct values for the categorical filters.
    fn filter_options(&self) -> Result<FilterOptions>;

    /// Drop any results held on behalf of callers. No-op for sources that
    /// keep nothing.
    fn invalidate(&self) {}
}

impl<S: TenderSource + ?Sized> TenderSource for Arc<S> {
    fn fetch_filtered_records(&self, filters: &TenderFilters) -> Result<Vec<TenderRecord>> {
        (**self).fetch_filtered_records(filters)
    }

    fn filter_options(&self) -> Result<FilterOptions> {
        (**self).filter_options()
    }

    fn invalidate(&self) {
        (**self).invalidate()
    }
}

/// In-memory record source.
#[derive(Debug, Clone, Default)]
pub struct MemoryTenderSource {
    records: Vec<TenderRecord>,
}

impl MemoryTenderSource {
    /// Create a new in-memory source.
    pub fn new(records: Vec<TenderRecord>) -> Self {
        Self { records }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the source holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TenderSource for MemoryTenderSource {
    fn fetch_filtered_records(&self, filters: &TenderFilters) -> Result<Vec<TenderRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect())
    }

    fn filter_options(&self) -> Result<FilterOptions> {
        let sectors: BTreeSet<&str> = self
            .records
            .iter()
            .filter_map(|r| r.sector_code.as_deref())
            .collect();
        let procedure_types: BTreeSet<&str> = self
            .records
            .iter()
            .filter_map(|r| r.procedure_type_code.as_deref())
            .collect();

        Ok(FilterOptions {
            sectors: sectors.into_iter().map(str::to_string).collect(),
            procedure_types: procedure_types.into_iter().map(str::to_string).collect(),
        })
    }
}
