//! Query layer for the tender dashboard.
//!
//! This crate handles:
//! - The `TenderSource` abstraction over filtered record queries
//! - SQLite-backed queries with row validation at the boundary
//! - Time-bounded caching of query results keyed by filters
//! - An in-memory source for tests and embedding

pub mod source;
pub mod sqlite;
pub mod cache;

pub use source::{FilterOptions, MemoryTenderSource, TenderSource};
pub use sqlite::SqliteTenderSource;
pub use cache::{cached_source, CachedTenderSource};
