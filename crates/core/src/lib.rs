//! Core types and configuration for the tender dashboard.
//!
//! This crate provides shared types used across all other crates:
//! - Tender records and filter parameters
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
