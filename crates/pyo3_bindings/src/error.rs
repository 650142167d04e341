//! Error handling and Python exception mapping.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::PyErr;
use tendly_core::Error;

/// Python exception class a dashboard error is raised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExceptionKind {
    /// `ValueError`: the caller passed something unusable.
    Value,
    /// `RuntimeError`: the environment failed (database, file system).
    Runtime,
}

impl ExceptionKind {
    pub(crate) fn of(err: &Error) -> Self {
        match err {
            Error::InvalidConfiguration(_) | Error::Data(_) => ExceptionKind::Value,
            Error::Database(_) | Error::Io(_) | Error::Json(_) => ExceptionKind::Runtime,
        }
    }
}

/// Convert a dashboard error to a Python exception.
pub(crate) fn to_py_err(err: Error) -> PyErr {
    let msg = err.to_string();
    match ExceptionKind::of(&err) {
        ExceptionKind::Value => PyValueError::new_err(msg),
        ExceptionKind::Runtime => PyRuntimeError::new_err(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors_raise_value_error() {
        assert_eq!(
            ExceptionKind::of(&Error::invalid_configuration("bucket_count must be positive")),
            ExceptionKind::Value
        );
        assert_eq!(
            ExceptionKind::of(&Error::data("invalid date")),
            ExceptionKind::Value
        );
    }

    #[test]
    fn test_environment_errors_raise_runtime_error() {
        assert_eq!(
            ExceptionKind::of(&Error::database("no such table")),
            ExceptionKind::Runtime
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(ExceptionKind::of(&Error::from(io)), ExceptionKind::Runtime);
        let json = serde_json::from_str::<u32>("x").unwrap_err();
        assert_eq!(ExceptionKind::of(&Error::from(json)), ExceptionKind::Runtime);
    }
}
