//! The error type shared by every PaulDB crate, and the `Result` alias built
//! on top of it. Modeled on `datafusion_common::DataFusionError`: a flat enum
//! with one variant per failure category, each carrying a human-readable
//! message and no numeric code.

use std::fmt;

/// Errors produced anywhere in the PaulDB core: schema construction, plan
/// building, expression evaluation, SQL translation and migration.
#[derive(Debug, thiserror::Error)]
pub enum PaulDbError {
    /// The SQL text could not be parsed at all.
    #[error("SQL parse error: {0}")]
    SqlParse(String),

    /// A SQL construct is syntactically valid but not supported by the
    /// planner (GROUP BY, HAVING, DISTINCT, WITH, window functions, ...).
    #[error("This feature is not implemented: {0}")]
    NotImplemented(String),

    /// A referenced table does not exist in the schema or in storage.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// A referenced column does not exist on the table(s) in scope.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// An unqualified column reference matched more than one table in scope.
    #[error("Ambiguous column reference: {0}")]
    Ambiguous(String),

    /// A schema construction or migration precondition failed (duplicate
    /// column, missing default factory, reserved name, incompatible model).
    #[error("Schema error: {0}")]
    Schema(String),

    /// An invariant that PaulDB itself is supposed to uphold was violated.
    /// Seeing this means a bug in PaulDB, not bad input.
    #[error("Internal error: {0}. This was likely caused by a bug in PaulDB's code, please file a bug report")]
    Internal(String),
}

/// The `Result` alias used throughout PaulDB, mirroring
/// `datafusion_common::Result`.
pub type Result<T, E = PaulDbError> = std::result::Result<T, E>;

impl PaulDbError {
    /// Adds a prefix to the error's message, used to attach context while
    /// propagating an error up through `?`.
    pub fn context(self, message: impl fmt::Display) -> Self {
        let wrap = |inner: String| format!("{message}: {inner}");
        match self {
            PaulDbError::SqlParse(s) => PaulDbError::SqlParse(wrap(s)),
            PaulDbError::NotImplemented(s) => PaulDbError::NotImplemented(wrap(s)),
            PaulDbError::TableNotFound(s) => PaulDbError::TableNotFound(wrap(s)),
            PaulDbError::ColumnNotFound(s) => PaulDbError::ColumnNotFound(wrap(s)),
            PaulDbError::Ambiguous(s) => PaulDbError::Ambiguous(wrap(s)),
            PaulDbError::Schema(s) => PaulDbError::Schema(wrap(s)),
            PaulDbError::Internal(s) => PaulDbError::Internal(wrap(s)),
        }
    }
}

/// Helper trait mirroring `datafusion_common`'s `context()` extension on
/// `Result`, so call sites can do `thing().context("building foo")?`.
pub trait ResultExt<T> {
    fn context(self, message: impl fmt::Display) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, message: impl fmt::Display) -> Result<T> {
        self.map_err(|e| e.context(message))
    }
}

/// Builds an `Err(PaulDbError::NotImplemented(..))`, for use as a bare
/// expression (e.g. the whole body of an unsupported-branch match arm).
#[macro_export]
macro_rules! not_impl_err {
    ($($arg:tt)*) => {
        Err($crate::PaulDbError::NotImplemented(format!($($arg)*)))
    };
}

/// Builds an `Err(PaulDbError::SqlParse(..))`.
#[macro_export]
macro_rules! sql_parse_err {
    ($($arg:tt)*) => {
        Err($crate::PaulDbError::SqlParse(format!($($arg)*)))
    };
}

/// Builds an `Err(PaulDbError::TableNotFound(..))`.
#[macro_export]
macro_rules! table_not_found_err {
    ($($arg:tt)*) => {
        Err($crate::PaulDbError::TableNotFound(format!($($arg)*)))
    };
}

/// Builds an `Err(PaulDbError::ColumnNotFound(..))`.
#[macro_export]
macro_rules! column_not_found_err {
    ($($arg:tt)*) => {
        Err($crate::PaulDbError::ColumnNotFound(format!($($arg)*)))
    };
}

/// Builds an `Err(PaulDbError::Ambiguous(..))`.
#[macro_export]
macro_rules! ambiguous_err {
    ($($arg:tt)*) => {
        Err($crate::PaulDbError::Ambiguous(format!($($arg)*)))
    };
}

/// Builds an `Err(PaulDbError::Schema(..))`.
#[macro_export]
macro_rules! schema_err {
    ($($arg:tt)*) => {
        Err($crate::PaulDbError::Schema(format!($($arg)*)))
    };
}

/// Builds an `Err(PaulDbError::Internal(..))`.
#[macro_export]
macro_rules! internal_err {
    ($($arg:tt)*) => {
        Err($crate::PaulDbError::Internal(format!($($arg)*)))
    };
}
