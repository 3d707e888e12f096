//! Error types and small shared utilities used across every PaulDB crate.
//!
//! This crate sits at the bottom of the workspace dependency graph, the way
//! `datafusion-common` does for DataFusion: nothing here depends on any
//! other PaulDB crate.

mod error;

pub use error::{PaulDbError, Result, ResultExt};
