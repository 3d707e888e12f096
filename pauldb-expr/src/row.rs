//! The row context carried along the plan pipeline: a mapping from
//! table alias to row, so multi-table expressions can resolve qualified
//! column references.

use std::collections::HashMap;

use crate::value::Value;

/// One table's row: stored-column name to value.
pub type Row = HashMap<String, Value>;

/// A keyed row context: `$0` after projection collapses it to a single
/// table, one alias per table while scans and joins are still in play.
pub type RowContext = HashMap<String, Row>;

/// The alias projection collapses every input table under.
pub const PROJECTED_ROW_KEY: &str = "$0";
