//! The lazy row stream every plan node produces and consumes.
//!
//! Modeled as a plain pull-based iterator with no self-spawned parallelism.
//! Dropping the iterator before exhausting it is the cancellation hook —
//! whatever heap-table resources a node is holding are released by ordinary
//! `Drop`, since nothing here holds a resource across an await point (there
//! are none).

use pauldb_common::Result;
use pauldb_expr::RowContext;

/// A single-pass, non-restartable stream of row contexts flowing between
/// plan nodes.
pub type RowStream = Box<dyn Iterator<Item = Result<RowContext>> + Send>;
