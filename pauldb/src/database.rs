//! The external façade: `Database::execute`, the sole SQL entry point, plus
//! `Database::create_in_memory` for exercising the whole pipeline without a
//! real storage engine.

use pauldb_common::Result;
use pauldb_physical_plan::DbFile;
use pauldb_sql::{ParserOptions, SqlToPlan, StatementResult};

use crate::mem::MemDbFile;

/// One statement's result, re-exported at the crate root so callers don't
/// need to depend on `pauldb-sql` directly.
pub use pauldb_sql::StatementResult as ExecutionResult;

/// An embedded database: a `DbFile` plus the SQL translator that runs
/// against it.
pub struct Database {
    db: Box<dyn DbFile>,
    planner: SqlToPlan,
}

impl Database {
    /// Wraps an existing `DbFile` implementation (typically a real,
    /// page-managed store, out of this crate's scope).
    pub fn new(db: Box<dyn DbFile>) -> Self {
        Self {
            db,
            planner: SqlToPlan::new(ParserOptions::default()),
        }
    }

    /// An in-process database backed entirely by `HashMap`s, with no
    /// durability — the same role `SessionContext` plus `MemTable` play in
    /// a typical test suite or doc example.
    pub fn create_in_memory() -> Self {
        Self::new(Box::new(MemDbFile::new()))
    }

    /// Runs every statement parsed out of `sql`, in source order. A
    /// failing statement aborts the batch at that point; statements already
    /// applied are not rolled back.
    pub fn execute(&mut self, sql: &str) -> Result<Vec<ExecutionResult>> {
        self.planner.execute_sql(sql, self.db.as_ref())
    }
}
