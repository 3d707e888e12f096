//! PaulDB: an embedded relational database covering a typed schema model,
//! a query planner/execution pipeline, and a SQL front-end.
//!
//! This crate is the façade: it composes `pauldb-common`, `pauldb-expr`,
//! `pauldb-physical-plan`, `pauldb-sql` and `pauldb-migration` the way
//! `datafusion` (core) composes its own split-out crates, and ships an
//! in-memory `DbFile` so the whole pipeline is exercisable without the
//! out-of-scope storage engine.
//!
//! ```
//! use pauldb::Database;
//!
//! let mut db = Database::create_in_memory();
//! db.execute("CREATE TABLE points (x FLOAT, y FLOAT, color TEXT)").unwrap();
//! db.execute("INSERT INTO points (x, y, color) VALUES (1.0, 2.0, 'green')").unwrap();
//! let results = db.execute("SELECT * FROM points WHERE color = 'green'").unwrap();
//! assert_eq!(results.len(), 1);
//! ```

mod database;
pub mod mem;

pub use database::{Database, ExecutionResult};
pub use pauldb_common::{PaulDbError, Result};
pub use pauldb_expr::{
    Column, ColumnType, ComputedColumn, DBSchema, Expr, StoredColumn, TableSchema, Value,
};
pub use pauldb_migration::MigrationEngine;
pub use pauldb_physical_plan::{DbFile, HeapTable, QueryPlanNode};
pub use pauldb_sql::{SqlToPlan, Statement, StatementResult};
