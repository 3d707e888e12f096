//! The additive schema migration engine: bringing an existing `DbFile` up
//! to a target `DBSchema` by adding missing tables and columns, never by
//! dropping or renaming target-schema state.

mod engine;

pub use engine::{MigrationEngine, Model, MIGRATION_TABLE_PREFIX};
