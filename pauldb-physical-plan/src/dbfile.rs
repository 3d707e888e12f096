//! The storage-layer collaborator interfaces the plan tree consumes: an
//! abstract heap table (insert/iterate/drop) and a `DbFile` capable of
//! listing schemas, creating/renaming/dropping tables, and returning heap
//! tables by name. The actual page-managed storage engine is out of scope
//! here; these are the traits it would implement.
//!
//! PaulDB's core takes both as trait objects so an in-memory fake (as used
//! throughout this crate's tests, and shipped as `pauldb::mem::MemDbFile`)
//! can stand in for a real page-managed store.

use std::sync::Arc;

use pauldb_common::{table_not_found_err, Result};
use pauldb_expr::{InsertRecord, StoredRecord, TableSchema};

/// A single table's physical storage: insert, iterate, nothing else. The
/// page manager and on-disk layout are not this crate's concern.
pub trait HeapTable: Send + Sync {
    fn schema(&self) -> &TableSchema;

    /// Inserts one record, applying any default-factory values for columns
    /// missing from `record`.
    fn insert(&self, record: InsertRecord) -> Result<()>;

    /// Opens a single-pass, insertion-order iterator over this table's
    /// rows. Takes `Arc<Self>` so the returned iterator can outlive the
    /// borrow that produced it.
    fn scan(self: Arc<Self>) -> Box<dyn Iterator<Item = Result<StoredRecord>> + Send>;
}

/// The database-level collaborator: schema bookkeeping plus table
/// lifecycle, consumed by both the plan tree and the migration engine.
pub trait DbFile: Send + Sync {
    /// The live schema for `table_name`, if that table exists in storage.
    fn get_table_schema(&self, table_name: &str) -> Option<TableSchema>;

    /// Every table schema currently in storage.
    fn get_schemas(&self) -> Vec<TableSchema>;

    /// Like [`DbFile::get_table_schema`], but raises `TableNotFound`
    /// instead of returning `None`.
    fn get_schema_or_throw(&self, table_name: &str) -> Result<TableSchema> {
        self.get_table_schema(table_name)
            .ok_or_else(|| pauldb_common::PaulDbError::TableNotFound(table_name.to_string()))
    }

    /// Idempotent: if `schema.name()` already exists in storage, returns
    /// the existing table unchanged; otherwise creates it.
    fn get_or_create_table(&self, schema: &TableSchema) -> Result<Arc<dyn HeapTable>>;

    /// Returns the heap table for `table_name`, or `TableNotFound`.
    fn get_table(&self, table_name: &str) -> Result<Arc<dyn HeapTable>> {
        match self.get_table_schema(table_name) {
            Some(schema) => self.get_or_create_table(&schema),
            None => table_not_found_err!("{table_name}"),
        }
    }

    /// Renames a table in storage, keeping its data.
    fn rename_table(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Drops a table and its data from storage.
    fn drop_table(&self, table_name: &str) -> Result<()>;
}
