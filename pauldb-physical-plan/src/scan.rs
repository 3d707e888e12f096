//! `TableScan`: iterates a heap table in insertion order, emitting
//! rows keyed by the table's alias so joins can resolve qualified columns.

use std::sync::Arc;

use pauldb_common::Result;
use pauldb_expr::{RowContext, TableSchema};

use crate::dbfile::DbFile;
use crate::stream::RowStream;

#[derive(Debug, Clone)]
pub struct TableScanNode {
    /// The table's name in storage.
    pub table_name: String,
    /// The alias rows are keyed under in the row context. Equal to
    /// `table_name` unless the SQL gave the table an `AS` alias.
    pub alias: String,
}

impl TableScanNode {
    pub fn new(table_name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            alias: alias.into(),
        }
    }

    pub fn execute(&self, db: &dyn DbFile) -> Result<RowStream> {
        log::debug!("opening table scan over '{}' as '{}'", self.table_name, self.alias);
        let table = db.get_table(&self.table_name)?;
        let alias = self.alias.clone();
        let rows = Arc::clone(&table).scan().map(move |row| {
            let row = row?;
            Ok(RowContext::from([(alias.clone(), row)]))
        });
        Ok(Box::new(rows))
    }

    pub fn get_schema(&self, db: &dyn DbFile) -> Result<TableSchema> {
        Ok(db.get_schema_or_throw(&self.table_name)?.with_name(&self.alias))
    }
}
