//! The migration engine: reconciles an existing `DbFile` toward a
//! target `DBSchema` by adding missing tables and missing columns. Purely
//! additive — it never drops or renames a target-schema column, and it is
//! not transactional across its own steps (a failure partway through
//! `add_missing_column` can leave a `$migration_<name>` table behind for
//! manual inspection).

use std::collections::HashMap;
use std::sync::Arc;

use pauldb_common::{schema_err, table_not_found_err, Result};
use pauldb_expr::{Column, DBSchema};
use pauldb_physical_plan::{DbFile, HeapTable};

/// The reserved table-name prefix the migration engine uses for its
/// rename-copy-drop dance.
pub const MIGRATION_TABLE_PREFIX: &str = "$migration_";

pub struct MigrationEngine<'a> {
    db: &'a dyn DbFile,
    target: &'a DBSchema,
}

/// The result of [`MigrationEngine::get_model`]: every target table's live
/// heap-table handle, keyed by name.
pub struct Model<'a> {
    pub tables: HashMap<String, Arc<dyn HeapTable>>,
    pub target: &'a DBSchema,
}

impl<'a> MigrationEngine<'a> {
    pub fn new(db: &'a dyn DbFile, target: &'a DBSchema) -> Self {
        Self { db, target }
    }

    /// Creates every target table missing from storage, in declaration
    /// order. Idempotent: a table already present is left untouched
    /// (`get_or_create_table` itself guarantees this).
    pub fn add_missing_tables(&self) -> Result<()> {
        for schema in self.target.tables() {
            log::debug!("ensuring table '{}' exists", schema.name());
            self.db.get_or_create_table(schema)?;
        }
        Ok(())
    }

    /// Adds one missing column to an existing table, via a five-step
    /// procedure: rename the old table out of the way, materialize the new
    /// schema under the original name, copy every row across (applying the
    /// new column's default factory), then drop the renamed-aside table.
    pub fn add_missing_column(&self, table_name: &str, column_name: &str) -> Result<()> {
        let old_schema = self
            .db
            .get_table_schema(table_name)
            .ok_or_else(|| pauldb_common::PaulDbError::TableNotFound(table_name.to_string()))?;
        if old_schema.has_column(column_name) {
            return schema_err!("table '{table_name}' already has column '{column_name}'");
        }
        let target_schema = self
            .target
            .table(table_name)
            .ok_or_else(|| pauldb_common::PaulDbError::TableNotFound(table_name.to_string()))?;
        let new_column = match target_schema.column(column_name) {
            Some(Column::Stored(c)) => c,
            Some(Column::Computed(_)) => {
                return schema_err!("'{column_name}' is a computed column and cannot be migrated in")
            }
            None => return schema_err!("target schema has no column '{column_name}' on table '{table_name}'"),
        };
        if new_column.default_value_factory().is_none() {
            return schema_err!("column '{column_name}' does not have a default value");
        }

        log::debug!("migrating table '{table_name}': adding column '{column_name}'");

        let old_table = self.db.get_table(table_name)?;
        let staging_name = format!("{MIGRATION_TABLE_PREFIX}{table_name}");
        self.db.rename_table(table_name, &staging_name)?;

        let new_table = self.db.get_or_create_table(target_schema)?;
        for row in Arc::clone(&old_table).scan() {
            new_table.insert(row?)?;
        }

        self.db.drop_table(&staging_name)?;
        Ok(())
    }

    /// For every target table already in storage, adds any column present
    /// in the target schema but missing in storage.
    pub fn add_missing_columns(&self) -> Result<()> {
        for target_schema in self.target.tables() {
            let stored_schema = match self.db.get_table_schema(target_schema.name()) {
                Some(s) => s,
                None => return table_not_found_err!("{}", target_schema.name()),
            };
            for column in target_schema.stored_columns() {
                if !stored_schema.has_column(column.name()) {
                    self.add_missing_column(target_schema.name(), column.name())?;
                }
            }
        }
        Ok(())
    }

    /// Validates that every target table and column exists in storage and
    /// returns live handles to each, plus the target schema they were
    /// checked against.
    pub fn get_model(&self) -> Result<Model<'a>> {
        let mut tables = HashMap::new();
        for target_schema in self.target.tables() {
            let stored_schema = self
                .db
                .get_table_schema(target_schema.name())
                .ok_or_else(|| pauldb_common::PaulDbError::TableNotFound(target_schema.name().to_string()))?;
            for column in target_schema.stored_columns() {
                if !stored_schema.has_column(column.name()) {
                    return schema_err!(
                        "table '{}' is missing column '{}'",
                        target_schema.name(),
                        column.name()
                    );
                }
            }
            tables.insert(target_schema.name().to_string(), self.db.get_table(target_schema.name())?);
        }
        Ok(Model {
            tables,
            target: self.target,
        })
    }
}
