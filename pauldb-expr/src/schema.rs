//! `TableSchema` and `DBSchema`, built through a fluent, immutable
//! builder sequence.

use indexmap::IndexMap;

use pauldb_common::{schema_err, Result};

use crate::column::{Column, ComputedColumn, StoredColumn};
use crate::column_type::ColumnType;
use crate::value::Value;

/// The reserved database name: rejected by every `DBSchema` constructor.
pub const RESERVED_SYSTEM_NAME: &str = "$system";

/// A table's column layout: stored columns (in declaration order),
/// computed columns (in declaration order, each only ever referencing
/// stored columns declared before it) and a name-indexed lookup over both.
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    stored_columns: Vec<StoredColumn>,
    computed_columns: Vec<ComputedColumn>,
    columns_by_name: IndexMap<String, Column>,
}

impl TableSchema {
    /// Starts an empty schema for `name`.
    pub fn create(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stored_columns: Vec::new(),
            computed_columns: Vec::new(),
            columns_by_name: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stored_columns(&self) -> &[StoredColumn] {
        &self.stored_columns
    }

    pub fn computed_columns(&self) -> &[ComputedColumn] {
        &self.computed_columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns_by_name.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns_by_name.contains_key(name)
    }

    /// Returns a clone of this schema under a new name, keeping every
    /// column unchanged.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Appends one stored column. Duplicate names raise a schema error
    ///.
    pub fn with_column(mut self, column: StoredColumn) -> Result<Self> {
        if self.columns_by_name.contains_key(column.name()) {
            return schema_err!(
                "column already exists: '{}' on table '{}'",
                column.name(),
                self.name
            );
        }
        self.columns_by_name
            .insert(column.name().to_string(), Column::Stored(column.clone()));
        self.stored_columns.push(column);
        Ok(self)
    }

    /// Appends several stored columns in order, mirroring the variadic
    /// `.with(...cols)` builder method.
    pub fn with(mut self, columns: impl IntoIterator<Item = StoredColumn>) -> Result<Self> {
        for column in columns {
            self = self.with_column(column)?;
        }
        Ok(self)
    }

    /// Appends a computed column. Its input is implicitly the set of
    /// stored columns declared so far — computed columns cannot reference
    /// columns declared after them, which PaulDB enforces simply by
    /// never making later-declared columns available to `compute`.
    pub fn with_computed_column(mut self, column: ComputedColumn) -> Result<Self> {
        if self.columns_by_name.contains_key(column.name()) {
            return schema_err!(
                "column already exists: '{}' on table '{}'",
                column.name(),
                self.name
            );
        }
        self.columns_by_name.insert(
            column.name().to_string(),
            Column::Computed(column.clone()),
        );
        self.computed_columns.push(column);
        Ok(self)
    }

    /// Appends a computed column that derives a uniqueness constraint's
    /// key: any table with a unique constraint also carries the computed
    /// column that implements it.
    pub fn with_unique_constraint(
        self,
        name: impl Into<String>,
        value_type: ColumnType,
        _columns: Vec<String>,
        compute: impl Fn(&crate::column::ComputedInput) -> Value + Send + Sync + 'static,
    ) -> Result<Self> {
        let column = ComputedColumn::new(name, value_type, compute).with_unique_constraint();
        self.with_computed_column(column)
    }
}

/// A named collection of table schemas: the unit a migration reconciles
/// against storage.
#[derive(Debug, Clone)]
pub struct DBSchema {
    name: String,
    schemas: IndexMap<String, TableSchema>,
}

impl DBSchema {
    pub const DEFAULT_NAME: &'static str = "default";

    /// Creates an empty `DBSchema`. `name` defaults to `"default"`; the
    /// reserved name `$system` is rejected.
    pub fn create(name: Option<&str>) -> Result<Self> {
        let name = name.unwrap_or(Self::DEFAULT_NAME);
        if name == RESERVED_SYSTEM_NAME {
            return schema_err!("'{RESERVED_SYSTEM_NAME}' is a reserved database name");
        }
        Ok(Self {
            name: name.to_string(),
            schemas: IndexMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.schemas.values()
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.schemas.get(name)
    }

    /// Merges `tables` into this schema by name. A later `with_tables` call
    /// overwrites an earlier one's table of the same name; two tables with
    /// the same name passed to a *single* call are a schema error.
    pub fn with_tables(mut self, tables: impl IntoIterator<Item = TableSchema>) -> Result<Self> {
        let mut seen_this_call = std::collections::HashSet::new();
        for table in tables {
            if !seen_this_call.insert(table.name().to_string()) {
                return schema_err!(
                    "duplicate table name in a single with_tables call: '{}'",
                    table.name()
                );
            }
            self.schemas.insert(table.name().to_string(), table);
        }
        Ok(self)
    }
}
