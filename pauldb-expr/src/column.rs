//! Stored and computed column descriptors and their fluent builders
//!.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::column_type::ColumnType;
use crate::value::Value;

/// Indexing configuration attached to a stored column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexConfig {
    pub should_index: bool,
    pub order: Option<i32>,
    pub in_memory: Option<bool>,
}

impl IndexConfig {
    /// Default configuration applied by `.unique()` when no explicit
    /// config is given.
    pub fn unique_default() -> Self {
        Self {
            should_index: true,
            order: Some(2),
            in_memory: Some(false),
        }
    }

    /// Default configuration applied by `.index()` when no explicit config
    /// is given: indexing turned on, no other opinion.
    pub fn index_default() -> Self {
        Self {
            should_index: true,
            order: None,
            in_memory: None,
        }
    }
}

/// A default-value factory for a stored column's optional default. Wrapped
/// in `Arc` so `StoredColumn` stays `Clone`, matching the cheap-clone
/// builder pattern used for logical plan nodes elsewhere in this crate.
pub type DefaultValueFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// A column whose value lives on disk in every row.
#[derive(Clone)]
pub struct StoredColumn {
    name: String,
    value_type: ColumnType,
    is_unique: bool,
    indexed: IndexConfig,
    default_value_factory: Option<DefaultValueFactory>,
}

impl fmt::Debug for StoredColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredColumn")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("is_unique", &self.is_unique)
            .field("indexed", &self.indexed)
            .field("has_default", &self.default_value_factory.is_some())
            .finish()
    }
}

impl StoredColumn {
    pub fn new(name: impl Into<String>, value_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            value_type,
            is_unique: false,
            indexed: IndexConfig::default(),
            default_value_factory: None,
        }
    }

    /// An auto-incrementing, always-unique, always-indexed `serial` column.
    ///
    /// TODO(storage): the default factory here is a placeholder. Real id
    /// allocation is the storage layer's job — this factory exists only so
    /// schema construction always has a default-factory slot to fill, and
    /// panics if ever actually invoked.
    pub fn serial(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::serial())
            .unique(None)
            .default_to(|| panic!("serial column default invoked without storage override"))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ColumnType {
        &self.value_type
    }

    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    pub fn indexed(&self) -> IndexConfig {
        self.indexed
    }

    pub fn default_value_factory(&self) -> Option<&DefaultValueFactory> {
        self.default_value_factory.as_ref()
    }

    /// Marks this column unique and indexed, with `cfg` overriding the
    /// `{order: 2, in_memory: false}` default.
    pub fn unique(mut self, cfg: Option<IndexConfig>) -> Self {
        self.is_unique = true;
        self.indexed = cfg.unwrap_or_else(IndexConfig::unique_default);
        self
    }

    /// Marks this column indexed without implying uniqueness.
    pub fn index(mut self, cfg: Option<IndexConfig>) -> Self {
        self.indexed = cfg.unwrap_or_else(IndexConfig::index_default);
        self
    }

    /// Clones this column under a new name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn default_to(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default_value_factory = Some(Arc::new(factory));
        self
    }

    /// Wraps this column's type so `null` also becomes valid.
    pub fn nullable(mut self) -> Self {
        self.value_type = self.value_type.nullable();
        self
    }

    /// Wraps this column's type so an array of the original type becomes
    /// valid.
    pub fn array(mut self) -> Self {
        self.value_type = self.value_type.array();
        self
    }
}

/// The subset of a row visible to a computed column's `compute` function:
/// the stored columns declared before it, by name.
pub type ComputedInput = HashMap<String, Value>;

/// A column whose value is derived from previously-declared stored columns
/// and is never itself persisted.
#[derive(Clone)]
pub struct ComputedColumn {
    name: String,
    value_type: ColumnType,
    is_unique: bool,
    indexed: IndexConfig,
    compute: Arc<dyn Fn(&ComputedInput) -> Value + Send + Sync>,
}

impl fmt::Debug for ComputedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedColumn")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("is_unique", &self.is_unique)
            .field("indexed", &self.indexed)
            .finish()
    }
}

impl ComputedColumn {
    pub fn new(
        name: impl Into<String>,
        value_type: ColumnType,
        compute: impl Fn(&ComputedInput) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            value_type,
            is_unique: false,
            indexed: IndexConfig::default(),
            compute: Arc::new(compute),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ColumnType {
        &self.value_type
    }

    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    pub fn indexed(&self) -> IndexConfig {
        self.indexed
    }

    pub fn compute(&self, input: &ComputedInput) -> Value {
        (self.compute)(input)
    }

    pub(crate) fn with_unique_constraint(mut self) -> Self {
        self.is_unique = true;
        self.indexed.should_index = true;
        self
    }
}

/// Either kind of column a `TableSchema` can carry.
#[derive(Debug, Clone)]
pub enum Column {
    Stored(StoredColumn),
    Computed(ComputedColumn),
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Column::Stored(c) => c.name(),
            Column::Computed(c) => c.name(),
        }
    }

    pub fn value_type(&self) -> &ColumnType {
        match self {
            Column::Stored(c) => c.value_type(),
            Column::Computed(c) => c.value_type(),
        }
    }

    pub fn is_unique(&self) -> bool {
        match self {
            Column::Stored(c) => c.is_unique(),
            Column::Computed(c) => c.is_unique(),
        }
    }

    pub fn indexed(&self) -> IndexConfig {
        match self {
            Column::Stored(c) => c.indexed(),
            Column::Computed(c) => c.indexed(),
        }
    }
}
