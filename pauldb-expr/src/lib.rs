//! The typed schema model, record codec and expression AST: `ColumnType`,
//! stored/computed columns, `TableSchema`/`DBSchema`, the record
//! serializer, and the `Expr` evaluation tree.
//!
//! This crate plays the role `datafusion-expr` plays for DataFusion:
//! everything above storage and below the plan tree, with no dependency on
//! either.

mod codec;
mod column;
mod column_type;
mod expr;
mod record;
mod row;
mod schema;
mod value;

pub use codec::{ArrayCodec, Codec, NullableCodec, PrimitiveCodec};
pub use column::{Column, ComputedColumn, ComputedInput, DefaultValueFactory, IndexConfig, StoredColumn};
pub use column_type::{ColumnType, ColumnTypeKind, TypeRegistry};
pub use expr::{AndOrExpr, BoolOp, ColumnRefExpr, CompareExpr, CompareOp, Expr, LiteralValueExpr};
pub use record::{fill_insert_defaults, make_table_schema_struct, InsertRecord, RecordCodec, StoredRecord};
pub use row::{Row, RowContext, PROJECTED_ROW_KEY};
pub use schema::{DBSchema, TableSchema, RESERVED_SYSTEM_NAME};
pub use value::Value;
