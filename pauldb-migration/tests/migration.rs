//! Integration tests for `MigrationEngine`, exercising its idempotency and
//! row-preservation guarantees.

use pauldb_expr::{ColumnType, DBSchema, StoredColumn, StoredRecord, TableSchema, Value};
use pauldb_migration::MigrationEngine;
use pauldb_physical_plan::DbFile;

mod support;
use support::MemDbFile;

fn target_schema() -> DBSchema {
    let cats = TableSchema::create("cats")
        .with_column(StoredColumn::new("name", ColumnType::string()))
        .unwrap();
    DBSchema::create(None).unwrap().with_tables(vec![cats]).unwrap()
}

#[test]
fn add_missing_tables_is_idempotent() {
    let db = MemDbFile::new();
    let target = target_schema();
    let engine = MigrationEngine::new(&db, &target);
    engine.add_missing_tables().unwrap();
    engine.add_missing_tables().unwrap();
    assert!(db.get_table_schema("cats").is_some());
}

#[test]
fn add_missing_column_preserves_rows() {
    let old_schema = TableSchema::create("cats")
        .with_column(StoredColumn::new("name", ColumnType::string()))
        .unwrap();
    let rows = vec![
        StoredRecord::from([("name".to_string(), Value::String("Fluffy".to_string()))]),
        StoredRecord::from([("name".to_string(), Value::String("Mittens".to_string()))]),
    ];
    let db = MemDbFile::new().with_table(old_schema, rows);

    let new_cats = TableSchema::create("cats")
        .with_column(StoredColumn::new("name", ColumnType::string()))
        .unwrap()
        .with_column(StoredColumn::new("age", ColumnType::int32()).default_to(|| Value::Int32(0)))
        .unwrap();
    let target = DBSchema::create(None).unwrap().with_tables(vec![new_cats]).unwrap();

    let engine = MigrationEngine::new(&db, &target);
    engine.add_missing_column("cats", "age").unwrap();

    assert_eq!(db.row_count("cats"), 2);
    let schema = db.get_table_schema("cats").unwrap();
    assert!(schema.has_column("age"));
}

#[test]
fn add_missing_column_requires_a_default() {
    let old_schema = TableSchema::create("cats")
        .with_column(StoredColumn::new("name", ColumnType::string()))
        .unwrap();
    let db = MemDbFile::new().with_table(old_schema, Vec::new());

    let new_cats = TableSchema::create("cats")
        .with_column(StoredColumn::new("name", ColumnType::string()))
        .unwrap()
        .with_column(StoredColumn::new("age", ColumnType::int32()))
        .unwrap();
    let target = DBSchema::create(None).unwrap().with_tables(vec![new_cats]).unwrap();

    let engine = MigrationEngine::new(&db, &target);
    let err = engine.add_missing_column("cats", "age").unwrap_err();
    assert!(err.to_string().contains("does not have a default value"));
}
