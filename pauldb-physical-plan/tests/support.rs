//! A minimal in-memory `DbFile`/`HeapTable` fake for exercising the plan
//! tree without a real storage layer.

use std::sync::{Arc, Mutex};

use pauldb_common::Result;
use pauldb_expr::{ColumnType, InsertRecord, StoredColumn, StoredRecord, TableSchema, Value};
use pauldb_physical_plan::{DbFile, HeapTable};

pub struct MemHeapTable {
    schema: TableSchema,
    rows: Mutex<Vec<StoredRecord>>,
}

impl HeapTable for MemHeapTable {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn insert(&self, record: InsertRecord) -> Result<()> {
        let record = pauldb_expr::fill_insert_defaults(&self.schema, record)?;
        self.rows.lock().unwrap().push(record);
        Ok(())
    }

    fn scan(self: Arc<Self>) -> Box<dyn Iterator<Item = Result<StoredRecord>> + Send> {
        let rows = self.rows.lock().unwrap().clone();
        Box::new(rows.into_iter().map(Ok))
    }
}

pub struct MemDbFile {
    tables: Mutex<std::collections::HashMap<String, Arc<MemHeapTable>>>,
}

impl MemDbFile {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(std::collections::HashMap::new()),
        }
    }

    pub fn with_table(self, schema: TableSchema, rows: Vec<StoredRecord>) -> Self {
        self.tables.lock().unwrap().insert(
            schema.name().to_string(),
            Arc::new(MemHeapTable {
                schema,
                rows: Mutex::new(rows),
            }),
        );
        self
    }
}

impl DbFile for MemDbFile {
    fn get_table_schema(&self, table_name: &str) -> Option<TableSchema> {
        self.tables
            .lock()
            .unwrap()
            .get(table_name)
            .map(|t| t.schema.clone())
    }

    fn get_schemas(&self) -> Vec<TableSchema> {
        self.tables.lock().unwrap().values().map(|t| t.schema.clone()).collect()
    }

    fn get_or_create_table(&self, schema: &TableSchema) -> Result<Arc<dyn HeapTable>> {
        let mut tables = self.tables.lock().unwrap();
        let table = tables.entry(schema.name().to_string()).or_insert_with(|| {
            Arc::new(MemHeapTable {
                schema: schema.clone(),
                rows: Mutex::new(Vec::new()),
            })
        });
        Ok(Arc::clone(table) as Arc<dyn HeapTable>)
    }

    fn rename_table(&self, old_name: &str, new_name: &str) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(table) = tables.remove(old_name) {
            tables.insert(new_name.to_string(), table);
        }
        Ok(())
    }

    fn drop_table(&self, table_name: &str) -> Result<()> {
        self.tables.lock().unwrap().remove(table_name);
        Ok(())
    }
}

fn cats_schema() -> TableSchema {
    TableSchema::create("cats")
        .with_column(StoredColumn::new("name", ColumnType::string()))
        .unwrap()
        .with_column(StoredColumn::new("age", ColumnType::int32()))
        .unwrap()
}

pub fn memdb_with_cats(cats: Vec<(&str, i32)>) -> MemDbFile {
    let rows = cats
        .into_iter()
        .map(|(name, age)| {
            StoredRecord::from([
                ("name".to_string(), Value::String(name.to_string())),
                ("age".to_string(), Value::Int32(age)),
            ])
        })
        .collect();
    MemDbFile::new().with_table(cats_schema(), rows)
}

pub fn memdb_with_cats_and_owners() -> MemDbFile {
    let cats_rows = vec![
        StoredRecord::from([
            ("name".to_string(), Value::String("Whiskers".to_string())),
            ("age".to_string(), Value::Int32(2)),
            ("owner_id".to_string(), Value::Int32(1)),
        ]),
        StoredRecord::from([
            ("name".to_string(), Value::String("Tom".to_string())),
            ("age".to_string(), Value::Int32(4)),
            ("owner_id".to_string(), Value::Int32(2)),
        ]),
    ];
    let cats = cats_schema()
        .with_column(StoredColumn::new("owner_id", ColumnType::int32()))
        .unwrap();

    let owners_schema = TableSchema::create("owners")
        .with_column(StoredColumn::new("id", ColumnType::int32()))
        .unwrap();
    let owners_rows = vec![
        StoredRecord::from([("id".to_string(), Value::Int32(1))]),
        StoredRecord::from([("id".to_string(), Value::Int32(2))]),
    ];

    MemDbFile::new()
        .with_table(cats, cats_rows)
        .with_table(owners_schema, owners_rows)
}
