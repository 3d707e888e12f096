//! A minimal in-memory `DbFile`/`HeapTable` fake, mirroring the one in
//! `pauldb-physical-plan`'s own test suite.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pauldb_common::Result;
use pauldb_expr::{InsertRecord, StoredRecord, TableSchema};
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
    tables: Mutex<HashMap<String, Arc<MemHeapTable>>>,
}

impl MemDbFile {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
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

    pub fn row_count(&self, table_name: &str) -> usize {
        self.tables.lock().unwrap().get(table_name).map(|t| t.rows.lock().unwrap().len()).unwrap_or(0)
    }
}

impl DbFile for MemDbFile {
    fn get_table_schema(&self, table_name: &str) -> Option<TableSchema> {
        self.tables.lock().unwrap().get(table_name).map(|t| t.schema.clone())
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
