//! Record views over a table schema and the record serializer
//! assembled from a schema's stored-column codecs.

use std::collections::HashMap;

use pauldb_common::{internal_err, schema_err, Result};

use crate::codec::Codec;
use crate::schema::TableSchema;
use crate::value::Value;

/// A row viewed as a mapping from stored-column name to its value. Used
/// both for fully-populated rows read back out of storage and, with
/// default-factory columns filled in, for rows about to be inserted.
pub type StoredRecord = HashMap<String, Value>;

/// A row about to be inserted: like [`StoredRecord`], but columns carrying
/// a default factory may be omitted. [`fill_insert_defaults`]
/// resolves an `InsertRecord` into a full `StoredRecord`.
pub type InsertRecord = HashMap<String, Value>;

/// Fills in any column missing from `record` that has a default value
/// factory on `schema`, and errors if a column is missing with no default.
pub fn fill_insert_defaults(schema: &TableSchema, record: InsertRecord) -> Result<StoredRecord> {
    let mut out = record;
    for column in schema.stored_columns() {
        if out.contains_key(column.name()) {
            continue;
        }
        match column.default_value_factory() {
            Some(factory) => {
                out.insert(column.name().to_string(), factory());
            }
            None => {
                return schema_err!(
                    "missing value for column '{}' on table '{}', and it has no default",
                    column.name(),
                    schema.name()
                );
            }
        }
    }
    Ok(out)
}

/// The record codec for one `TableSchema`: a 4-byte big-endian payload
/// length (excluding those 4 bytes) followed by each stored column's bytes
/// in declaration order.
pub struct RecordCodec {
    table_name: String,
    columns: Vec<(String, std::sync::Arc<dyn Codec>)>,
}

impl RecordCodec {
    pub fn encode(&self, record: &StoredRecord) -> Result<Vec<u8>> {
        let mut payload = Vec::new();
        for (name, codec) in &self.columns {
            let value = record.get(name).ok_or_else(|| {
                pauldb_common::PaulDbError::Schema(format!(
                    "record for table '{}' is missing column '{name}'",
                    self.table_name
                ))
            })?;
            codec.encode(value, &mut payload)?;
        }
        let mut out = Vec::with_capacity(4 + payload.len());
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<StoredRecord> {
        if bytes.len() < 4 {
            return internal_err!("record buffer shorter than the length prefix");
        }
        let (len_bytes, mut rest) = bytes.split_at(4);
        let len = u32::from_be_bytes(len_bytes.try_into().unwrap()) as usize;
        if rest.len() < len {
            return internal_err!(
                "record payload shorter than its declared length: wanted {len}, had {}",
                rest.len()
            );
        }
        let mut record = StoredRecord::new();
        for (name, codec) in &self.columns {
            let value = codec.decode(&mut rest)?;
            record.insert(name.clone(), value);
        }
        Ok(record)
    }
}

/// Builds the record codec for `schema`, or `None` if any of its stored
/// columns has a type with no codec.
pub fn make_table_schema_struct(schema: &TableSchema) -> Option<RecordCodec> {
    let mut columns = Vec::with_capacity(schema.stored_columns().len());
    for column in schema.stored_columns() {
        let codec = column.value_type().codec()?;
        columns.push((column.name().to_string(), codec));
    }
    Some(RecordCodec {
        table_name: schema.name().to_string(),
        columns,
    })
}
