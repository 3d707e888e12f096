//! `Select`: projects named expressions out of the input row context
//! into a single-table output row, keyed by `$0` (`PROJECTED_ROW_KEY`).
//! A later `add_column` call for a name already present replaces that
//! column's expression in place, keeping its original output position.

use indexmap::IndexMap;

use pauldb_common::Result;
use pauldb_expr::{Expr, Row, RowContext, TableSchema, PROJECTED_ROW_KEY};

use crate::dbfile::DbFile;
use crate::plan::QueryPlanNode;
use crate::stream::RowStream;

#[derive(Debug)]
pub struct SelectNode {
    pub input: Box<QueryPlanNode>,
    columns: IndexMap<String, Expr>,
}

impl SelectNode {
    pub fn new(input: QueryPlanNode) -> Self {
        Self {
            input: Box::new(input),
            columns: IndexMap::new(),
        }
    }

    /// Appends `name` -> `expr`. A repeat of `name` overwrites the earlier
    /// expression without moving it to the end of the output.
    pub fn add_column(&mut self, name: impl Into<String>, expr: Expr) -> &mut Self {
        self.columns.insert(name.into(), expr);
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn execute(&self, db: &dyn DbFile) -> Result<RowStream> {
        let rows = self.input.execute(db)?;
        let columns: Vec<(String, Expr)> = self
            .columns
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let projected = rows.map(move |row| {
            let ctx = row?;
            let mut out = Row::new();
            for (name, expr) in &columns {
                out.insert(name.clone(), expr.evaluate(&ctx)?);
            }
            Ok(RowContext::from([(PROJECTED_ROW_KEY.to_string(), out)]))
        });
        Ok(Box::new(projected))
    }

    pub fn get_schema(&self, _db: &dyn DbFile) -> Result<TableSchema> {
        let mut schema = TableSchema::create(PROJECTED_ROW_KEY);
        for (name, expr) in &self.columns {
            schema = schema.with_column(pauldb_expr::StoredColumn::new(
                name.clone(),
                expr.get_type().clone(),
            ))?;
        }
        Ok(schema)
    }
}
