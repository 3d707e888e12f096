//! `Join`: a nested-loop inner join. The right side is materialized
//! once so it can be rescanned for each left row; the left side stays a
//! lazy stream.

use std::sync::Arc;

use pauldb_common::Result;
use pauldb_expr::{Expr, RowContext, TableSchema, Value};

use crate::dbfile::DbFile;
use crate::plan::QueryPlanNode;
use crate::stream::RowStream;

#[derive(Debug)]
pub struct JoinNode {
    pub left: Box<QueryPlanNode>,
    pub right: Box<QueryPlanNode>,
    pub on: Expr,
}

impl JoinNode {
    pub fn new(left: QueryPlanNode, right: QueryPlanNode, on: Expr) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
            on,
        }
    }

    pub fn execute(&self, db: &dyn DbFile) -> Result<RowStream> {
        let left_rows = self.left.execute(db)?;
        let right_rows: Vec<RowContext> = itertools::process_results(self.right.execute(db)?, |rows| rows.collect())?;
        let right_rows = Arc::new(right_rows);
        let on = self.on.clone();

        let joined = left_rows.flat_map(move |left_row| {
            let right_rows = Arc::clone(&right_rows);
            let on = on.clone();
            let left_row = match left_row {
                Ok(row) => row,
                Err(e) => return vec![Err(e)].into_iter(),
            };
            let mut matches = Vec::new();
            for right_row in right_rows.iter() {
                let mut merged = left_row.clone();
                merged.extend(right_row.clone());
                match on.evaluate(&merged) {
                    Ok(Value::Bool(true)) => matches.push(Ok(merged)),
                    Ok(_) => {}
                    Err(e) => matches.push(Err(e)),
                }
            }
            matches.into_iter()
        });
        Ok(Box::new(joined))
    }

    /// The merged schema's columns are qualified as `{alias}_{column}`,
    /// the same alias-prefixing convention `expand_wildcard` uses for `*`,
    /// since the left and right sides may share column names (e.g. both
    /// carrying an `id` or `name`).
    pub fn get_schema(&self, db: &dyn DbFile) -> Result<TableSchema> {
        let left = self.left.get_schema(db)?;
        let right = self.right.get_schema(db)?;
        let name = format!("{}_{}", left.name(), right.name());
        let mut merged = TableSchema::create(name);
        for (alias, schema) in [(left.name(), &left), (right.name(), &right)] {
            for column in schema.stored_columns() {
                merged = merged.with_column(column.clone().named(format!("{alias}_{}", column.name())))?;
            }
        }
        Ok(merged)
    }
}
