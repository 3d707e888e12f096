//! `Filter`: passes a row through only when its predicate evaluates
//! to exactly `true`. A `null` predicate result drops the row silently;
//! anything else (a type error, an ambiguous column reference) propagates.

use pauldb_common::Result;
use pauldb_expr::{Expr, TableSchema, Value};

use crate::dbfile::DbFile;
use crate::plan::QueryPlanNode;
use crate::stream::RowStream;

#[derive(Debug)]
pub struct FilterNode {
    pub input: Box<QueryPlanNode>,
    pub predicate: Expr,
}

impl FilterNode {
    pub fn new(input: QueryPlanNode, predicate: Expr) -> Self {
        Self {
            input: Box::new(input),
            predicate,
        }
    }

    pub fn execute(&self, db: &dyn DbFile) -> Result<RowStream> {
        let rows = self.input.execute(db)?;
        let predicate = self.predicate.clone();
        let filtered = rows.filter_map(move |row| match row {
            Ok(ctx) => match predicate.evaluate(&ctx) {
                Ok(Value::Bool(true)) => Some(Ok(ctx)),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            },
            Err(e) => Some(Err(e)),
        });
        Ok(Box::new(filtered))
    }

    pub fn get_schema(&self, db: &dyn DbFile) -> Result<TableSchema> {
        self.input.get_schema(db)
    }
}
