//! `Limit`: passes through at most `count` rows and then stops,
//! dropping the child stream without draining it (the translator-level
//! `Limit` validation — that `count` came from a non-negative integer
//! literal — happens before this node is built).

use pauldb_common::Result;
use pauldb_expr::TableSchema;

use crate::dbfile::DbFile;
use crate::plan::QueryPlanNode;
use crate::stream::RowStream;

#[derive(Debug)]
pub struct LimitNode {
    pub input: Box<QueryPlanNode>,
    pub count: usize,
}

impl LimitNode {
    pub fn new(input: QueryPlanNode, count: usize) -> Self {
        Self {
            input: Box::new(input),
            count,
        }
    }

    pub fn execute(&self, db: &dyn DbFile) -> Result<RowStream> {
        Ok(Box::new(self.input.execute(db)?.take(self.count)))
    }

    pub fn get_schema(&self, db: &dyn DbFile) -> Result<TableSchema> {
        self.input.get_schema(db)
    }
}
