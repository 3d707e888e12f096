//! The query plan tree: a tagged union of operator nodes rather than a
//! trait-object hierarchy, modeling plan and expression trees as sum types
//! the way `datafusion_expr::Expr`/`ExecutionPlan` pairs do for logical and
//! physical plans.
//!
//! Every variant exposes `execute` (open a lazy [`RowStream`]) and
//! `get_schema` (the shape of the rows it produces), resolved against a
//! [`DbFile`] supplied at call time rather than stored on the node.

use pauldb_common::Result;
use pauldb_expr::TableSchema;

use crate::aggregate::AggregateNode;
use crate::dbfile::DbFile;
use crate::filter::FilterNode;
use crate::join::JoinNode;
use crate::limit::LimitNode;
use crate::order_by::OrderByNode;
use crate::scan::TableScanNode;
use crate::select::SelectNode;
use crate::stream::RowStream;

#[derive(Debug)]
pub enum QueryPlanNode {
    TableScan(TableScanNode),
    Filter(FilterNode),
    Join(JoinNode),
    OrderBy(OrderByNode),
    Limit(LimitNode),
    Select(SelectNode),
    Aggregate(AggregateNode),
}

impl QueryPlanNode {
    pub fn execute(&self, db: &dyn DbFile) -> Result<RowStream> {
        match self {
            QueryPlanNode::TableScan(n) => n.execute(db),
            QueryPlanNode::Filter(n) => n.execute(db),
            QueryPlanNode::Join(n) => n.execute(db),
            QueryPlanNode::OrderBy(n) => n.execute(db),
            QueryPlanNode::Limit(n) => n.execute(db),
            QueryPlanNode::Select(n) => n.execute(db),
            QueryPlanNode::Aggregate(n) => n.execute(db),
        }
    }

    pub fn get_schema(&self, db: &dyn DbFile) -> Result<TableSchema> {
        match self {
            QueryPlanNode::TableScan(n) => n.get_schema(db),
            QueryPlanNode::Filter(n) => n.get_schema(db),
            QueryPlanNode::Join(n) => n.get_schema(db),
            QueryPlanNode::OrderBy(n) => n.get_schema(db),
            QueryPlanNode::Limit(n) => n.get_schema(db),
            QueryPlanNode::Select(n) => n.get_schema(db),
            QueryPlanNode::Aggregate(n) => n.get_schema(db),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            QueryPlanNode::TableScan(n) => format!("TableScan({} as {})", n.table_name, n.alias),
            QueryPlanNode::Filter(n) => format!("Filter({})", n.predicate.describe()),
            QueryPlanNode::Join(n) => format!("Join(on: {})", n.on.describe()),
            QueryPlanNode::OrderBy(n) => format!("OrderBy({} keys)", n.orderings.len()),
            QueryPlanNode::Limit(n) => format!("Limit({})", n.count),
            QueryPlanNode::Select(n) => {
                format!("Select({})", n.columns().map(|(name, _)| name).collect::<Vec<_>>().join(", "))
            }
            QueryPlanNode::Aggregate(n) => format!(
                "Aggregate({})",
                n.aggregations.iter().map(|(name, agg)| format!("{name}: {}", agg.describe())).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}
