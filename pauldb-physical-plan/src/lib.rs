//! The query plan tree and its operators: `TableScan`, `Filter`, `Join`,
//! `OrderBy`, `Limit`, `Select` and `Aggregate`, plus the `DbFile`/
//! `HeapTable` collaborator traits and the lazy row stream they all share.
//!
//! This crate plays the role `datafusion-physical-plan` plays for
//! DataFusion: executable operators over a storage collaborator, with no
//! knowledge of SQL syntax.

mod aggregate;
mod dbfile;
mod filter;
mod join;
mod limit;
mod order_by;
mod plan;
mod scan;
mod select;
mod stream;

pub use aggregate::{
    Accumulator, Aggregation, AggregateNode, ArrayAggregation, CountAggregation, MaxAggregation,
    MultiAggregation,
};
pub use dbfile::{DbFile, HeapTable};
pub use filter::FilterNode;
pub use join::JoinNode;
pub use limit::LimitNode;
pub use order_by::{Direction, OrderByNode, OrderingSpec};
pub use plan::QueryPlanNode;
pub use scan::TableScanNode;
pub use select::SelectNode;
pub use stream::RowStream;
