//! End-to-end tests over the plan tree against an in-memory `DbFile` fake,
//! exercising cross-operator properties: `Filter` preserves input order,
//! `Limit` returns a prefix, `OrderBy` is stable, and `Join` produces the
//! full matching cross-product.

use pauldb_common::Result;
use pauldb_expr::{ColumnType, Expr};
use pauldb_physical_plan::{
    DbFile, Direction, FilterNode, JoinNode, LimitNode, OrderByNode, OrderingSpec, QueryPlanNode,
    TableScanNode,
};

mod support;
use support::memdb_with_cats;
use support::memdb_with_cats_and_owners;

#[test]
fn filter_preserves_input_order() {
    let db = memdb_with_cats(vec![("Alice", 3), ("Bob", 1), ("Carol", 5)]);
    let scan = QueryPlanNode::TableScan(TableScanNode::new("cats", "cats"));
    let predicate = Expr::compare(
        col("cats", "age"),
        pauldb_expr::CompareOp::GtEq,
        Expr::literal(pauldb_expr::Value::Int32(2), ColumnType::int32()),
    );
    let plan = QueryPlanNode::Filter(FilterNode::new(scan, predicate));
    let names = run_names(&plan, &db);
    assert_eq!(names, vec!["Alice", "Carol"]);
}

#[test]
fn limit_returns_a_prefix() {
    let db = memdb_with_cats(vec![("Alice", 3), ("Bob", 1), ("Carol", 5)]);
    let scan = QueryPlanNode::TableScan(TableScanNode::new("cats", "cats"));
    let plan = QueryPlanNode::Limit(LimitNode::new(scan, 2));
    let names = run_names(&plan, &db);
    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[test]
fn order_by_is_stable_for_equal_keys() {
    let db = memdb_with_cats(vec![("Alice", 1), ("Bob", 1), ("Carol", 0)]);
    let scan = QueryPlanNode::TableScan(TableScanNode::new("cats", "cats"));
    let ordering = OrderingSpec::new(col("cats", "age"), Direction::Asc);
    let plan = QueryPlanNode::OrderBy(OrderByNode::new(scan, vec![ordering]));
    let names = run_names(&plan, &db);
    // Carol (age 0) first, then Alice/Bob keep their relative input order.
    assert_eq!(names, vec!["Carol", "Alice", "Bob"]);
}

#[test]
fn join_produces_full_matching_cross_product() {
    let db = memdb_with_cats_and_owners();
    let left = QueryPlanNode::TableScan(TableScanNode::new("cats", "cats"));
    let right = QueryPlanNode::TableScan(TableScanNode::new("owners", "owners"));
    let on = Expr::compare(
        col("cats", "owner_id"),
        pauldb_expr::CompareOp::Eq,
        col("owners", "id"),
    );
    let plan = QueryPlanNode::Join(JoinNode::new(left, right, on));
    let rows = plan.execute(&db).unwrap().collect::<Result<Vec<_>>>().unwrap();
    assert_eq!(rows.len(), 2);
}

fn col(table: &str, name: &str) -> Expr {
    Expr::column_ref(name, Some(table.to_string()), ColumnType::int32())
}

fn run_names(plan: &QueryPlanNode, db: &dyn DbFile) -> Vec<String> {
    plan.execute(db)
        .unwrap()
        .map(|row| {
            let ctx = row.unwrap();
            let row = ctx.get("cats").unwrap();
            match row.get("name").unwrap() {
                pauldb_expr::Value::String(s) => s.clone(),
                other => panic!("expected string name, got {other:?}"),
            }
        })
        .collect()
}
