//! `OrderBy`: materializes its input and sorts it by one or more
//! expressions. Sorting is stable, so rows that compare equal on every
//! ordering keep their input order. Nulls sort last for `Asc`, first for
//! `Desc`.

use std::cmp::Ordering;

use itertools::Itertools;
use pauldb_common::Result;
use pauldb_expr::{Expr, RowContext, TableSchema, Value};

use crate::dbfile::DbFile;
use crate::plan::QueryPlanNode;
use crate::stream::RowStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug)]
pub struct OrderingSpec {
    pub expr: Expr,
    pub direction: Direction,
}

impl OrderingSpec {
    pub fn new(expr: Expr, direction: Direction) -> Self {
        Self { expr, direction }
    }
}

#[derive(Debug)]
pub struct OrderByNode {
    pub input: Box<QueryPlanNode>,
    pub orderings: Vec<OrderingSpec>,
}

impl OrderByNode {
    pub fn new(input: QueryPlanNode, orderings: Vec<OrderingSpec>) -> Self {
        Self {
            input: Box::new(input),
            orderings,
        }
    }

    pub fn execute(&self, db: &dyn DbFile) -> Result<RowStream> {
        let rows: Vec<RowContext> = self.input.execute(db)?.collect::<Result<_>>()?;
        let keyed: Vec<(Vec<Value>, RowContext)> = rows
            .into_iter()
            .map(|row| {
                let keys = self
                    .orderings
                    .iter()
                    .map(|o| o.expr.evaluate(&row))
                    .collect::<Result<Vec<_>>>()?;
                Ok((keys, row))
            })
            .collect::<Result<Vec<_>>>()?;

        let sorted = keyed.into_iter().sorted_by(|(a_keys, _), (b_keys, _)| {
            for (i, ordering) in self.orderings.iter().enumerate() {
                let cmp = compare_with_null_rule(&a_keys[i], &b_keys[i], ordering.direction);
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            Ordering::Equal
        });

        Ok(Box::new(sorted.into_iter().map(|(_, row)| Ok(row))))
    }

    pub fn get_schema(&self, db: &dyn DbFile) -> Result<TableSchema> {
        self.input.get_schema(db)
    }
}

/// Nulls sort last under `Asc`, first under `Desc`; non-null values fall
/// back to the value's own partial order, with incomparable pairs (e.g.
/// `NaN`) treated as equal so the sort stays total.
fn compare_with_null_rule(a: &Value, b: &Value, direction: Direction) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => {
            if direction == Direction::Asc {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, true) => {
            if direction == Direction::Asc {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (false, false) => {
            let natural = a.partial_compare(b).unwrap_or(Ordering::Equal);
            match direction {
                Direction::Asc => natural,
                Direction::Desc => natural.reverse(),
            }
        }
    }
}
