//! `Aggregate`: consumes its entire input and emits a single output
//! row of named aggregation results, keyed by `$0` like `Select`.
//!
//! Aggregations are a small trait rather than a deep hierarchy, following
//! an `Accumulator`/aggregate-expr split: each `Aggregation` builds a fresh
//! `Accumulator` per execution, since accumulator state must not leak
//! across queries.

use std::fmt;

use indexmap::IndexMap;

use pauldb_common::Result;
use pauldb_expr::{ColumnType, Expr, Row, RowContext, TableSchema, Value, PROJECTED_ROW_KEY};

use crate::dbfile::DbFile;
use crate::plan::QueryPlanNode;
use crate::stream::RowStream;

/// Per-row accumulation state for one aggregation.
pub trait Accumulator: Send {
    fn update(&mut self, ctx: &RowContext) -> Result<()>;
    fn finish(self: Box<Self>) -> Value;
}

/// An aggregation function: describes itself and builds a fresh
/// accumulator for each execution.
pub trait Aggregation: fmt::Debug + Send + Sync {
    fn describe(&self) -> String;
    fn output_type(&self) -> ColumnType;
    fn new_accumulator(&self) -> Box<dyn Accumulator>;
}

/// `COUNT(*)`: the number of rows seen, regardless of nullability.
#[derive(Debug, Clone)]
pub struct CountAggregation;

struct CountAccumulator(u32);

impl Accumulator for CountAccumulator {
    fn update(&mut self, _ctx: &RowContext) -> Result<()> {
        self.0 += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Value {
        Value::Uint32(self.0)
    }
}

impl Aggregation for CountAggregation {
    fn describe(&self) -> String {
        "COUNT(*)".to_string()
    }

    fn output_type(&self) -> ColumnType {
        ColumnType::uint32()
    }

    fn new_accumulator(&self) -> Box<dyn Accumulator> {
        Box::new(CountAccumulator(0))
    }
}

/// `MAX(expr)`: the greatest non-null value of `expr` seen, or `null` if
/// every row's `expr` is null (including when zero rows were seen).
#[derive(Debug, Clone)]
pub struct MaxAggregation {
    pub expr: Expr,
}

impl MaxAggregation {
    pub fn new(expr: Expr) -> Self {
        Self { expr }
    }
}

struct MaxAccumulator {
    expr: Expr,
    best: Option<Value>,
}

impl Accumulator for MaxAccumulator {
    fn update(&mut self, ctx: &RowContext) -> Result<()> {
        let value = self.expr.evaluate(ctx)?;
        if value.is_null() {
            return Ok(());
        }
        let replace = match &self.best {
            None => true,
            Some(current) => matches!(
                value.partial_compare(current),
                Some(std::cmp::Ordering::Greater)
            ),
        };
        if replace {
            self.best = Some(value);
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Value {
        self.best.unwrap_or(Value::Null)
    }
}

impl Aggregation for MaxAggregation {
    fn describe(&self) -> String {
        format!("MAX({})", self.expr.describe())
    }

    fn output_type(&self) -> ColumnType {
        self.expr.get_type().clone().nullable()
    }

    fn new_accumulator(&self) -> Box<dyn Accumulator> {
        Box::new(MaxAccumulator {
            expr: self.expr.clone(),
            best: None,
        })
    }
}

/// `ARRAY_AGG(expr)`: every value of `expr` seen, including nulls, in input
/// order.
#[derive(Debug, Clone)]
pub struct ArrayAggregation {
    pub expr: Expr,
}

impl ArrayAggregation {
    pub fn new(expr: Expr) -> Self {
        Self { expr }
    }
}

struct ArrayAccumulator {
    expr: Expr,
    items: Vec<Value>,
}

impl Accumulator for ArrayAccumulator {
    fn update(&mut self, ctx: &RowContext) -> Result<()> {
        self.items.push(self.expr.evaluate(ctx)?);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Value {
        Value::Array(self.items)
    }
}

impl Aggregation for ArrayAggregation {
    fn describe(&self) -> String {
        format!("ARRAY_AGG({})", self.expr.describe())
    }

    fn output_type(&self) -> ColumnType {
        self.expr.get_type().clone().array()
    }

    fn new_accumulator(&self) -> Box<dyn Accumulator> {
        Box::new(ArrayAccumulator {
            expr: self.expr.clone(),
            items: Vec::new(),
        })
    }
}

/// A named set of aggregations computed together over one input stream,
/// producing exactly one output row.
#[derive(Debug, Default)]
pub struct MultiAggregation {
    aggregations: IndexMap<String, Box<dyn Aggregation>>,
}

impl MultiAggregation {
    pub fn new() -> Self {
        Self {
            aggregations: IndexMap::new(),
        }
    }

    pub fn add(&mut self, name: impl Into<String>, aggregation: Box<dyn Aggregation>) -> &mut Self {
        self.aggregations.insert(name.into(), aggregation);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Aggregation)> {
        self.aggregations.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

#[derive(Debug)]
pub struct AggregateNode {
    pub input: Box<QueryPlanNode>,
    pub aggregations: MultiAggregation,
}

impl AggregateNode {
    pub fn new(input: QueryPlanNode, aggregations: MultiAggregation) -> Self {
        Self {
            input: Box::new(input),
            aggregations,
        }
    }

    pub fn execute(&self, db: &dyn DbFile) -> Result<RowStream> {
        let mut accumulators: Vec<(String, Box<dyn Accumulator>)> = self
            .aggregations
            .iter()
            .map(|(name, agg)| (name.to_string(), agg.new_accumulator()))
            .collect();

        for row in self.input.execute(db)? {
            let ctx = row?;
            for (_, acc) in accumulators.iter_mut() {
                acc.update(&ctx)?;
            }
        }

        let mut out = Row::new();
        for (name, acc) in accumulators {
            out.insert(name, acc.finish());
        }
        let result = RowContext::from([(PROJECTED_ROW_KEY.to_string(), out)]);
        Ok(Box::new(std::iter::once(Ok(result))))
    }

    pub fn get_schema(&self, _db: &dyn DbFile) -> Result<TableSchema> {
        let mut schema = TableSchema::create(PROJECTED_ROW_KEY);
        for (name, agg) in self.aggregations.iter() {
            schema = schema.with_column(pauldb_expr::StoredColumn::new(name, agg.output_type()))?;
        }
        Ok(schema)
    }
}
