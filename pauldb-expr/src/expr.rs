//! The expression AST: `ColumnRefExpr`, `LiteralValueExpr`,
//! `Compare` and `AndOrExpr`, evaluated against a [`RowContext`].
//!
//! Logical and physical expressions are modeled as a tagged variant
//! (much like `datafusion_expr::Expr` and its `PhysicalExpr` implementors)
//! rather than deep inheritance, keeping plan and expression trees as sum
//! types throughout this crate.

use std::fmt;

use pauldb_common::{ambiguous_err, column_not_found_err, schema_err, Result};

use crate::column_type::ColumnType;
use crate::row::RowContext;
use crate::value::Value;

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        };
        write!(f, "{s}")
    }
}

/// A boolean combinator operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
        };
        write!(f, "{s}")
    }
}

/// A reference to a column, optionally qualified by table name.
#[derive(Debug, Clone)]
pub struct ColumnRefExpr {
    pub column_name: String,
    pub table_name: Option<String>,
    value_type: ColumnType,
}

impl ColumnRefExpr {
    pub fn new(
        column_name: impl Into<String>,
        table_name: Option<String>,
        value_type: ColumnType,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            table_name,
            value_type,
        }
    }

    fn evaluate(&self, ctx: &RowContext) -> Result<Value> {
        match &self.table_name {
            Some(table) => {
                let row = ctx.get(table).ok_or_else(|| {
                    pauldb_common::PaulDbError::TableNotFound(format!(
                        "no rows in scope for table '{table}'"
                    ))
                })?;
                row.get(&self.column_name).cloned().ok_or_else(|| {
                    pauldb_common::PaulDbError::ColumnNotFound(format!(
                        "{table}.{}",
                        self.column_name
                    ))
                })
            }
            None => {
                let mut matches = ctx
                    .iter()
                    .filter(|(_, row)| row.contains_key(&self.column_name));
                let first = matches.next();
                match (first, matches.next()) {
                    (None, _) => column_not_found_err!("{}", self.column_name),
                    (Some(_), Some(_)) => ambiguous_err!(
                        "column reference '{}' matches more than one table in scope",
                        self.column_name
                    ),
                    (Some((_, row)), None) => Ok(row
                        .get(&self.column_name)
                        .expect("contains_key just matched")
                        .clone()),
                }
            }
        }
    }

    fn describe(&self) -> String {
        match &self.table_name {
            Some(table) => format!("{table}.{}", self.column_name),
            None => self.column_name.clone(),
        }
    }
}

/// A constant value.
#[derive(Debug, Clone)]
pub struct LiteralValueExpr {
    pub value: Value,
    value_type: ColumnType,
}

impl LiteralValueExpr {
    pub fn new(value: Value, value_type: ColumnType) -> Self {
        Self { value, value_type }
    }
}

/// A binary comparison. Operand type coercion promotes int to float
/// when the other side is float; any other type mismatch is an error.
/// `NaN` is non-comparable: every operator but `!=` evaluates to `false`
/// against it.
#[derive(Debug, Clone)]
pub struct CompareExpr {
    pub left: Box<Expr>,
    pub op: CompareOp,
    pub right: Box<Expr>,
}

/// A short-circuiting `AND`/`OR`. Operands must evaluate to
/// booleans; anything else is a type error.
#[derive(Debug, Clone)]
pub struct AndOrExpr {
    pub left: Box<Expr>,
    pub op: BoolOp,
    pub right: Box<Expr>,
}

/// The expression tree: a tagged union of the four evaluable node shapes.
#[derive(Debug, Clone)]
pub enum Expr {
    ColumnRef(ColumnRefExpr),
    Literal(LiteralValueExpr),
    Compare(CompareExpr),
    AndOr(AndOrExpr),
}

impl Expr {
    pub fn column_ref(
        column_name: impl Into<String>,
        table_name: Option<String>,
        value_type: ColumnType,
    ) -> Self {
        Expr::ColumnRef(ColumnRefExpr::new(column_name, table_name, value_type))
    }

    pub fn literal(value: Value, value_type: ColumnType) -> Self {
        Expr::Literal(LiteralValueExpr::new(value, value_type))
    }

    pub fn compare(left: Expr, op: CompareOp, right: Expr) -> Self {
        Expr::Compare(CompareExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    pub fn and_or(left: Expr, op: BoolOp, right: Expr) -> Self {
        Expr::AndOr(AndOrExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// Evaluates this expression against `ctx`. Deterministic and
    /// dependent only on the columns it references.
    pub fn evaluate(&self, ctx: &RowContext) -> Result<Value> {
        match self {
            Expr::ColumnRef(e) => e.evaluate(ctx),
            Expr::Literal(e) => Ok(e.value.clone()),
            Expr::Compare(e) => evaluate_compare(e, ctx),
            Expr::AndOr(e) => evaluate_and_or(e, ctx),
        }
    }

    /// The expression's output type.
    pub fn get_type(&self) -> &ColumnType {
        match self {
            Expr::ColumnRef(e) => &e.value_type,
            Expr::Literal(e) => &e.value_type,
            Expr::Compare(_) | Expr::AndOr(_) => {
                BOOLEAN_TYPE_ONCE.get_or_init(ColumnType::boolean)
            }
        }
    }

    /// A human-readable description, used as the default output-column
    /// name when a projected expression carries no alias.
    pub fn describe(&self) -> String {
        match self {
            Expr::ColumnRef(e) => e.describe(),
            Expr::Literal(e) => e.value.to_string(),
            Expr::Compare(e) => format!("{} {} {}", e.left.describe(), e.op, e.right.describe()),
            Expr::AndOr(e) => format!("{} {} {}", e.left.describe(), e.op, e.right.describe()),
        }
    }
}

// `get_type` needs to hand back a `&ColumnType` for Compare/AndOr nodes,
// which own no type of their own (they're always boolean); stash one
// lazily rather than constructing a fresh `ColumnType` per call.
static BOOLEAN_TYPE_ONCE: std::sync::OnceLock<ColumnType> = std::sync::OnceLock::new();

fn expect_bool(value: Value, describe: &str) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        other => schema_err!("expected boolean operand for {describe}, got {other}"),
    }
}

fn evaluate_compare(expr: &CompareExpr, ctx: &RowContext) -> Result<Value> {
    let left = expr.left.evaluate(ctx)?;
    let right = expr.right.evaluate(ctx)?;
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    let same_comparable_kind = matches!(
        (&left, &right),
        (Value::String(_), Value::String(_))
            | (Value::Bool(_), Value::Bool(_))
            | (Value::DateTime(_), Value::DateTime(_))
            | (Value::Array(_), Value::Array(_))
    );
    if !(same_comparable_kind || (left.is_numeric() && right.is_numeric())) {
        return schema_err!(
            "incompatible operand types: {left} ({:?}) vs {right} ({:?})",
            std::mem::discriminant(&left),
            std::mem::discriminant(&right)
        );
    }
    let ordering = left.partial_compare(&right);
    let result = match ordering {
        None => expr.op == CompareOp::NotEq,
        Some(ord) => match expr.op {
            CompareOp::Eq => ord.is_eq(),
            CompareOp::NotEq => ord.is_ne(),
            CompareOp::Lt => ord.is_lt(),
            CompareOp::LtEq => ord.is_le(),
            CompareOp::Gt => ord.is_gt(),
            CompareOp::GtEq => ord.is_ge(),
        },
    };
    Ok(Value::Bool(result))
}

fn evaluate_and_or(expr: &AndOrExpr, ctx: &RowContext) -> Result<Value> {
    let left = expect_bool(expr.left.evaluate(ctx)?, &expr.left.describe())?;
    let short_circuit = match expr.op {
        BoolOp::And => !left,
        BoolOp::Or => left,
    };
    if short_circuit {
        return Ok(Value::Bool(left));
    }
    let right = expect_bool(expr.right.evaluate(ctx)?, &expr.right.describe())?;
    Ok(Value::Bool(right))
}
