//! PaulDB's own SQL AST, plus the translation layer from `sqlparser`'s
//! parse tree into it.
//!
//! The planner in [`crate::planner`] never touches `sqlparser::ast`
//! directly — it consumes only these types, the same isolation
//! `datafusion-sql`'s `SqlToRel` gets from its `ContextProvider` split.

use pauldb_common::{not_impl_err, sql_parse_err, Result};

/// A binary comparison or boolean-combinator operator name, kept as the
/// literal operator text (`=`, `!=`, `AND`, ...) rather than its own enum —
/// resolving it to [`pauldb_expr::CompareOp`]/[`pauldb_expr::BoolOp`] is the
/// planner's job, not the AST's.
pub type OperatorName = String;

/// The expression tagged union: `column_ref`, `number`,
/// `single_quote_string`, `binary_expr`, `aggr_func`, `function`,
/// `expr_list`, plus the `*` wildcard every dialect needs for projections.
#[derive(Debug, Clone)]
pub enum SqlExpr {
    Wildcard,
    ColumnRef {
        table: Option<String>,
        column: String,
    },
    Number(String),
    SingleQuotedString(String),
    BinaryExpr {
        operator: OperatorName,
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },
    AggrFunc {
        name: String,
        arg: Box<SqlExpr>,
    },
    Function {
        name: Vec<String>,
        args: Vec<SqlExpr>,
    },
    ExprList(Vec<SqlExpr>),
}

/// One `FROM` entry: the first carries no join condition, every later one
/// must.
#[derive(Debug, Clone)]
pub struct FromItem {
    pub table: String,
    pub alias: Option<String>,
    pub join_on: Option<SqlExpr>,
}

/// One `ORDER BY` entry.
#[derive(Debug, Clone)]
pub struct OrderByItem {
    pub expr: SqlExpr,
    pub asc: bool,
}

/// One projected column: an expression plus its optional `AS` alias.
#[derive(Debug, Clone)]
pub struct ProjectionItem {
    pub expr: SqlExpr,
    pub alias: Option<String>,
}

/// A `SELECT` statement, including the unsupported-clause flags the
/// planner must check up front.
#[derive(Debug, Clone)]
pub struct SelectStatement {
    pub projection: Vec<ProjectionItem>,
    pub from: Vec<FromItem>,
    pub selection: Option<SqlExpr>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<SqlExpr>,
    pub has_group_by: bool,
    pub has_having: bool,
    pub is_distinct: bool,
    pub has_with: bool,
    pub has_window: bool,
}

/// A `CREATE TABLE` statement.
#[derive(Debug, Clone)]
pub struct CreateTableStatement {
    pub table_name: String,
    pub columns: Vec<(String, String)>,
}

/// An `INSERT`/`REPLACE` statement: exactly one target table, an explicit
/// column list, and literal values.
#[derive(Debug, Clone)]
pub struct InsertStatement {
    pub table_name: String,
    pub columns: Vec<String>,
    pub values: Vec<SqlExpr>,
}

/// One parsed statement: `create | insert | replace | select`.
#[derive(Debug, Clone)]
pub enum Statement {
    Create(CreateTableStatement),
    Insert(InsertStatement),
    Replace(InsertStatement),
    Select(SelectStatement),
}

/// Parses `sql` with the generic `sqlparser` dialect and translates every
/// resulting statement into PaulDB's own AST.
pub fn parse(sql: &str) -> Result<Vec<Statement>> {
    use sqlparser::dialect::GenericDialect;
    use sqlparser::parser::Parser;

    let raw = Parser::parse_sql(&GenericDialect {}, sql)
        .map_err(|e| pauldb_common::PaulDbError::SqlParse(e.to_string()))?;
    raw.iter().map(from_sqlparser_statement).collect()
}

fn from_sqlparser_statement(stmt: &sqlparser::ast::Statement) -> Result<Statement> {
    use sqlparser::ast::Statement as S;
    match stmt {
        S::CreateTable(create) => from_sqlparser_create(create),
        S::Insert(insert) => from_sqlparser_insert(insert).map(Statement::Insert),
        S::Query(query) => from_sqlparser_query(query).map(Statement::Select),
        other => not_impl_err!("unsupported SQL statement shape: {other}"),
    }
}

fn from_sqlparser_create(create: &sqlparser::ast::CreateTable) -> Result<Statement> {
    let table_name = create.name.to_string();
    let mut columns = Vec::with_capacity(create.columns.len());
    for column in &create.columns {
        columns.push((column.name.value.clone(), column.data_type.to_string()));
    }
    Ok(Statement::Create(CreateTableStatement {
        table_name,
        columns,
    }))
}

fn from_sqlparser_insert(insert: &sqlparser::ast::Insert) -> Result<InsertStatement> {
    let table_name = insert.table.to_string();
    let columns = insert.columns.iter().map(|c| c.value.clone()).collect();
    let source = insert
        .source
        .as_ref()
        .ok_or_else(|| pauldb_common::PaulDbError::SqlParse("INSERT without VALUES".to_string()))?;
    let rows = match source.body.as_ref() {
        sqlparser::ast::SetExpr::Values(values) => &values.rows,
        _ => return sql_parse_err!("INSERT source must be a VALUES list"),
    };
    if rows.len() != 1 {
        return not_impl_err!("INSERT supports exactly one VALUES row, got {}", rows.len());
    }
    let values = rows[0]
        .iter()
        .map(from_sqlparser_expr)
        .collect::<Result<Vec<_>>>()?;
    Ok(InsertStatement {
        table_name,
        columns,
        values: vec![SqlExpr::ExprList(values)],
    })
}

fn from_sqlparser_query(query: &sqlparser::ast::Query) -> Result<SelectStatement> {
    let has_with = query.with.is_some();
    let order_by = match &query.order_by {
        Some(order_by) => order_by
            .exprs
            .iter()
            .map(|o| {
                Ok(OrderByItem {
                    expr: from_sqlparser_expr(&o.expr)?,
                    asc: o.options.asc.unwrap_or(true),
                })
            })
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };
    let limit = query.limit_clause.as_ref().and_then(|l| match l {
        sqlparser::ast::LimitClause::LimitOffset { limit, .. } => limit.as_ref(),
        _ => None,
    });
    let limit = limit.map(from_sqlparser_expr).transpose()?;

    let select = match query.body.as_ref() {
        sqlparser::ast::SetExpr::Select(select) => select.as_ref(),
        _ => return not_impl_err!("only plain SELECT queries are supported"),
    };

    let has_group_by = !matches!(
        select.group_by,
        sqlparser::ast::GroupByExpr::Expressions(ref exprs, _) if exprs.is_empty()
    );
    let has_having = select.having.is_some();
    let has_window = !select.named_window.is_empty() || select.qualify.is_some();
    let is_distinct = select.distinct.is_some();

    let mut from = Vec::with_capacity(select.from.len());
    for table_with_joins in &select.from {
        let (table, alias) = from_sqlparser_table_factor(&table_with_joins.relation)?;
        from.push(FromItem {
            table,
            alias,
            join_on: None,
        });
        for join in &table_with_joins.joins {
            let (table, alias) = from_sqlparser_table_factor(&join.relation)?;
            let on = match &join.join_operator {
                sqlparser::ast::JoinOperator::Inner(sqlparser::ast::JoinConstraint::On(expr)) => {
                    from_sqlparser_expr(expr)?
                }
                _ => return not_impl_err!("joins must be INNER JOIN ... ON <expr>"),
            };
            from.push(FromItem {
                table,
                alias,
                join_on: Some(on),
            });
        }
    }

    let selection = select.selection.as_ref().map(from_sqlparser_expr).transpose()?;

    let mut projection = Vec::with_capacity(select.projection.len());
    for item in &select.projection {
        match item {
            sqlparser::ast::SelectItem::Wildcard(_) => projection.push(ProjectionItem {
                expr: SqlExpr::Wildcard,
                alias: None,
            }),
            sqlparser::ast::SelectItem::UnnamedExpr(expr) => projection.push(ProjectionItem {
                expr: from_sqlparser_expr(expr)?,
                alias: None,
            }),
            sqlparser::ast::SelectItem::ExprWithAlias { expr, alias } => {
                projection.push(ProjectionItem {
                    expr: from_sqlparser_expr(expr)?,
                    alias: Some(alias.value.clone()),
                })
            }
            other => return not_impl_err!("unsupported projection item: {other}"),
        }
    }

    Ok(SelectStatement {
        projection,
        from,
        selection,
        order_by,
        limit,
        has_group_by,
        has_having,
        is_distinct,
        has_with,
        has_window,
    })
}

fn from_sqlparser_table_factor(
    relation: &sqlparser::ast::TableFactor,
) -> Result<(String, Option<String>)> {
    match relation {
        sqlparser::ast::TableFactor::Table { name, alias, .. } => Ok((
            name.to_string(),
            alias.as_ref().map(|a| a.name.value.clone()),
        )),
        other => not_impl_err!("unsupported FROM item: {other}"),
    }
}

fn from_sqlparser_expr(expr: &sqlparser::ast::Expr) -> Result<SqlExpr> {
    use sqlparser::ast::Expr as E;
    match expr {
        E::Identifier(ident) => Ok(SqlExpr::ColumnRef {
            table: None,
            column: ident.value.clone(),
        }),
        E::CompoundIdentifier(parts) if parts.len() == 2 => Ok(SqlExpr::ColumnRef {
            table: Some(parts[0].value.clone()),
            column: parts[1].value.clone(),
        }),
        E::Value(v) => from_sqlparser_value(&v.value),
        E::BinaryOp { left, op, right } => Ok(SqlExpr::BinaryExpr {
            operator: binary_operator_name(op)?,
            left: Box::new(from_sqlparser_expr(left)?),
            right: Box::new(from_sqlparser_expr(right)?),
        }),
        E::Function(function) => from_sqlparser_function(function),
        E::Wildcard(_) => Ok(SqlExpr::Wildcard),
        E::Nested(inner) => from_sqlparser_expr(inner),
        other => not_impl_err!("unsupported expression shape: {other}"),
    }
}

fn from_sqlparser_value(value: &sqlparser::ast::Value) -> Result<SqlExpr> {
    use sqlparser::ast::Value as V;
    match value {
        V::Number(n, _) => Ok(SqlExpr::Number(n.clone())),
        V::SingleQuotedString(s) => Ok(SqlExpr::SingleQuotedString(s.clone())),
        other => not_impl_err!("unsupported literal: {other}"),
    }
}

fn binary_operator_name(op: &sqlparser::ast::BinaryOperator) -> Result<String> {
    use sqlparser::ast::BinaryOperator as B;
    let name = match op {
        B::Eq => "=",
        B::NotEq => "!=",
        B::Lt => "<",
        B::LtEq => "<=",
        B::Gt => ">",
        B::GtEq => ">=",
        B::And => "AND",
        B::Or => "OR",
        other => return not_impl_err!("unsupported binary operator: {other}"),
    };
    Ok(name.to_string())
}

fn from_sqlparser_function(function: &sqlparser::ast::Function) -> Result<SqlExpr> {
    let name_parts: Vec<String> = function
        .name
        .0
        .iter()
        .map(|part| part.to_string())
        .collect();
    let name = name_parts.join(".").to_ascii_uppercase();

    let args = match &function.args {
        sqlparser::ast::FunctionArguments::List(list) => &list.args,
        _ => return not_impl_err!("unsupported function argument shape for {name}"),
    };

    if matches!(name.as_str(), "MAX" | "COUNT" | "ARRAY_AGG") {
        let arg = match args.first() {
            Some(sqlparser::ast::FunctionArg::Unnamed(
                sqlparser::ast::FunctionArgExpr::Expr(expr),
            )) => from_sqlparser_expr(expr)?,
            Some(sqlparser::ast::FunctionArg::Unnamed(
                sqlparser::ast::FunctionArgExpr::Wildcard,
            )) => SqlExpr::Wildcard,
            _ => return not_impl_err!("unsupported argument to aggregate function {name}"),
        };
        return Ok(SqlExpr::AggrFunc {
            name,
            arg: Box::new(arg),
        });
    }

    let mut translated = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            sqlparser::ast::FunctionArg::Unnamed(sqlparser::ast::FunctionArgExpr::Expr(expr)) => {
                translated.push(from_sqlparser_expr(expr)?)
            }
            _ => return not_impl_err!("unsupported argument shape in function {name}"),
        }
    }
    Ok(SqlExpr::Function {
        name: name_parts,
        args: translated,
    })
}
