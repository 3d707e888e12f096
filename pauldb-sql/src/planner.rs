//! `SqlToPlan`: translates PaulDB's own AST into a query plan tree
//! (for `SELECT`) or a direct `DbFile` mutation (for `CREATE TABLE` and
//! `INSERT`), modeled on DataFusion's `SqlToRel`.

use indexmap::IndexMap;

use pauldb_common::{ambiguous_err, column_not_found_err, not_impl_err, schema_err, Result};
use pauldb_expr::{
    BoolOp, Column, ColumnType, ColumnTypeKind, CompareOp, Expr, InsertRecord, Row, StoredColumn,
    TableSchema, TypeRegistry, Value,
};
use pauldb_physical_plan::{
    ArrayAggregation, CountAggregation, DbFile, Direction, FilterNode, JoinNode, LimitNode,
    MaxAggregation, MultiAggregation, OrderByNode, OrderingSpec, QueryPlanNode, SelectNode,
    TableScanNode,
};

use crate::ast::{
    CreateTableStatement, InsertStatement, ProjectionItem, SelectStatement, SqlExpr, Statement,
};
use crate::options::ParserOptions;

/// What running one statement produces: a `SELECT` returns rows,
/// `INSERT`/`CREATE` return nothing.
#[derive(Debug, Clone)]
pub enum StatementResult {
    Rows(Vec<Row>),
    Unit,
}

pub struct SqlToPlan {
    options: ParserOptions,
    types: TypeRegistry,
}

impl SqlToPlan {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            types: TypeRegistry::new(),
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Runs every statement `sql` parses to, in source order.
    pub fn execute_sql(&self, sql: &str, db: &dyn DbFile) -> Result<Vec<StatementResult>> {
        crate::ast::parse(sql)?
            .iter()
            .map(|stmt| self.execute_statement(stmt, db))
            .collect()
    }

    pub fn execute_statement(&self, stmt: &Statement, db: &dyn DbFile) -> Result<StatementResult> {
        match stmt {
            Statement::Create(create) => {
                self.execute_create(create, db)?;
                Ok(StatementResult::Unit)
            }
            Statement::Insert(insert) | Statement::Replace(insert) => {
                self.execute_insert(insert, db)?;
                Ok(StatementResult::Unit)
            }
            Statement::Select(select) => {
                let plan = self.plan_select(select, db)?;
                let rows = plan
                    .execute(db)?
                    .map(|row| {
                        let mut ctx = row?;
                        ctx.remove(pauldb_expr::PROJECTED_ROW_KEY).ok_or_else(|| {
                            pauldb_common::PaulDbError::Internal(
                                "SELECT plan did not produce a projected row".to_string(),
                            )
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(StatementResult::Rows(rows))
            }
        }
    }

    fn execute_create(&self, create: &CreateTableStatement, db: &dyn DbFile) -> Result<()> {
        let mut schema = TableSchema::create(create.table_name.clone());
        for (name, type_name) in &create.columns {
            let column_type = self.types.from_sql(type_name)?;
            schema = schema.with_column(StoredColumn::new(name.clone(), column_type))?;
        }
        db.get_or_create_table(&schema)?;
        Ok(())
    }

    fn execute_insert(&self, insert: &InsertStatement, db: &dyn DbFile) -> Result<()> {
        if insert.columns.is_empty() {
            return schema_err!("INSERT requires an explicit column list");
        }
        let values = match insert.values.as_slice() {
            [SqlExpr::ExprList(items)] => items,
            _ => return schema_err!("INSERT VALUES must be exactly one row"),
        };
        if values.len() != insert.columns.len() {
            return schema_err!(
                "INSERT column count ({}) does not match value count ({})",
                insert.columns.len(),
                values.len()
            );
        }

        let schema = db.get_schema_or_throw(&insert.table_name)?;
        let mut record = InsertRecord::new();
        for (name, value_ast) in insert.columns.iter().zip(values.iter()) {
            let column = match schema.column(name) {
                Some(Column::Stored(c)) => c,
                Some(Column::Computed(_)) => {
                    return schema_err!("'{name}' is a computed column and cannot be inserted into")
                }
                None => return column_not_found_err!("{}.{name}", insert.table_name),
            };
            record.insert(name.clone(), literal_to_value(value_ast, column.value_type())?);
        }

        let table = db.get_table(&insert.table_name)?;
        table.insert(record)
    }

    pub fn plan_select(&self, select: &SelectStatement, db: &dyn DbFile) -> Result<QueryPlanNode> {
        if select.has_group_by {
            return not_impl_err!("GROUP BY is not supported");
        }
        if select.has_having {
            return not_impl_err!("HAVING is not supported");
        }
        if select.is_distinct {
            return not_impl_err!("SELECT DISTINCT is not supported");
        }
        if select.has_with {
            return not_impl_err!("WITH (common table expressions) is not supported");
        }
        if select.has_window {
            return not_impl_err!("window functions are not supported");
        }
        if select.from.is_empty() {
            return schema_err!("SELECT requires a non-empty FROM list");
        }

        let mut scopes: IndexMap<String, TableSchema> = IndexMap::new();
        let first = &select.from[0];
        if first.join_on.is_some() {
            return schema_err!("the first FROM entry cannot carry a join condition");
        }
        let first_alias = self.normalize(first.alias.clone().unwrap_or_else(|| first.table.clone()));
        let mut plan = QueryPlanNode::TableScan(TableScanNode::new(first.table.as_str(), first_alias.as_str()));
        scopes.insert(first_alias, plan.get_schema(db)?);

        for item in &select.from[1..] {
            let on_ast = match &item.join_on {
                Some(on) => on,
                None => {
                    return schema_err!(
                        "FROM entry '{}' must be an explicit JOIN ... ON",
                        item.table
                    )
                }
            };
            let alias = self.normalize(item.alias.clone().unwrap_or_else(|| item.table.clone()));
            let right = QueryPlanNode::TableScan(TableScanNode::new(item.table.as_str(), alias.as_str()));
            let right_schema = right.get_schema(db)?;
            scopes.insert(alias, right_schema);
            let on_expr = self.translate_expr(on_ast, &scopes)?;
            plan = QueryPlanNode::Join(JoinNode::new(plan, right, on_expr));
        }

        if let Some(where_ast) = &select.selection {
            let predicate = self.translate_expr(where_ast, &scopes)?;
            plan = QueryPlanNode::Filter(FilterNode::new(plan, predicate));
        }

        if !select.order_by.is_empty() {
            let mut orderings = Vec::with_capacity(select.order_by.len());
            for item in &select.order_by {
                let expr = self.translate_expr(&item.expr, &scopes)?;
                let direction = if item.asc { Direction::Asc } else { Direction::Desc };
                orderings.push(OrderingSpec::new(expr, direction));
            }
            plan = QueryPlanNode::OrderBy(OrderByNode::new(plan, orderings));
        }

        if let Some(limit_ast) = &select.limit {
            let count = literal_nonneg_int(limit_ast)?;
            plan = QueryPlanNode::Limit(LimitNode::new(plan, count));
        }

        let is_aggregate = select
            .projection
            .iter()
            .any(|item| matches!(item.expr, SqlExpr::AggrFunc { .. }));

        if is_aggregate {
            let mut multi = MultiAggregation::new();
            for item in &select.projection {
                let (name, aggregation) = self.build_aggregation(item, &scopes)?;
                multi.add(name, aggregation);
            }
            Ok(QueryPlanNode::Aggregate(pauldb_physical_plan::AggregateNode::new(plan, multi)))
        } else {
            let mut select_node = SelectNode::new(plan);
            for item in &select.projection {
                match &item.expr {
                    SqlExpr::Wildcard => self.expand_wildcard(&scopes, &mut select_node),
                    _ => {
                        let expr = self.translate_expr(&item.expr, &scopes)?;
                        let name = item
                            .alias
                            .clone()
                            .unwrap_or_else(|| sanitize_output_name(expr.describe()));
                        select_node.add_column(name, expr);
                    }
                }
            }
            Ok(QueryPlanNode::Select(select_node))
        }
    }

    fn expand_wildcard(&self, scopes: &IndexMap<String, TableSchema>, select_node: &mut SelectNode) {
        let prefix_needed = scopes.len() > 1;
        for (alias, schema) in scopes {
            for column in schema.stored_columns() {
                let out_name = if prefix_needed {
                    format!("{alias}_{}", column.name())
                } else {
                    column.name().to_string()
                };
                let expr = Expr::column_ref(column.name(), Some(alias.clone()), column.value_type().clone());
                select_node.add_column(out_name, expr);
            }
        }
    }

    fn build_aggregation(
        &self,
        item: &ProjectionItem,
        scopes: &IndexMap<String, TableSchema>,
    ) -> Result<(String, Box<dyn pauldb_physical_plan::Aggregation>)> {
        let (func_name, arg) = match &item.expr {
            SqlExpr::AggrFunc { name, arg } => (name.as_str(), arg.as_ref()),
            _ => return schema_err!("expected an aggregate function in aggregate mode"),
        };

        let aggregation: Box<dyn pauldb_physical_plan::Aggregation> = match func_name {
            "COUNT" => Box::new(CountAggregation),
            "MAX" => Box::new(MaxAggregation::new(self.translate_aggregate_arg(arg, scopes)?)),
            "ARRAY_AGG" => Box::new(ArrayAggregation::new(self.translate_aggregate_arg(arg, scopes)?)),
            other => return not_impl_err!("unsupported aggregate function: {other}"),
        };

        let name = item.alias.clone().unwrap_or_else(|| aggregation.describe());
        Ok((name, aggregation))
    }

    fn translate_aggregate_arg(&self, arg: &SqlExpr, scopes: &IndexMap<String, TableSchema>) -> Result<Expr> {
        match arg {
            SqlExpr::Wildcard => schema_err!("this aggregate requires a column argument, not *"),
            other => self.translate_expr(other, scopes),
        }
    }

    fn translate_expr(&self, ast: &SqlExpr, scopes: &IndexMap<String, TableSchema>) -> Result<Expr> {
        match ast {
            SqlExpr::ColumnRef { table, column } => {
                let column = self.normalize(column.clone());
                match table {
                    Some(table) => {
                        let table = self.normalize(table.clone());
                        let schema = match scopes.get(&table) {
                            Some(s) => s,
                            None => return schema_err!("unknown table '{table}' in scope"),
                        };
                        let value_type = match schema.column(&column) {
                            Some(c) => c.value_type().clone(),
                            None => return column_not_found_err!("{table}.{column}"),
                        };
                        Ok(Expr::column_ref(column, Some(table), value_type))
                    }
                    None => {
                        let mut found: Option<(&String, &TableSchema)> = None;
                        for (alias, schema) in scopes {
                            if schema.has_column(&column) {
                                if found.is_some() {
                                    return ambiguous_err!(
                                        "column reference '{column}' matches more than one table in scope"
                                    );
                                }
                                found = Some((alias, schema));
                            }
                        }
                        match found {
                            None => column_not_found_err!("{column}"),
                            Some((alias, schema)) => {
                                let value_type = schema.column(&column).expect("has_column just matched").value_type().clone();
                                Ok(Expr::column_ref(column, Some(alias.clone()), value_type))
                            }
                        }
                    }
                }
            }
            SqlExpr::Number(text) => translate_number_literal(text),
            SqlExpr::SingleQuotedString(s) => Ok(Expr::literal(Value::String(s.clone()), ColumnType::string())),
            SqlExpr::BinaryExpr { operator, left, right } => {
                let left = self.translate_expr(left, scopes)?;
                let right = self.translate_expr(right, scopes)?;
                translate_binary_op(operator, left, right)
            }
            SqlExpr::Wildcard => schema_err!("'*' is only valid as a top-level projection item"),
            SqlExpr::AggrFunc { .. } => schema_err!("aggregate functions are only valid as a top-level projection item"),
            SqlExpr::Function { name, .. } => not_impl_err!("unsupported function: {}", name.join(".")),
            SqlExpr::ExprList(_) => schema_err!("a list of expressions is not valid here"),
        }
    }

    fn normalize(&self, identifier: String) -> String {
        if self.options.normalize_identifiers {
            identifier.to_ascii_lowercase()
        } else {
            identifier
        }
    }
}

/// Derives an output column name from an unaliased projection expression's
/// `describe()` text: whitespace stripped, every character outside
/// `[A-Za-z0-9_]` replaced with `_`, then lowercased.
fn sanitize_output_name(describe: String) -> String {
    describe
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect::<String>()
        .to_ascii_lowercase()
}

fn translate_binary_op(operator: &str, left: Expr, right: Expr) -> Result<Expr> {
    match operator {
        "=" => Ok(Expr::compare(left, CompareOp::Eq, right)),
        "!=" => Ok(Expr::compare(left, CompareOp::NotEq, right)),
        "<" => Ok(Expr::compare(left, CompareOp::Lt, right)),
        "<=" => Ok(Expr::compare(left, CompareOp::LtEq, right)),
        ">" => Ok(Expr::compare(left, CompareOp::Gt, right)),
        ">=" => Ok(Expr::compare(left, CompareOp::GtEq, right)),
        "AND" => Ok(Expr::and_or(left, BoolOp::And, right)),
        "OR" => Ok(Expr::and_or(left, BoolOp::Or, right)),
        other => not_impl_err!("unsupported binary operator: {other}"),
    }
}

fn translate_number_literal(text: &str) -> Result<Expr> {
    if let Ok(i) = text.parse::<i32>() {
        return Ok(Expr::literal(Value::Int32(i), ColumnType::int32()));
    }
    match text.parse::<f64>() {
        Ok(f) => Ok(Expr::literal(Value::Float(f), ColumnType::float())),
        Err(e) => schema_err!("invalid numeric literal '{text}': {e}"),
    }
}

fn literal_nonneg_int(ast: &SqlExpr) -> Result<usize> {
    match ast {
        SqlExpr::Number(text) => text
            .parse::<usize>()
            .map_err(|e| pauldb_common::PaulDbError::Schema(format!("LIMIT must be a non-negative integer literal: {e}"))),
        _ => schema_err!("LIMIT must be a non-negative integer literal"),
    }
}

fn literal_to_value(ast: &SqlExpr, expected: &ColumnType) -> Result<Value> {
    match expected.kind() {
        ColumnTypeKind::Nullable(inner) => literal_to_value(ast, inner),
        ColumnTypeKind::Int32 => parse_literal(ast, Value::Int32, "INT"),
        ColumnTypeKind::Uint32 | ColumnTypeKind::Serial => parse_literal(ast, Value::Uint32, "uint32"),
        ColumnTypeKind::Int16 => parse_literal(ast, Value::Int16, "int16"),
        ColumnTypeKind::Uint16 => parse_literal(ast, Value::Uint16, "uint16"),
        ColumnTypeKind::Float => parse_literal(ast, Value::Float, "FLOAT"),
        ColumnTypeKind::String => match ast {
            SqlExpr::SingleQuotedString(s) => Ok(Value::String(s.clone())),
            other => schema_err!("expected a string literal for TEXT, got {other:?}"),
        },
        other => not_impl_err!("INSERT literals are not supported for column type {other:?}"),
    }
}

fn parse_literal<T: std::str::FromStr>(
    ast: &SqlExpr,
    wrap: impl Fn(T) -> Value,
    type_name: &str,
) -> Result<Value> {
    match ast {
        SqlExpr::Number(text) => match text.parse::<T>() {
            Ok(v) => Ok(wrap(v)),
            Err(_) => schema_err!("invalid {type_name} literal: '{text}'"),
        },
        other => schema_err!("expected a numeric literal for {type_name}, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use pauldb_expr::{fill_insert_defaults, StoredRecord};

    use super::*;

    /// A minimal in-memory `DbFile`/`HeapTable` fake, just enough to drive
    /// `SqlToPlan` end to end without a real storage layer.
    struct MemHeapTable {
        schema: TableSchema,
        rows: Mutex<Vec<StoredRecord>>,
    }

    impl pauldb_physical_plan::HeapTable for MemHeapTable {
        fn schema(&self) -> &TableSchema {
            &self.schema
        }

        fn insert(&self, record: pauldb_expr::InsertRecord) -> Result<()> {
            let record = fill_insert_defaults(&self.schema, record)?;
            self.rows.lock().unwrap().push(record);
            Ok(())
        }

        fn scan(self: Arc<Self>) -> Box<dyn Iterator<Item = Result<StoredRecord>> + Send> {
            let rows = self.rows.lock().unwrap().clone();
            Box::new(rows.into_iter().map(Ok))
        }
    }

    struct MemDbFile {
        tables: Mutex<HashMap<String, Arc<MemHeapTable>>>,
    }

    impl MemDbFile {
        fn new() -> Self {
            Self {
                tables: Mutex::new(HashMap::new()),
            }
        }

        fn with_table(self, schema: TableSchema, rows: Vec<StoredRecord>) -> Self {
            self.tables.lock().unwrap().insert(
                schema.name().to_string(),
                Arc::new(MemHeapTable {
                    schema,
                    rows: Mutex::new(rows),
                }),
            );
            self
        }
    }

    impl DbFile for MemDbFile {
        fn get_table_schema(&self, table_name: &str) -> Option<TableSchema> {
            self.tables.lock().unwrap().get(table_name).map(|t| t.schema.clone())
        }

        fn get_schemas(&self) -> Vec<TableSchema> {
            self.tables.lock().unwrap().values().map(|t| t.schema.clone()).collect()
        }

        fn get_or_create_table(&self, schema: &TableSchema) -> Result<Arc<dyn pauldb_physical_plan::HeapTable>> {
            let mut tables = self.tables.lock().unwrap();
            let table = tables.entry(schema.name().to_string()).or_insert_with(|| {
                Arc::new(MemHeapTable {
                    schema: schema.clone(),
                    rows: Mutex::new(Vec::new()),
                })
            });
            Ok(Arc::clone(table) as Arc<dyn pauldb_physical_plan::HeapTable>)
        }

        fn rename_table(&self, old_name: &str, new_name: &str) -> Result<()> {
            let mut tables = self.tables.lock().unwrap();
            if let Some(table) = tables.remove(old_name) {
                tables.insert(new_name.to_string(), table);
            }
            Ok(())
        }

        fn drop_table(&self, table_name: &str) -> Result<()> {
            self.tables.lock().unwrap().remove(table_name);
            Ok(())
        }
    }

    fn cats_and_humans() -> MemDbFile {
        let cats = TableSchema::create("cats")
            .with_column(StoredColumn::new("id", ColumnType::int32()))
            .unwrap()
            .with_column(StoredColumn::new("name", ColumnType::string()))
            .unwrap()
            .with_column(StoredColumn::new("age", ColumnType::int32()))
            .unwrap();
        let cats_rows = vec![
            StoredRecord::from([
                ("id".to_string(), Value::Int32(1)),
                ("name".to_string(), Value::String("Whiskers".to_string())),
                ("age".to_string(), Value::Int32(2)),
            ]),
            StoredRecord::from([
                ("id".to_string(), Value::Int32(2)),
                ("name".to_string(), Value::String("Tom".to_string())),
                ("age".to_string(), Value::Int32(4)),
            ]),
        ];

        let humans = TableSchema::create("humans")
            .with_column(StoredColumn::new("id", ColumnType::int32()))
            .unwrap()
            .with_column(StoredColumn::new("name", ColumnType::string()))
            .unwrap();
        let humans_rows = vec![StoredRecord::from([
            ("id".to_string(), Value::Int32(1)),
            ("name".to_string(), Value::String("Alice".to_string())),
        ])];

        MemDbFile::new()
            .with_table(cats, cats_rows)
            .with_table(humans, humans_rows)
    }

    fn planner() -> SqlToPlan {
        SqlToPlan::new(ParserOptions::default())
    }

    #[test]
    fn sanitize_output_name_strips_and_lowercases() {
        assert_eq!(sanitize_output_name("CATS.AGE".to_string()), "cats_age");
        assert_eq!(sanitize_output_name("age + 1".to_string()), "age_1");
        assert_eq!(sanitize_output_name(" a-b.c ".to_string()), "a_b_c");
    }

    #[test]
    fn unaliased_projection_uses_sanitized_describe_as_name() {
        let db = cats_and_humans();
        let stmt = match &crate::ast::parse("SELECT age FROM cats").unwrap()[0] {
            Statement::Select(s) => s.clone(),
            _ => unreachable!(),
        };
        let plan = planner().plan_select(&stmt, &db).unwrap();
        let QueryPlanNode::Select(select_node) = &plan else {
            panic!("expected a Select node");
        };
        let names: Vec<&str> = select_node.columns().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["cats_age"]);
    }

    #[test]
    fn translate_expr_resolves_unqualified_column_against_single_scope() {
        let db = cats_and_humans();
        let mut scopes = IndexMap::new();
        scopes.insert("cats".to_string(), db.get_table_schema("cats").unwrap());
        let ast = SqlExpr::ColumnRef { table: None, column: "name".to_string() };
        let expr = planner().translate_expr(&ast, &scopes).unwrap();
        assert_eq!(expr.describe(), "cats.name");
    }

    #[test]
    fn translate_expr_rejects_ambiguous_unqualified_column() {
        let db = cats_and_humans();
        let mut scopes = IndexMap::new();
        scopes.insert("cats".to_string(), db.get_table_schema("cats").unwrap());
        scopes.insert("humans".to_string(), db.get_table_schema("humans").unwrap());
        let ast = SqlExpr::ColumnRef { table: None, column: "name".to_string() };
        let err = planner().translate_expr(&ast, &scopes).unwrap_err();
        assert!(matches!(err, pauldb_common::PaulDbError::Ambiguous(_)));
    }

    #[test]
    fn expand_wildcard_prefixes_by_alias_when_multiple_scopes() {
        let db = cats_and_humans();
        let mut scopes = IndexMap::new();
        scopes.insert("cats".to_string(), db.get_table_schema("cats").unwrap());
        scopes.insert("humans".to_string(), db.get_table_schema("humans").unwrap());
        let mut select_node = SelectNode::new(QueryPlanNode::TableScan(TableScanNode::new("cats", "cats")));
        planner().expand_wildcard(&scopes, &mut select_node);
        let names: Vec<&str> = select_node.columns().map(|(name, _)| name).collect();
        assert!(names.contains(&"cats_id"));
        assert!(names.contains(&"humans_id"));
        assert!(names.contains(&"cats_name"));
        assert!(names.contains(&"humans_name"));
    }

    #[test]
    fn expand_wildcard_keeps_bare_names_with_single_scope() {
        let db = cats_and_humans();
        let mut scopes = IndexMap::new();
        scopes.insert("cats".to_string(), db.get_table_schema("cats").unwrap());
        let mut select_node = SelectNode::new(QueryPlanNode::TableScan(TableScanNode::new("cats", "cats")));
        planner().expand_wildcard(&scopes, &mut select_node);
        let names: Vec<&str> = select_node.columns().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["id", "name", "age"]);
    }

    #[test]
    fn plan_select_with_join_filter_order_and_limit_executes() {
        let db = cats_and_humans();
        let sql = "SELECT cats.name FROM cats JOIN humans ON cats.id = humans.id \
                   WHERE cats.age > 1 ORDER BY cats.name DESC LIMIT 1";
        let stmt = match &crate::ast::parse(sql).unwrap()[0] {
            Statement::Select(s) => s.clone(),
            _ => unreachable!(),
        };
        let plan = planner().plan_select(&stmt, &db).unwrap();
        let rows: Vec<_> = plan.execute(&db).unwrap().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows.len(), 1);
    }
}
