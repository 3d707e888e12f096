//! PaulDB's own SQL AST and the SQL-to-plan translator. Plays the role
//! `datafusion-sql` plays for DataFusion: turns a parsed statement into
//! either a plan tree (`SELECT`) or a direct action against a `DbFile`
//! (`CREATE TABLE`, `INSERT`).

mod ast;
mod options;
mod planner;

pub use ast::{
    CreateTableStatement, FromItem, InsertStatement, OrderByItem, ProjectionItem,
    SelectStatement, SqlExpr, Statement,
};
pub use options::ParserOptions;
pub use planner::{SqlToPlan, StatementResult};

/// Parses `sql` into PaulDB's own AST, without planning it against any
/// particular `DbFile`.
pub fn parse(sql: &str) -> pauldb_common::Result<Vec<Statement>> {
    ast::parse(sql)
}
