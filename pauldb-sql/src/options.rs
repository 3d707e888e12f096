//! Planner-level configuration, modeled directly on
//! `datafusion::sql::planner::ParserOptions`.

/// Toggles affecting how SQL gets translated into a plan tree.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Lowercase unquoted identifiers before resolving them against a
    /// schema, mirroring `IdentNormalizer` in `datafusion::sql::planner`.
    pub normalize_identifiers: bool,
    /// Reject a non-literal `LIMIT` up front instead of deferring the error
    /// to plan execution.
    pub strict_limit: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            normalize_identifiers: true,
            strict_limit: true,
        }
    }
}
