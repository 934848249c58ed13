//! The `parse_tables` table function
//!
//! Split the way a host table function is: bind data holds the input and
//! output shape, a scan state owns the materialized rows and hands them out
//! one at a time.

use std::collections::HashSet;
use parsetables_core::{Config, Diagnostic, DiagnosticCode, DialectConfig, TableRef, DEFAULT_SCHEMA};
use sqlparser::ast::Statement;

use crate::extract::TableExtractor;
use crate::parser::{ParseError, SqlParser};

/// Errors surfaced by `parse_tables`
///
/// Both kinds fail the whole call; no rows are returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseTablesError {
    #[error("Failed to parse SQL: {0}")]
    ParseFailure(String),

    #[error("parse_tables only supports SELECT statements")]
    UnsupportedStatementKind,
}

impl ParseTablesError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            Self::ParseFailure(_) => DiagnosticCode::SqlParseError,
            Self::UnsupportedStatementKind => DiagnosticCode::SqlUnsupportedStatement,
        };
        Diagnostic::error(code, self.to_string())
    }
}

impl From<ParseError> for ParseTablesError {
    fn from(e: ParseError) -> Self {
        Self::ParseFailure(e.error.to_string())
    }
}

/// Input and output shape of one `parse_tables` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTablesBindData {
    /// SQL text to analyze
    pub sql: String,

    /// Dialect used to parse `sql`
    pub dialect: DialectConfig,

    /// Schema reported for unqualified tables
    pub default_schema: String,
}

impl ParseTablesBindData {
    pub const FUNCTION_NAME: &'static str = "parse_tables";

    /// Output columns, in order
    pub const COLUMN_NAMES: [&'static str; 3] = ["schema", "table", "context"];

    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            dialect: DialectConfig::default(),
            default_schema: DEFAULT_SCHEMA.to_string(),
        }
    }

    /// Bind with dialect and default schema taken from a config
    pub fn with_config(sql: impl Into<String>, config: &Config) -> Self {
        Self {
            sql: sql.into(),
            dialect: config.dialect,
            default_schema: config.default_schema.clone(),
        }
    }

    /// Parse and walk every statement, all or nothing
    pub fn extract(&self) -> Result<Vec<TableRef>, ParseTablesError> {
        let parsed = SqlParser::from_dialect(&self.dialect).parse(&self.sql)?;
        tracing::debug!(statements = parsed.statement_count(), dialect = ?self.dialect, "parsed SQL");

        let extractor = TableExtractor::with_default_schema(self.default_schema.as_str());
        let mut rows = Vec::new();

        for statement in &parsed.statements {
            match statement {
                Statement::Query(query) => extractor.extract_into(query, &mut rows),
                _ => return Err(ParseTablesError::UnsupportedStatementKind),
            }
        }

        tracing::debug!(rows = rows.len(), "extracted table references");
        Ok(rows)
    }

    /// Start a scan over this call's rows
    pub fn scan(&self) -> ParseTablesScan<'_> {
        ParseTablesScan {
            bind: self,
            state: ScanState::Unconsumed,
        }
    }
}

#[derive(Debug)]
enum ScanState {
    Unconsumed,
    Streaming { rows: Vec<TableRef>, cursor: usize },
    Failed(ParseTablesError),
}

/// Pull-based scan over the rows of one `parse_tables` call
///
/// The first pull parses and walks the SQL; later pulls drain the result.
/// Once exhausted, every pull returns `Ok(None)`. A failed scan keeps
/// returning its error and never re-parses.
#[derive(Debug)]
pub struct ParseTablesScan<'b> {
    bind: &'b ParseTablesBindData,
    state: ScanState,
}

impl ParseTablesScan<'_> {
    pub fn next_row(&mut self) -> Result<Option<TableRef>, ParseTablesError> {
        match &mut self.state {
            ScanState::Unconsumed => {
                self.state = match self.bind.extract() {
                    Ok(rows) => ScanState::Streaming { rows, cursor: 0 },
                    Err(e) => ScanState::Failed(e),
                };
                self.next_row()
            }
            ScanState::Streaming { rows, cursor } => {
                let row = rows.get(*cursor).cloned();
                if row.is_some() {
                    *cursor += 1;
                }
                Ok(row)
            }
            ScanState::Failed(e) => Err(e.clone()),
        }
    }

    /// Drain all remaining rows
    pub fn collect_rows(&mut self) -> Result<Vec<TableRef>, ParseTablesError> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row()? {
            rows.push(row);
        }
        Ok(rows)
    }
}

/// Extract `(schema, table, context)` rows with default settings
pub fn parse_tables(sql: &str) -> Result<Vec<TableRef>, ParseTablesError> {
    ParseTablesBindData::new(sql).extract()
}

/// Distinct table names in order of first appearance
///
/// CTE definitions and CTE references are left out unless `include_ctes` is set.
pub fn parse_table_names(sql: &str, include_ctes: bool) -> Result<Vec<String>, ParseTablesError> {
    Ok(distinct_names(&parse_tables(sql)?, include_ctes))
}

/// Distinct names from already-extracted rows
pub fn distinct_names(rows: &[TableRef], include_ctes: bool) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut names = Vec::new();
    for row in rows {
        if row.is_cte() && !include_ctes {
            continue;
        }
        if seen.insert(row.table.as_str()) {
            names.push(row.table.clone());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use parsetables_core::TableContext;
    use pretty_assertions::assert_eq;

    #[test]
    fn bind_reports_column_names() {
        assert_eq!(ParseTablesBindData::COLUMN_NAMES, ["schema", "table", "context"]);
        assert_eq!(ParseTablesBindData::FUNCTION_NAME, "parse_tables");
    }

    #[test]
    fn scan_drains_rows_then_stays_exhausted() {
        let bind = ParseTablesBindData::new("SELECT * FROM a JOIN b ON a.id = b.id");
        let mut scan = bind.scan();

        assert_eq!(
            scan.next_row().unwrap(),
            Some(TableRef::new("main", "a", TableContext::JoinLeft))
        );
        assert_eq!(
            scan.next_row().unwrap(),
            Some(TableRef::new("main", "b", TableContext::JoinRight))
        );
        for _ in 0..3 {
            assert_eq!(scan.next_row().unwrap(), None);
        }
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let bind = ParseTablesBindData::new("SELECT 42");
        let mut scan = bind.scan();
        assert_eq!(scan.next_row(), Ok(None));
        assert_eq!(scan.next_row(), Ok(None));
    }

    #[test]
    fn parse_failure_is_sticky() {
        let bind = ParseTablesBindData::new("SELEC 1");
        let mut scan = bind.scan();

        let err = scan.next_row().unwrap_err();
        assert!(matches!(err, ParseTablesError::ParseFailure(_)));
        assert!(err.to_string().starts_with("Failed to parse SQL: "));
        assert_eq!(scan.next_row().unwrap_err(), err);
    }

    #[test]
    fn insert_is_rejected() {
        let err = parse_tables("INSERT INTO t VALUES (1)").unwrap_err();
        assert_eq!(err, ParseTablesError::UnsupportedStatementKind);
        assert_eq!(err.to_string(), "parse_tables only supports SELECT statements");
        assert_eq!(err.to_diagnostic().code, DiagnosticCode::SqlUnsupportedStatement);
    }

    #[test]
    fn any_non_select_statement_fails_the_call() {
        let err = parse_tables("SELECT * FROM a; DELETE FROM b").unwrap_err();
        assert_eq!(err, ParseTablesError::UnsupportedStatementKind);
    }

    #[test]
    fn multiple_selects_accumulate_in_order() {
        assert_eq!(
            parse_tables("SELECT * FROM a; SELECT * FROM b").unwrap(),
            vec![
                TableRef::new("main", "a", TableContext::From),
                TableRef::new("main", "b", TableContext::From),
            ]
        );
    }

    #[test]
    fn config_controls_default_schema() {
        let config = Config {
            default_schema: "public".to_string(),
            dialect: DialectConfig::Postgres,
            ..Config::default()
        };
        let rows = ParseTablesBindData::with_config("SELECT * FROM t", &config)
            .extract()
            .unwrap();

        assert_eq!(rows, vec![TableRef::new("public", "t", TableContext::From)]);
    }

    #[test]
    fn table_names() {
        let sql = "WITH c AS (SELECT * FROM orders) \
                   SELECT * FROM c JOIN orders ON true JOIN s.customers ON true";

        assert_eq!(parse_table_names(sql, false).unwrap(), ["orders", "customers"]);
        assert_eq!(parse_table_names(sql, true).unwrap(), ["c", "orders", "customers"]);
    }

    #[test]
    fn distinct_names_keep_first_appearance() {
        let rows = vec![
            TableRef::new("main", "b", TableContext::JoinLeft),
            TableRef::new("s", "a", TableContext::JoinRight),
            TableRef::new("main", "b", TableContext::Subquery),
            TableRef::new("main", "a", TableContext::From),
        ];

        assert_eq!(distinct_names(&rows, false), ["b", "a"]);
    }
}
