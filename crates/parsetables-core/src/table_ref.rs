//! Extracted table references
//!
//! A `TableRef` is one output row of `parse_tables`: the schema, the table
//! (or CTE) name, and the syntactic role the reference plays in the query.

use serde::{Deserialize, Serialize};

/// Schema reported for unqualified base tables
pub const DEFAULT_SCHEMA: &str = "main";

/// Syntactic role of a table reference
///
/// These labels are STABLE output values. Do NOT rename them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableContext {
    /// Unjoined target of a query's FROM clause
    From,

    /// Reference to a CTE visible at this point
    FromCte,

    /// Left side of a join
    JoinLeft,

    /// Right side of a join
    JoinRight,

    /// Inside a derived table (subquery in FROM)
    Subquery,

    /// A CTE definition
    Cte,
}

impl TableContext {
    /// All labels, in declaration order
    pub const ALL: [TableContext; 6] = [
        Self::From,
        Self::FromCte,
        Self::JoinLeft,
        Self::JoinRight,
        Self::Subquery,
        Self::Cte,
    ];

    /// Get the label as it appears in the `context` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::From => "from",
            Self::FromCte => "from_cte",
            Self::JoinLeft => "join_left",
            Self::JoinRight => "join_right",
            Self::Subquery => "subquery",
            Self::Cte => "cte",
        }
    }

    /// Whether this label marks one side of a join
    pub fn is_join_side(&self) -> bool {
        matches!(self, Self::JoinLeft | Self::JoinRight)
    }
}

impl std::fmt::Display for TableContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One `(schema, table, context)` row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    /// Schema qualifier, the default schema when unqualified, empty for CTE definitions
    pub schema: String,

    /// Table or CTE name
    pub table: String,

    /// Syntactic role
    pub context: TableContext,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>, context: TableContext) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            context,
        }
    }

    /// Row for a CTE definition (no schema)
    pub fn cte_definition(name: impl Into<String>) -> Self {
        Self::new("", name, TableContext::Cte)
    }

    /// True for rows that name a CTE rather than a base table
    pub fn is_cte(&self) -> bool {
        matches!(self.context, TableContext::Cte | TableContext::FromCte)
    }

    /// Column values in output order
    pub fn columns(&self) -> [&str; 3] {
        [&self.schema, &self.table, self.context.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_labels_are_stable() {
        let labels: Vec<_> = TableContext::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(labels, ["from", "from_cte", "join_left", "join_right", "subquery", "cte"]);
    }

    #[test]
    fn context_serializes_as_label() {
        let json = serde_json::to_string(&TableContext::JoinRight).unwrap();
        assert_eq!(json, "\"join_right\"");

        let parsed: TableContext = serde_json::from_str("\"from_cte\"").unwrap();
        assert_eq!(parsed, TableContext::FromCte);
    }

    #[test]
    fn cte_definition_has_no_schema() {
        let row = TableRef::cte_definition("recent");
        assert_eq!(row.columns(), ["", "recent", "cte"]);
        assert!(row.is_cte());
    }

    #[test]
    fn join_sides() {
        assert!(TableContext::JoinLeft.is_join_side());
        assert!(!TableContext::Subquery.is_join_side());
    }
}
