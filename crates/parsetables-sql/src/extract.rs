//! Table-reference extraction
//!
//! Walks a query node and its FROM reference tree in pre-order, left to
//! right, emitting one `TableRef` per base-table reference and one per CTE
//! definition. The walk has no failure branches: shapes it does not model
//! are skipped.

use std::collections::HashSet;
use parsetables_core::{TableContext, TableRef, DEFAULT_SCHEMA};
use sqlparser::ast::Query;

use crate::ast::{QueryNode, QueryShape, ReferenceTree};

/// Inherited state for one position in the walk
///
/// Never mutated in place: each recursive call gets a derived copy.
#[derive(Debug, Clone)]
struct Scope {
    /// Label applied to base tables that no other rule claims
    label: TableContext,

    /// Position is on the left-most spine of a query node's FROM tree.
    /// Only promotes the node's direct FROM target to `from`; join sides keep
    /// their `join_left`/`join_right` label.
    top_level: bool,

    /// CTE names defined at this node or any enclosing node, ASCII-lowercased
    ctes: HashSet<String>,
}

impl Scope {
    fn root() -> Self {
        Self {
            label: TableContext::From,
            top_level: false,
            ctes: HashSet::new(),
        }
    }

    fn with_label(&self, label: TableContext, top_level: bool) -> Self {
        Self {
            label,
            top_level,
            ctes: self.ctes.clone(),
        }
    }

    fn with_ctes<'a>(&self, names: impl Iterator<Item = &'a str>) -> Self {
        let mut ctes = self.ctes.clone();
        ctes.extend(names.map(str::to_ascii_lowercase));
        Self {
            label: self.label,
            top_level: self.top_level,
            ctes,
        }
    }

    /// Identifiers compare case-insensitively, quoted or not
    fn sees_cte(&self, name: &str) -> bool {
        self.ctes.contains(&name.to_ascii_lowercase())
    }
}

/// Extracts `(schema, table, context)` rows from parsed queries
#[derive(Debug, Clone)]
pub struct TableExtractor {
    default_schema: String,
}

impl TableExtractor {
    /// Create an extractor that reports unqualified tables under `main`
    pub fn new() -> Self {
        Self::with_default_schema(DEFAULT_SCHEMA)
    }

    pub fn with_default_schema(schema: impl Into<String>) -> Self {
        Self {
            default_schema: schema.into(),
        }
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    /// Extract all table references from a top-level query
    pub fn extract(&self, query: &Query) -> Vec<TableRef> {
        let mut out = Vec::new();
        self.extract_into(query, &mut out);
        out
    }

    /// Extract into an existing accumulator, preserving its contents
    pub fn extract_into(&self, query: &Query, out: &mut Vec<TableRef>) {
        self.walk_query(QueryNode::new(query), &Scope::root(), out);
    }

    fn walk_query<'a>(&self, node: QueryNode<'a>, scope: &Scope, out: &mut Vec<TableRef>) {
        let shape = node.shape();
        if let QueryShape::Other = shape {
            tracing::trace!("skipping query node that is not a plain SELECT");
            return;
        }

        let scope = scope.with_ctes(node.cte_names());

        for cte in node.ctes() {
            out.push(TableRef::cte_definition(cte.name));
            self.walk_query(cte.body, &scope.with_label(TableContext::From, false), out);
        }

        match shape {
            QueryShape::PlainSelect(select) => {
                if let Some(tree) = ReferenceTree::from_select(select) {
                    self.walk_ref(&tree, &scope.with_label(scope.label, true), out);
                }
            }
            QueryShape::Parenthesized(inner) => self.walk_query(inner, &scope, out),
            QueryShape::Other => {}
        }
    }

    fn walk_ref<'a>(&self, tree: &ReferenceTree<'a>, scope: &Scope, out: &mut Vec<TableRef>) {
        match tree {
            ReferenceTree::BaseTable { schema, name } => {
                // Only an unqualified name can refer to a CTE
                let context = if schema.is_none() && scope.sees_cte(name) {
                    TableContext::FromCte
                } else if scope.top_level && !scope.label.is_join_side() {
                    TableContext::From
                } else {
                    scope.label
                };

                out.push(TableRef::new(
                    schema.unwrap_or(&self.default_schema),
                    *name,
                    context,
                ));
            }
            ReferenceTree::Join { left, right } => {
                self.walk_ref(left, &scope.with_label(TableContext::JoinLeft, scope.top_level), out);
                self.walk_ref(right, &scope.with_label(TableContext::JoinRight, false), out);
            }
            ReferenceTree::Subquery(query) => {
                self.walk_query(*query, &scope.with_label(TableContext::Subquery, false), out);
            }
            ReferenceTree::Other => {
                tracing::trace!("skipping unsupported table reference");
            }
        }
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::new()
    }
}
