//! Narrow, read-only view over the sqlparser AST
//!
//! sqlparser models a query as `Query { with, body: SetExpr }` and a FROM
//! clause as a flat list of `TableWithJoins`. The walker only needs two node
//! kinds: a scope-bearing query node and a binary reference tree, so this
//! module folds the parser's shapes into those closed enums.

use sqlparser::ast::{Query, Select, SetExpr, TableFactor, TableWithJoins};

/// A scope-bearing query node: its own CTE list plus a body
#[derive(Debug, Clone, Copy)]
pub struct QueryNode<'a> {
    query: &'a Query,
}

/// Shape of a query node's body
#[derive(Debug, Clone, Copy)]
pub enum QueryShape<'a> {
    /// A single SELECT with its own FROM clause
    PlainSelect(&'a Select),

    /// `(<query>)` used as a body; walked as the inner node
    Parenthesized(QueryNode<'a>),

    /// Set operations, VALUES, and anything else not walked
    Other,
}

/// One `name AS (<query>)` entry of a WITH clause
#[derive(Debug, Clone, Copy)]
pub struct CteDefinition<'a> {
    pub name: &'a str,
    pub body: QueryNode<'a>,
}

impl<'a> QueryNode<'a> {
    pub fn new(query: &'a Query) -> Self {
        Self { query }
    }

    pub fn shape(&self) -> QueryShape<'a> {
        let query = self.query;
        match query.body.as_ref() {
            SetExpr::Select(select) => QueryShape::PlainSelect(select),
            SetExpr::Query(inner) => QueryShape::Parenthesized(QueryNode::new(inner)),
            _ => QueryShape::Other,
        }
    }

    /// CTEs defined directly at this node, in declaration order
    pub fn ctes(&self) -> impl Iterator<Item = CteDefinition<'a>> + 'a {
        let query = self.query;
        query
            .with
            .iter()
            .flat_map(|with| with.cte_tables.iter())
            .map(|cte| CteDefinition {
                name: cte.alias.name.value.as_str(),
                body: QueryNode::new(&cte.query),
            })
    }

    pub fn cte_names(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.ctes().map(|cte| cte.name)
    }
}

/// A FROM-clause reference tree
#[derive(Debug, Clone)]
pub enum ReferenceTree<'a> {
    /// `[catalog.][schema.]table`
    BaseTable {
        schema: Option<&'a str>,
        name: &'a str,
    },

    /// Two references combined by JOIN (or a comma)
    Join {
        left: Box<ReferenceTree<'a>>,
        right: Box<ReferenceTree<'a>>,
    },

    /// A derived table wrapping a nested query node
    Subquery(QueryNode<'a>),

    /// Table functions, UNNEST, PIVOT, LATERAL subqueries, ...
    Other,
}

impl<'a> ReferenceTree<'a> {
    /// Build the tree for a SELECT's FROM clause, if it has one
    ///
    /// `FROM a, b JOIN c` becomes `Join(Join(a, b), c)`: every additional
    /// relation is attached to the right of what came before it.
    pub fn from_select(select: &'a Select) -> Option<Self> {
        select
            .from
            .iter()
            .map(Self::from_table_with_joins)
            .reduce(Self::join)
    }

    pub fn from_table_with_joins(twj: &'a TableWithJoins) -> Self {
        twj.joins.iter().fold(Self::from_factor(&twj.relation), |tree, join| {
            Self::join(tree, Self::from_factor(&join.relation))
        })
    }

    pub fn from_factor(factor: &'a TableFactor) -> Self {
        match factor {
            // `FROM read_csv('x')` parses as a Table with arguments
            TableFactor::Table { args: Some(_), .. } => Self::Other,
            TableFactor::Table { name, .. } => {
                let mut parts = name.0.iter().rev();
                match parts.next() {
                    Some(table) => Self::BaseTable {
                        schema: parts.next().map(|ident| ident.value.as_str()),
                        name: table.value.as_str(),
                    },
                    None => Self::Other,
                }
            }
            TableFactor::Derived { lateral: false, subquery, .. } => {
                Self::Subquery(QueryNode::new(subquery))
            }
            TableFactor::NestedJoin { table_with_joins, .. } => {
                Self::from_table_with_joins(table_with_joins)
            }
            _ => Self::Other,
        }
    }

    fn join(left: Self, right: Self) -> Self {
        Self::Join {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SqlParser;
    use sqlparser::ast::Statement;

    fn parse_query(sql: &str) -> Query {
        let parsed = SqlParser::new().parse(sql).unwrap();
        match parsed.statements.into_iter().next() {
            Some(Statement::Query(query)) => *query,
            other => panic!("expected a query, got {:?}", other),
        }
    }

    fn from_tree(query: &Query) -> Option<ReferenceTree<'_>> {
        match QueryNode::new(query).shape() {
            QueryShape::PlainSelect(select) => ReferenceTree::from_select(select),
            _ => None,
        }
    }

    #[test]
    fn qualified_names() {
        let query = parse_query("SELECT * FROM db.sales.orders");
        match from_tree(&query) {
            Some(ReferenceTree::BaseTable { schema, name }) => {
                assert_eq!(schema, Some("sales"));
                assert_eq!(name, "orders");
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn join_chain_is_left_deep() {
        let query = parse_query("SELECT * FROM a JOIN b ON a.id = b.id, c");
        let Some(ReferenceTree::Join { left, right }) = from_tree(&query) else {
            panic!("expected a join");
        };

        assert!(matches!(*right, ReferenceTree::BaseTable { name: "c", .. }));
        assert!(matches!(*left, ReferenceTree::Join { .. }));
    }

    #[test]
    fn no_from_clause() {
        let query = parse_query("SELECT 1");
        assert!(from_tree(&query).is_none());
    }

    #[test]
    fn set_operation_is_other_shape() {
        let query = parse_query("SELECT * FROM a UNION SELECT * FROM b");
        assert!(matches!(QueryNode::new(&query).shape(), QueryShape::Other));
    }

    #[test]
    fn cte_names_in_order() {
        let query = parse_query("WITH x AS (SELECT 1), y AS (SELECT 2) SELECT * FROM y");
        let names: Vec<_> = QueryNode::new(&query).cte_names().collect();
        assert_eq!(names, ["x", "y"]);
    }

    #[test]
    fn table_function_is_other() {
        let query = parse_query("SELECT * FROM generate_series(1, 3)");
        assert!(matches!(from_tree(&query), Some(ReferenceTree::Other)));
    }
}
