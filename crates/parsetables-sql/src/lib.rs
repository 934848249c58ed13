//! SQL parsing and table-reference extraction
//!
//! This crate handles:
//! - Parsing SQL using datafusion-sqlparser-rs
//! - Folding the parser's AST into query nodes and reference trees
//! - Walking them to classify every table reference
//! - The `parse_tables` table function surface (bind data + scan)

pub mod parser;
pub mod ast;
pub mod extract;
pub mod table_function;

pub use parser::{SqlParser, ParsedSql, ParseError};
pub use ast::{QueryNode, QueryShape, CteDefinition, ReferenceTree};
pub use extract::TableExtractor;
pub use table_function::{
    distinct_names, parse_table_names, parse_tables, ParseTablesBindData, ParseTablesError,
    ParseTablesScan,
};
