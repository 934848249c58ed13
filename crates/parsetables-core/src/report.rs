//! Report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::diagnostic::{Diagnostic, Severity};
use crate::table_ref::{TableContext, TableRef};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of rows
    pub total: usize,

    /// Number of distinct base tables (CTEs excluded)
    pub distinct_tables: usize,

    /// Row count per context label
    pub by_context: BTreeMap<TableContext, usize>,

    /// Number of errors
    pub errors: usize,
}

/// Extraction report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// The SQL that was analyzed
    pub sql: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Extracted rows, in traversal order
    pub tables: Vec<TableRef>,

    /// Failures (a failed extraction has no rows)
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Create a report for a successful extraction
    pub fn from_tables(sql: impl Into<String>, tables: Vec<TableRef>) -> Self {
        let mut by_context = BTreeMap::new();
        for row in &tables {
            *by_context.entry(row.context).or_insert(0) += 1;
        }

        let mut names: Vec<(&str, &str)> = tables
            .iter()
            .filter(|row| !row.is_cte())
            .map(|row| (row.schema.as_str(), row.table.as_str()))
            .collect();
        names.sort_unstable();
        names.dedup();

        let summary = ReportSummary {
            total: tables.len(),
            distinct_tables: names.len(),
            by_context,
            errors: 0,
        };

        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            sql: sql.into(),
            summary,
            tables,
            diagnostics: Vec::new(),
        }
    }

    /// Create a report for a failed extraction
    pub fn from_failure(sql: impl Into<String>, diagnostic: Diagnostic) -> Self {
        let mut report = Self::from_tables(sql, Vec::new());
        report.add_diagnostic(diagnostic);
        report
    }

    /// Add a diagnostic to the report
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            self.summary.errors += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
