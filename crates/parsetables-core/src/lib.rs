//! parsetables core
//!
//! Core domain model with stable, versioned types.
//! Context labels and diagnostic codes are part of the public output - never rename them.

pub mod table_ref;
pub mod diagnostic;
pub mod report;
pub mod config;

pub use table_ref::{TableRef, TableContext, DEFAULT_SCHEMA};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, Location};
pub use report::{Report, ReportSummary, ReportVersion};
pub use config::{Config, ConfigError, DialectConfig, OutputFormat};
