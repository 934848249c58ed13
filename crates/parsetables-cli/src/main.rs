use clap::{Parser, Subcommand};
use colored::Colorize;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use parsetables_core::{Config, DialectConfig, Location, OutputFormat, Report, TableRef};
use parsetables_sql::{distinct_names, ParseTablesBindData};

mod render;

/// parsetables - list the tables a SQL query reads from
#[derive(Parser)]
#[command(name = "parsetables")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: parsetables.toml)
    #[arg(short, long, global = true, env = "PARSETABLES_CONFIG")]
    config: Option<PathBuf>,

    /// SQL dialect (ansi, duckdb, postgres, bigquery, snowflake)
    #[arg(short, long, global = true, env = "PARSETABLES_DIALECT")]
    dialect: Option<DialectConfig>,

    /// Schema reported for unqualified tables
    #[arg(long, global = true, env = "PARSETABLES_DEFAULT_SCHEMA")]
    default_schema: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the SQL comes from; stdin when neither is given
#[derive(clap::Args)]
struct SqlInput {
    /// SQL text
    sql: Option<String>,

    /// Read SQL from a file
    #[arg(short, long, conflicts_with = "sql")]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print (schema, table, context) for every table reference
    Tables {
        #[command(flatten)]
        input: SqlInput,

        /// Output format (table, json, csv)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Also write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print distinct table names, one per line
    Names {
        #[command(flatten)]
        input: SqlInput,

        /// Include CTE names
        #[arg(long)]
        include_ctes: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let mut config = load_config(cli.config.as_deref(), cli.verbose)?;
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    if let Some(schema) = &cli.default_schema {
        config.default_schema = schema.clone();
    }

    if cli.verbose {
        eprintln!("{} dialect: {:?}", "Using".cyan(), config.dialect);
    }

    match cli.command {
        Commands::Tables { input, format, output } => {
            let format = format.unwrap_or(config.format);
            tables_command(&config, &input, format, output.as_deref())
        }
        Commands::Names { input, include_ctes } => {
            names_command(&config, &input, include_ctes)
        }
    }
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let default_path = Path::new(Config::FILE_NAME);
    if default_path.exists() {
        return Ok(Config::from_file(default_path)?);
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

/// Read the SQL text and describe where it came from
fn read_sql(input: &SqlInput) -> Result<(String, Location)> {
    if let Some(sql) = &input.sql {
        return Ok((sql.clone(), Location::new("<arg>")));
    }

    if let Some(path) = &input.file {
        let sql = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read SQL file {}", path.display()))?;
        return Ok((sql, Location::new(path.display().to_string())));
    }

    let mut sql = String::new();
    std::io::stdin()
        .read_to_string(&mut sql)
        .context("Failed to read SQL from stdin")?;
    Ok((sql, Location::new("<stdin>")))
}

/// Run the extraction, reporting a failure the way the chosen format expects
fn extract(config: &Config, input: &SqlInput, format: OutputFormat) -> Result<(String, Vec<TableRef>)> {
    let (sql, location) = read_sql(input)?;
    tracing::debug!(source = %location.file, bytes = sql.len(), "read SQL input");

    let bind = ParseTablesBindData::with_config(sql.as_str(), config);
    match bind.scan().collect_rows() {
        Ok(rows) => Ok((sql, rows)),
        Err(e) => {
            let diag = e.to_diagnostic().with_location(location);
            if format == OutputFormat::Json {
                println!("{}", Report::from_failure(sql, diag).to_json()?);
            } else {
                eprintln!("{} {}", "error:".red().bold(), diag);
            }
            std::process::exit(1);
        }
    }
}

fn tables_command(
    config: &Config,
    input: &SqlInput,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let (sql, rows) = extract(config, input, format)?;
    let report = Report::from_tables(sql, rows);

    if let Some(path) = output {
        report.save_to_file(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "report saved");
    }

    match format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Csv => println!("{}", render::render_csv(&report.tables)),
        OutputFormat::Table => {
            let rendered = render::render_table(&report.tables);
            let mut lines = rendered.lines();
            if let Some(header) = lines.next() {
                println!("{}", header.bold());
            }
            for line in lines {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

fn names_command(config: &Config, input: &SqlInput, include_ctes: bool) -> Result<()> {
    let (_, rows) = extract(config, input, OutputFormat::Table)?;

    for name in distinct_names(&rows, include_ctes) {
        println!("{}", name);
    }

    Ok(())
}
