//! sql-stringify: compile JSON query intent to SQL
//!
//! # Usage
//!
//! ```bash
//! # SELECT from a JSON request
//! sql-stringify select '{"from": "users", "where": {"active": true}, "limit": 10}'
//!
//! # Just the WHERE predicate
//! sql-stringify where '{"$or": {"name": "ann%", "id": [1, 2]}}'
//!
//! # Read the request from stdin
//! echo '[{"id": 1}, {"id": 2}]' | sql-stringify insert-many users -
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use serde_json::{Value, json};
use sql_stringify::prelude::*;
use sql_stringify::{Config, columns, escape_key, escape_value, where_clause};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sql-stringify")]
#[command(version)]
#[command(about = "Compile loosely-shaped JSON query intent into escaped SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    sql-stringify select '{\"from\": \"test\", \"columns\": \"name AS abc\", \"orderBy\": \"name\"}'
    sql-stringify count abc '{\"name\": \"egh\"}' --expr 1 --alias total
    sql-stringify update abc '{\"id\": 555}' '{\"name\": 12}'
    sql-stringify key 'user.id'")]
struct Cli {
    /// Config file (default: ./sql-stringify.toml, then the user config dir)
    #[arg(short, long, global = true, env = "SQL_STRINGIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Print only the SQL, without header or colors
    #[arg(short, long, global = true)]
    plain: bool,

    /// Log compile steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// SELECT from a JSON request {columns, from, where, orderBy, order, limit, skip}
    Select {
        /// JSON request, or - for stdin
        request: String,
    },
    /// SELECT COUNT(expr) AS alias
    Count {
        table: String,
        /// Where tree as JSON, or raw SQL
        #[arg(value_name = "WHERE")]
        filter: Option<String>,
        /// Counted expression (default from config, normally *)
        #[arg(long)]
        expr: Option<String>,
        /// Result alias (default from config, normally count)
        #[arg(long)]
        alias: Option<String>,
    },
    /// DELETE FROM table
    Delete {
        table: String,
        #[arg(value_name = "WHERE")]
        filter: Option<String>,
    },
    /// UPDATE table SET ...
    Update {
        table: String,
        /// JSON object of assignments, or - for stdin
        set: String,
        #[arg(value_name = "WHERE")]
        filter: Option<String>,
    },
    /// INSERT INTO table SET ...
    Insert {
        table: String,
        /// JSON object, or - for stdin
        row: String,
    },
    /// INSERT INTO table (...) VALUES (...), (...)
    InsertMany {
        table: String,
        /// JSON array of objects (or one object), or - for stdin
        rows: String,
    },
    /// Compile a where tree to a predicate
    Where {
        /// JSON where tree, or - for stdin
        tree: String,
    },
    /// Build a column list
    Columns {
        /// Column text or JSON spec
        spec: String,
        /// Qualify every column with this table
        #[arg(short, long)]
        table: Option<String>,
    },
    /// Escape an identifier
    Key {
        text: String,
        /// Quote `a.b` as a single name
        #[arg(long)]
        forbid_qualified: bool,
        /// Leave numerals unquoted
        #[arg(long)]
        ignore_number: bool,
    },
    /// Escape a value
    Value {
        /// JSON scalar, or plain text
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sql_stringify=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    if cli.plain || !config.color {
        colored::control::set_override(false);
    }

    let sql = match &cli.command {
        Commands::Select { request } => {
            compile(StatementKind::Select, parse_json(request)?, &config)?
        }
        Commands::Count { table, filter, expr, alias } => {
            let mut request = json!({ "table": table });
            if let Some(filter) = filter {
                request["where"] = parse_loose(filter)?;
            }
            if let Some(expr) = expr {
                request["expr"] = Value::String(expr.clone());
            }
            if let Some(alias) = alias {
                request["alias"] = Value::String(alias.clone());
            }
            compile(StatementKind::Count, request, &config)?
        }
        Commands::Delete { table, filter } => {
            let mut request = json!({ "table": table });
            if let Some(filter) = filter {
                request["where"] = parse_loose(filter)?;
            }
            compile(StatementKind::Delete, request, &config)?
        }
        Commands::Update { table, set, filter } => {
            let mut request = json!({ "table": table, "set": parse_json(set)? });
            if let Some(filter) = filter {
                request["where"] = parse_loose(filter)?;
            }
            compile(StatementKind::Update, request, &config)?
        }
        Commands::Insert { table, row } => {
            let request = json!({ "table": table, "set": parse_json(row)? });
            compile(StatementKind::Insert, request, &config)?
        }
        Commands::InsertMany { table, rows } => {
            let request = json!({ "table": table, "rows": parse_json(rows)? });
            compile(StatementKind::InsertMany, request, &config)?
        }
        Commands::Where { tree } => {
            let tree = WhereNode::try_from(&parse_json(tree)?)?;
            where_clause(Some(&tree)).unwrap_or_default()
        }
        Commands::Columns { spec, table } => {
            let spec = ColumnSpec::try_from(&parse_loose(spec)?)?;
            columns(&spec, table.as_deref())?
        }
        Commands::Key { text, forbid_qualified, ignore_number } => {
            let opts = KeyOptions {
                forbid_qualified: *forbid_qualified,
                ignore_number: *ignore_number,
                ignore_string: false,
            };
            escape_key(&Identifier::from(text.as_str()), opts)
        }
        Commands::Value { value } => escape_value(&Scalar::try_from(&parse_loose(value)?)?, true),
    };

    if cli.plain {
        println!("{sql}");
    } else {
        println!("{}", "Generated SQL:".green().bold());
        println!("{}", sql.white());
    }
    Ok(())
}

fn compile(kind: StatementKind, request: Value, config: &Config) -> anyhow::Result<String> {
    let stmt = Statement::from_json_with(kind, &request, config)?;
    Ok(stmt.to_sql()?)
}

/// The argument itself, or stdin when it is `-`.
fn read_arg(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn parse_json(arg: &str) -> anyhow::Result<Value> {
    let text = read_arg(arg)?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON: {}", text.trim()))
}

/// JSON when it parses, otherwise the text as a JSON string.
fn parse_loose(arg: &str) -> anyhow::Result<Value> {
    let text = read_arg(arg)?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}
