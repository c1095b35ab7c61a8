//! INSERT SQL generation.

use super::ToSql;
use super::update::set;
use crate::error::{Error, Result};
use crate::identifier::{Identifier, KeyOptions, escape_key, escape_key_text};
use crate::value::{Record, escape_value};

/// `INSERT INTO table SET k = v, ...`.
#[derive(Debug, Clone)]
pub struct Insert {
    pub table: Identifier,
    pub row: Record,
    pub ignore_undefined: bool,
}

impl Insert {
    pub fn new(table: impl Into<Identifier>, row: Record) -> Self {
        Self {
            table: table.into(),
            row,
            ignore_undefined: true,
        }
    }

    pub fn ignore_undefined(mut self, ignore: bool) -> Self {
        self.ignore_undefined = ignore;
        self
    }
}

impl ToSql for Insert {
    fn to_sql(&self) -> Result<String> {
        let assignments = set(&self.row, self.ignore_undefined);
        if assignments.is_empty() {
            tracing::warn!("insert without fields");
            return Err(Error::invalid("insert needs at least one field"));
        }

        let sql = format!(
            "INSERT INTO {} SET {assignments}",
            escape_key(&self.table, KeyOptions::default())
        );

        tracing::debug!(%sql, "compiled insert");
        Ok(sql)
    }
}

/// Compile a single-row INSERT.
pub fn insert(
    table: impl Into<Identifier>,
    row: &Record,
    ignore_undefined: bool,
) -> Result<String> {
    Insert::new(table, row.clone())
        .ignore_undefined(ignore_undefined)
        .to_sql()
}

/// `INSERT INTO table (cols) VALUES (...), (...)`.
///
/// Column names come from the first row. Each row drops its own undefined
/// fields, so rows are expected to share one shape.
#[derive(Debug, Clone)]
pub struct InsertMany {
    pub table: Identifier,
    pub rows: Vec<Record>,
    pub ignore_undefined: bool,
}

impl InsertMany {
    pub fn new(table: impl Into<Identifier>, rows: impl Into<Vec<Record>>) -> Self {
        Self {
            table: table.into(),
            rows: rows.into(),
            ignore_undefined: true,
        }
    }

    pub fn ignore_undefined(mut self, ignore: bool) -> Self {
        self.ignore_undefined = ignore;
        self
    }

    fn column_list(&self, first: &Record) -> String {
        first
            .iter()
            .filter(|(_, value)| value.is_some() || !self.ignore_undefined)
            .map(|(key, _)| escape_key_text(key, KeyOptions::default().ignore_number()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl ToSql for InsertMany {
    fn to_sql(&self) -> Result<String> {
        let Some(first) = self.rows.first() else {
            tracing::warn!("insert without rows");
            return Err(Error::invalid("insert needs at least one row"));
        };

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            escape_key(&self.table, KeyOptions::default()),
            self.column_list(first),
            values(&self.rows, self.ignore_undefined)
        );

        tracing::debug!(rows = self.rows.len(), %sql, "compiled insert");
        Ok(sql)
    }
}

/// Compile a multi-row INSERT.
///
/// ```
/// use sql_stringify::{insert_many, Record};
///
/// let row = Record::new().field("id", 555).undefined("by").field("name", "abc");
/// assert_eq!(
///     insert_many("abc", vec![row], true).unwrap(),
///     "INSERT INTO `abc` (`id`, `name`) VALUES (555, 'abc')"
/// );
/// ```
pub fn insert_many(
    table: impl Into<Identifier>,
    rows: impl Into<Vec<Record>>,
    ignore_undefined: bool,
) -> Result<String> {
    InsertMany::new(table, rows)
        .ignore_undefined(ignore_undefined)
        .to_sql()
}

/// Build one `(v1, v2, ...)` tuple per row, joined with `, `.
pub fn values(rows: &[Record], ignore_undefined: bool) -> String {
    rows.iter()
        .map(|row| {
            let tuple = row
                .iter()
                .filter_map(|(_, value)| match value {
                    Some(value) => Some(escape_value(value, true)),
                    None if ignore_undefined => None,
                    None => Some("NULL".to_string()),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("({tuple})")
        })
        .collect::<Vec<_>>()
        .join(", ")
}
