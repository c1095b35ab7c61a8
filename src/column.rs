//! Column expressions and projection lists.

use crate::error::{Error, Result};
use crate::identifier::{KeyOptions, escape_key_text};
use crate::shape;
use crate::value::{Record, Scalar, escape_value};

/// A projection as callers write it.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSpec {
    /// `"id, name AS n, COUNT(*) total"`
    Text(String),
    /// Each element is a spec of its own. A list led by a record uses only
    /// that record's keys.
    List(Vec<ColumnSpec>),
    /// The record's keys, skipping undefined fields.
    Record(Record),
    /// Only the first record's keys are used.
    Records(Vec<Record>),
    /// Written as its literal form, unescaped.
    Literal(Scalar),
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self::Text("*".to_string())
    }
}

impl From<&str> for ColumnSpec {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ColumnSpec {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<&str>> for ColumnSpec {
    fn from(v: Vec<&str>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Record> for ColumnSpec {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl From<Vec<Record>> for ColumnSpec {
    fn from(v: Vec<Record>) -> Self {
        Self::Records(v)
    }
}

impl From<bool> for ColumnSpec {
    fn from(v: bool) -> Self {
        Self::Literal(Scalar::Bool(v))
    }
}

/// Join an expression and an alias with `keyword`.
///
/// Neither side may be a wildcard: `* AS all` is not valid SQL.
pub fn alias(expr: &str, alias: &str, keyword: &str) -> Result<String> {
    if shape::wildcard(expr).is_some() || shape::wildcard(alias).is_some() {
        tracing::warn!(expr, alias, "refusing to alias a wildcard");
        return Err(Error::Syntax);
    }

    let expr = escape_key_text(expr, KeyOptions::default().ignore_number());
    let alias = escape_key_text(alias, KeyOptions::default());

    Ok(format!("{expr} {keyword} {alias}"))
}

/// Escape one column token, honouring `AS` and implicit aliases.
///
/// ```
/// use sql_stringify::escape_column;
///
/// assert_eq!(escape_column("name AS abc").unwrap(), "`name` AS `abc`");
/// assert_eq!(escape_column("(hello) h").unwrap(), "(`hello`) AS `h`");
/// assert_eq!(escape_column("COUNT(*)").unwrap(), "COUNT(*)");
/// assert!(escape_column("(*) AS all").is_err());
/// ```
pub fn escape_column(column: &str) -> Result<String> {
    if let Some(a) = shape::explicit_alias(column) {
        return alias(a.expr, a.alias, a.keyword);
    }

    if let Some(a) = shape::implicit_alias(column) {
        return alias(a.expr, a.alias, a.keyword);
    }

    if let Some(call) = shape::function_call(column) {
        return Ok(call.to_string());
    }

    Ok(escape_key_text(column, KeyOptions::default().ignore_number()))
}

/// Escape one token, prefixing the table qualifier when given.
fn qualified_column(token: &str, table: Option<&str>) -> Result<String> {
    match table {
        Some(table) => escape_column(&format!("{table}.{token}")),
        None => escape_column(token),
    }
}

/// Build an escaped, comma-joined projection list.
///
/// With `table`, every column is qualified before it is classified, so
/// `*` becomes `` `t`.* `` and `name` becomes `` `t`.`name` ``.
///
/// ```
/// use sql_stringify::{columns, ColumnSpec};
///
/// assert_eq!(columns(&"*".into(), None).unwrap(), "*");
/// assert_eq!(columns(&vec!["*", "a"].into(), Some("a")).unwrap(), "`a`.*, `a`.`a`");
/// ```
pub fn columns(spec: &ColumnSpec, table: Option<&str>) -> Result<String> {
    let sql = match spec {
        ColumnSpec::Text(text) => shape::split_columns(text)
            .into_iter()
            .map(|token| qualified_column(token, table))
            .collect::<Result<Vec<_>>>()?
            .join(", "),
        ColumnSpec::List(items) => match items.first() {
            Some(ColumnSpec::Record(first)) => record_columns(first, table)?,
            _ => items
                .iter()
                .map(|item| columns(item, table))
                .collect::<Result<Vec<_>>>()?
                .join(", "),
        },
        ColumnSpec::Record(record) => record_columns(record, table)?,
        ColumnSpec::Records(records) => match records.first() {
            Some(first) => record_columns(first, table)?,
            None => String::new(),
        },
        ColumnSpec::Literal(Scalar::Text(text)) => text.clone(),
        ColumnSpec::Literal(value) => escape_value(value, true),
    };
    Ok(sql)
}

fn record_columns(record: &Record, table: Option<&str>) -> Result<String> {
    Ok(record
        .defined_keys()
        .map(|key| qualified_column(key, table))
        .collect::<Result<Vec<_>>>()?
        .join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Record {
        Record::new()
            .field("name", "name1")
            .field("title", "title1")
            .field("*", "asd")
    }

    #[test]
    fn test_escape_column_aliases() {
        assert_eq!(escape_column("COUNT(*) AS count").unwrap(), "COUNT(*) AS `count`");
        assert_eq!(escape_column("(hello) as h").unwrap(), "(`hello`) as `h`");
        assert_eq!(escape_column("2 + 2 AS total").unwrap(), "2 + 2 AS `total`");
        assert_eq!(escape_column("name abc").unwrap(), "`name` AS `abc`");
        assert_eq!(
            escape_column("'asd' + 'er' concat").unwrap(),
            "'asd' + 'er' AS `concat`"
        );
        assert_eq!(escape_column("1 AS all").unwrap(), "1 AS `all`");
        assert_eq!(escape_column("all AS 1").unwrap(), "`all` AS `1`");
        assert_eq!(escape_column("true AS 1").unwrap(), "true AS `1`");
    }

    #[test]
    fn test_escape_column_wildcard_alias_fails() {
        assert!(matches!(escape_column("(*) AS all"), Err(Error::Syntax)));
        assert!(matches!(escape_column("* all"), Err(Error::Syntax)));
        assert!(matches!(escape_column("t.* AS x"), Err(Error::Syntax)));
        assert!(escape_column("name as 1").is_ok());
    }

    #[test]
    fn test_escape_column_plain() {
        assert_eq!(escape_column("title").unwrap(), "`title`");
        assert_eq!(escape_column("(desc)").unwrap(), "(`desc`)");
        assert_eq!(escape_column("2 + 2").unwrap(), "2 + 2");
        assert_eq!(escape_column("CAST(x AS CHAR)").unwrap(), "CAST(x AS CHAR)");
    }

    #[test]
    fn test_columns_text_and_list() {
        assert_eq!(columns(&"name".into(), None).unwrap(), "`name`");
        assert_eq!(columns(&vec!["name", "title"].into(), None).unwrap(), "`name`, `title`");
        assert_eq!(columns(&vec!["*", "a"].into(), None).unwrap(), "*, `a`");
        assert_eq!(columns(&"*".into(), Some("c")).unwrap(), "`c`.*");
        assert_eq!(
            columns(&"id,name , COALESCE(a, b) c".into(), None).unwrap(),
            "`id`, `name`, COALESCE(a, b) AS `c`"
        );
    }

    #[test]
    fn test_columns_records() {
        assert_eq!(columns(&sample().into(), None).unwrap(), "`name`, `title`, *");
        assert_eq!(
            columns(&sample().into(), Some("c")).unwrap(),
            "`c`.`name`, `c`.`title`, `c`.*"
        );

        let rows = vec![
            Record::new().field("name", "n").field("title", "t").field("all", "*"),
            Record::new().field("ignored", 1),
        ];
        assert_eq!(columns(&rows.clone().into(), None).unwrap(), "`name`, `title`, `all`");
        assert_eq!(
            columns(&rows.into(), Some("b")).unwrap(),
            "`b`.`name`, `b`.`title`, `b`.`all`"
        );
    }

    #[test]
    fn test_columns_list_led_by_record() {
        let mixed = ColumnSpec::List(vec![
            Record::new().field("a", 1).into(),
            "b".into(),
            Record::new().field("c", 1).into(),
        ]);
        assert_eq!(columns(&mixed, None).unwrap(), "`a`");
        assert_eq!(columns(&mixed, Some("t")).unwrap(), "`t`.`a`");
    }

    #[test]
    fn test_columns_skip_undefined_keys() {
        let record = Record::new().field("id", 1).undefined("by");
        assert_eq!(columns(&record.into(), None).unwrap(), "`id`");
    }

    #[test]
    fn test_columns_literal_passthrough() {
        assert_eq!(columns(&true.into(), None).unwrap(), "true");
        assert_eq!(
            columns(&ColumnSpec::Literal(Scalar::Int(1)), None).unwrap(),
            "1"
        );
    }
}
