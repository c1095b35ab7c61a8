//! UPDATE SQL generation and the shared SET list.

use super::{Predicate, ToSql, push_where};
use crate::error::Result;
use crate::filter::WhereNode;
use crate::identifier::{Identifier, KeyOptions, escape_key, escape_key_text};
use crate::value::{Record, escape_value};

/// An UPDATE statement.
#[derive(Debug, Clone)]
pub struct Update {
    pub table: Identifier,
    pub assignments: Record,
    pub filter: Option<Predicate>,
    /// Skip undefined fields instead of writing `NULL`.
    pub ignore_undefined: bool,
}

impl Update {
    pub fn new(table: impl Into<Identifier>, assignments: Record) -> Self {
        Self {
            table: table.into(),
            assignments,
            filter: None,
            ignore_undefined: true,
        }
    }

    pub fn filter(mut self, filter: impl Into<Predicate>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn ignore_undefined(mut self, ignore: bool) -> Self {
        self.ignore_undefined = ignore;
        self
    }
}

impl ToSql for Update {
    fn to_sql(&self) -> Result<String> {
        let mut sql = format!("UPDATE {}", escape_key(&self.table, KeyOptions::default()));

        let assignments = set(&self.assignments, self.ignore_undefined);
        if !assignments.is_empty() {
            sql.push_str(" SET ");
            sql.push_str(&assignments);
        }

        push_where(&mut sql, self.filter.as_ref().and_then(Predicate::compile));

        tracing::debug!(%sql, "compiled update");
        Ok(sql)
    }
}

/// Compile an UPDATE. Undefined fields are skipped.
pub fn update(
    table: impl Into<Identifier>,
    assignments: &Record,
    filter: Option<&WhereNode>,
) -> Result<String> {
    let mut query = Update::new(table, assignments.clone());
    if let Some(filter) = filter {
        query = query.filter(filter.clone());
    }
    query.to_sql()
}

/// Build a `k = v, ...` assignment list.
///
/// ```
/// use sql_stringify::{set, Record};
///
/// let row = Record::new().field("name", "abc").field("id", 2323).field("at", "NOW()");
/// assert_eq!(set(&row, true), "`name` = 'abc', `id` = 2323, `at` = NOW()");
/// assert_eq!(set(&Record::new(), true), "");
/// ```
pub fn set(assignments: &Record, ignore_undefined: bool) -> String {
    assignments
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Some(value) => escape_value(value, true),
                None if ignore_undefined => return None,
                None => "NULL".to_string(),
            };
            let key = escape_key_text(key, KeyOptions::default().ignore_number());
            Some(format!("{key} = {value}"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}
