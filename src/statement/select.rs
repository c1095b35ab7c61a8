//! SELECT and COUNT generation.

use super::{Predicate, Projection, SortDir, ToSql, push_where};
use crate::column::ColumnSpec;
use crate::error::{Error, Result};
use crate::filter::WhereNode;
use crate::identifier::{Identifier, KeyOptions, escape_key};
use crate::value::{RawSql, Scalar};

/// A SELECT query.
#[derive(Debug, Clone, Default)]
pub struct Select {
    pub columns: Projection,
    pub from: Option<Identifier>,
    pub filter: Option<Predicate>,
    pub order_by: Option<Identifier>,
    pub order: SortDir,
    pub limit: Option<u64>,
    /// Only used together with `limit`.
    pub skip: Option<u64>,
}

impl Select {
    /// Start a `SELECT * FROM table`.
    pub fn table(table: impl Into<Identifier>) -> Self {
        Self {
            from: Some(table.into()),
            ..Self::default()
        }
    }

    pub fn columns(mut self, columns: impl Into<Projection>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn filter(mut self, filter: impl Into<Predicate>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn order_by(mut self, field: impl Into<Identifier>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    pub fn order(mut self, order: SortDir) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }
}

fn is_blank(table: &Identifier) -> bool {
    match table {
        Identifier::Name(name) => name.trim().is_empty(),
        Identifier::List(items) => items.is_empty(),
        _ => false,
    }
}

impl ToSql for Select {
    fn to_sql(&self) -> Result<String> {
        let table = match &self.from {
            Some(table) if !is_blank(table) => table,
            _ => {
                tracing::warn!("select without a table");
                return Err(Error::MissingTable);
            }
        };

        let mut sql = format!(
            "SELECT {} FROM {}",
            self.columns.render()?,
            escape_key(table, KeyOptions::default())
        );

        push_where(&mut sql, self.filter.as_ref().and_then(Predicate::compile));

        if let Some(field) = &self.order_by {
            sql.push_str(&format!(
                " ORDER BY {} {}",
                escape_key(field, KeyOptions::default()),
                self.order
            ));
        }

        match (self.limit, self.skip) {
            (Some(limit), Some(skip)) => sql.push_str(&format!(" LIMIT {skip}, {limit}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            _ => {}
        }

        tracing::debug!(%sql, "compiled select");
        Ok(sql)
    }
}

/// Compile a SELECT.
pub fn select(query: &Select) -> Result<String> {
    query.to_sql()
}

/// `SELECT COUNT(expr) AS alias FROM table [WHERE ...]`.
#[derive(Debug, Clone)]
pub struct Count {
    pub table: Identifier,
    pub filter: Option<Predicate>,
    /// Defaults to `*`.
    pub expr: Identifier,
    /// Defaults to `count`.
    pub alias: Identifier,
}

impl Count {
    pub fn table(table: impl Into<Identifier>) -> Self {
        Self {
            table: table.into(),
            filter: None,
            expr: "*".into(),
            alias: "count".into(),
        }
    }

    pub fn filter(mut self, filter: impl Into<Predicate>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn expr(mut self, expr: impl Into<Identifier>) -> Self {
        self.expr = expr.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<Identifier>) -> Self {
        self.alias = alias.into();
        self
    }

    fn projection(&self) -> String {
        format!(
            "COUNT({}) AS {}",
            escape_key(&self.expr, KeyOptions::default().ignore_number()),
            escape_key(&self.alias, KeyOptions::default())
        )
    }
}

impl ToSql for Count {
    fn to_sql(&self) -> Result<String> {
        let select = Select {
            columns: ColumnSpec::Literal(Scalar::Raw(RawSql::new(self.projection()))).into(),
            from: Some(self.table.clone()),
            filter: self.filter.clone(),
            ..Select::default()
        };
        select.to_sql()
    }
}

/// Compile a COUNT query; `expr` and `alias` fall back to `*` and `count`.
///
/// ```
/// use sql_stringify::{count, WhereNode};
///
/// let filter = WhereNode::new().field("name", "egh");
/// assert_eq!(
///     count("abc", Some(&filter), None, None).unwrap(),
///     "SELECT COUNT(*) AS `count` FROM `abc` WHERE `name` = 'egh'"
/// );
/// assert_eq!(
///     count("abc", Some(&filter), Some(1.into()), Some("total".into())).unwrap(),
///     "SELECT COUNT(1) AS `total` FROM `abc` WHERE `name` = 'egh'"
/// );
/// ```
pub fn count(
    table: impl Into<Identifier>,
    filter: Option<&WhereNode>,
    expr: Option<Identifier>,
    alias: Option<Identifier>,
) -> Result<String> {
    let mut query = Count::table(table);
    if let Some(filter) = filter {
        query = query.filter(filter.clone());
    }
    if let Some(expr) = expr {
        query = query.expr(expr);
    }
    if let Some(alias) = alias {
        query = query.alias(alias);
    }
    query.to_sql()
}
