//! DELETE SQL generation.

use super::{Predicate, ToSql, push_where};
use crate::error::Result;
use crate::filter::WhereNode;
use crate::identifier::{Identifier, KeyOptions, escape_key};

/// A DELETE statement. Without a filter every row is removed.
#[derive(Debug, Clone)]
pub struct Delete {
    pub table: Identifier,
    pub filter: Option<Predicate>,
}

impl Delete {
    pub fn table(table: impl Into<Identifier>) -> Self {
        Self {
            table: table.into(),
            filter: None,
        }
    }

    pub fn filter(mut self, filter: impl Into<Predicate>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

impl ToSql for Delete {
    fn to_sql(&self) -> Result<String> {
        let mut sql = format!("DELETE FROM {}", escape_key(&self.table, KeyOptions::default()));
        push_where(&mut sql, self.filter.as_ref().and_then(Predicate::compile));

        tracing::debug!(%sql, "compiled delete");
        Ok(sql)
    }
}

/// Compile a DELETE.
pub fn remove(table: impl Into<Identifier>, filter: Option<&WhereNode>) -> Result<String> {
    let mut query = Delete::table(table);
    if let Some(filter) = filter {
        query = query.filter(filter.clone());
    }
    query.to_sql()
}
