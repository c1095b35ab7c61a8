//! Statement assembly.
//!
//! Each statement kind lives in its own module and implements [`ToSql`].
//! The free functions ([`select`], [`remove`], [`update`], ...) are thin
//! wrappers for one-off calls.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::column::{ColumnSpec, columns};
use crate::error::{Error, Result};
use crate::filter::{WhereNode, where_clause};
use crate::value::RawSql;

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

pub use delete::{Delete, remove};
pub use insert::{Insert, InsertMany, insert, insert_many, values};
pub use select::{Count, Select, count, select};
pub use update::{Update, set, update};

/// Trait for compiling statements to SQL text.
pub trait ToSql {
    /// Compile this statement.
    fn to_sql(&self) -> Result<String>;
}

/// `ORDER BY` direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDir {
    #[serde(alias = "asc")]
    Asc,
    #[default]
    #[serde(alias = "desc")]
    Desc,
}

impl SortDir {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortDir {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(Error::invalid(format!("unknown sort direction `{s}`")))
        }
    }
}

/// A WHERE predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Written verbatim.
    Raw(String),
    /// Compiled with [`where_clause`].
    Tree(WhereNode),
}

impl Predicate {
    /// The predicate text; `None` or empty means "no WHERE".
    pub fn compile(&self) -> Option<String> {
        match self {
            Self::Raw(sql) => Some(sql.clone()),
            Self::Tree(tree) => where_clause(Some(tree)),
        }
    }
}

impl From<WhereNode> for Predicate {
    fn from(v: WhereNode) -> Self {
        Self::Tree(v)
    }
}

impl From<&str> for Predicate {
    fn from(v: &str) -> Self {
        Self::Raw(v.to_string())
    }
}

impl From<String> for Predicate {
    fn from(v: String) -> Self {
        Self::Raw(v)
    }
}

impl From<RawSql> for Predicate {
    fn from(v: RawSql) -> Self {
        Self::Raw(v.into_inner())
    }
}

/// The column list builder handed to custom projections.
pub type ColumnsFn = fn(&ColumnSpec, Option<&str>) -> Result<String>;

type CustomProjection = Arc<dyn Fn(ColumnsFn) -> Result<String> + Send + Sync>;

/// What a SELECT projects.
#[derive(Clone)]
pub enum Projection {
    Spec(ColumnSpec),
    /// Receives [`columns`] and returns its own fragment, unescaped.
    Custom(CustomProjection),
}

impl Projection {
    /// Wrap a closure as a custom projection.
    ///
    /// ```
    /// use sql_stringify::{ColumnSpec, Projection, Select, ToSql};
    ///
    /// let query = Select::table("t").columns(Projection::custom(|columns| {
    ///     Ok(format!("DISTINCT {}", columns(&ColumnSpec::from("name"), None)?))
    /// }));
    /// assert_eq!(query.to_sql().unwrap(), "SELECT DISTINCT `name` FROM `t`");
    /// ```
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(ColumnsFn) -> Result<String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn render(&self) -> Result<String> {
        match self {
            Self::Spec(spec) => columns(spec, None),
            Self::Custom(f) => f(columns),
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::Spec(ColumnSpec::default())
    }
}

impl fmt::Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spec(spec) => f.debug_tuple("Spec").field(spec).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<ColumnSpec> for Projection {
    fn from(v: ColumnSpec) -> Self {
        Self::Spec(v)
    }
}

impl From<&str> for Projection {
    fn from(v: &str) -> Self {
        Self::Spec(v.into())
    }
}

impl From<String> for Projection {
    fn from(v: String) -> Self {
        Self::Spec(v.into())
    }
}

impl From<Vec<&str>> for Projection {
    fn from(v: Vec<&str>) -> Self {
        Self::Spec(v.into())
    }
}

impl From<bool> for Projection {
    fn from(v: bool) -> Self {
        Self::Spec(v.into())
    }
}

/// Any statement this crate can compile.
#[derive(Debug, Clone)]
pub enum Statement {
    Select(Select),
    Count(Count),
    Delete(Delete),
    Update(Update),
    Insert(Insert),
    InsertMany(InsertMany),
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Self::Select(_) => StatementKind::Select,
            Self::Count(_) => StatementKind::Count,
            Self::Delete(_) => StatementKind::Delete,
            Self::Update(_) => StatementKind::Update,
            Self::Insert(_) => StatementKind::Insert,
            Self::InsertMany(_) => StatementKind::InsertMany,
        }
    }
}

impl ToSql for Statement {
    fn to_sql(&self) -> Result<String> {
        match self {
            Self::Select(s) => s.to_sql(),
            Self::Count(s) => s.to_sql(),
            Self::Delete(s) => s.to_sql(),
            Self::Update(s) => s.to_sql(),
            Self::Insert(s) => s.to_sql(),
            Self::InsertMany(s) => s.to_sql(),
        }
    }
}

impl From<Select> for Statement {
    fn from(v: Select) -> Self {
        Self::Select(v)
    }
}

impl From<Count> for Statement {
    fn from(v: Count) -> Self {
        Self::Count(v)
    }
}

impl From<Delete> for Statement {
    fn from(v: Delete) -> Self {
        Self::Delete(v)
    }
}

impl From<Update> for Statement {
    fn from(v: Update) -> Self {
        Self::Update(v)
    }
}

impl From<Insert> for Statement {
    fn from(v: Insert) -> Self {
        Self::Insert(v)
    }
}

impl From<InsertMany> for Statement {
    fn from(v: InsertMany) -> Self {
        Self::InsertMany(v)
    }
}

/// Statement discriminant, parsed from names like `select` or `insert-many`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Count,
    Delete,
    Update,
    Insert,
    InsertMany,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Count => "count",
            Self::Delete => "delete",
            Self::Update => "update",
            Self::Insert => "insert",
            Self::InsertMany => "insert-many",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "select" | "get" => Self::Select,
            "count" => Self::Count,
            "delete" | "remove" | "del" => Self::Delete,
            "update" | "set" => Self::Update,
            "insert" | "add" => Self::Insert,
            "insert-many" | "insertmany" => Self::InsertMany,
            _ => return Err(Error::invalid(format!("unknown statement kind `{s}`"))),
        };
        Ok(kind)
    }
}

/// Append ` WHERE <predicate>` unless the predicate is absent or empty.
pub(crate) fn push_where(sql: &mut String, predicate: Option<String>) {
    if let Some(predicate) = predicate.filter(|p| !p.trim().is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(&predicate);
    }
}
