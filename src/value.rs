//! Literal values and the value escaper.

use std::borrow::Cow;
use std::fmt;

use crate::escape::escape_string;
use crate::shape;

/// Pre-built SQL that must not be escaped.
///
/// The caller asserts the wrapped text is already safe. It is emitted
/// verbatim wherever it appears, in value and identifier positions alike.
///
/// ```
/// use sql_stringify::{escape_value, no_quote_sql, Scalar};
///
/// let sub = no_quote_sql("(SELECT MAX(id) FROM users)");
/// assert_eq!(escape_value(&Scalar::Raw(sub), true), "(SELECT MAX(id) FROM users)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawSql(String);

impl RawSql {
    /// Wrap a SQL fragment.
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    /// The wrapped SQL.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned SQL string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RawSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wrap `sql` so it passes through every escaper untouched.
pub fn no_quote_sql(sql: impl Into<String>) -> RawSql {
    RawSql::new(sql)
}

/// A value with a stable text form.
///
/// Anything implementing this can be turned into an identifier with
/// [`Identifier::text`](crate::Identifier::text).
pub trait SqlText {
    /// The text form of the value.
    fn sql_text(&self) -> Cow<'_, str>;
}

impl SqlText for str {
    fn sql_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl SqlText for String {
    fn sql_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl SqlText for RawSql {
    fn sql_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.0)
    }
}

impl SqlText for bool {
    fn sql_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(if *self { "true" } else { "false" })
    }
}

impl SqlText for i64 {
    fn sql_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl SqlText for f64 {
    fn sql_text(&self) -> Cow<'_, str> {
        Cow::Owned(format_number(*self))
    }
}

impl SqlText for Scalar {
    fn sql_text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed("null"),
            Self::Bool(b) => b.sql_text(),
            Self::Int(n) => n.sql_text(),
            Self::Float(n) => n.sql_text(),
            Self::Text(s) => Cow::Borrowed(s),
            Self::Raw(raw) => raw.sql_text(),
        }
    }
}

/// Render a float the way it reads in SQL: integral values without `.0`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// A scalar destined for a SQL value position.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Raw(RawSql),
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<RawSql> for Scalar {
    fn from(v: RawSql) -> Self {
        Self::Raw(v)
    }
}

/// How a scalar is written in a value position.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal<'a> {
    Bool(bool),
    Null,
    Integer(i64),
    /// Numeric text, written without quotes.
    Number(Cow<'a, str>),
    /// `name(...)`, written as-is.
    Function(&'a str),
    /// Caller-supplied SQL, written as-is.
    Raw(&'a str),
    /// Everything else; quoted and escaped.
    Text(Cow<'a, str>),
}

impl<'a> Literal<'a> {
    /// Classify a scalar. The first matching kind wins: boolean, null,
    /// number, function call, then quoted text.
    pub fn classify(value: &'a Scalar, allow_null: bool) -> Self {
        match value {
            Scalar::Bool(b) => Self::Bool(*b),
            Scalar::Null if allow_null => Self::Null,
            Scalar::Null => Self::Text(Cow::Borrowed("null")),
            Scalar::Int(n) => Self::Integer(*n),
            Scalar::Float(n) if n.is_finite() => Self::Number(Cow::Owned(format_number(*n))),
            Scalar::Float(n) => Self::Text(Cow::Owned(n.to_string())),
            Scalar::Text(s) => Self::classify_text(s),
            Scalar::Raw(raw) => Self::Raw(raw.as_str()),
        }
    }

    /// Classify free text by its shape.
    pub fn classify_text(text: &'a str) -> Self {
        match text {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }

        if let Some(digits) = shape::number(text) {
            return Self::Number(Cow::Borrowed(digits));
        }

        if let Some(call) = shape::function_call(text) {
            return Self::Function(call);
        }

        Self::Text(Cow::Borrowed(text))
    }
}

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("NULL"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Number(digits) => f.write_str(digits),
            Self::Function(sql) | Self::Raw(sql) => f.write_str(sql),
            Self::Text(s) => write!(f, "'{}'", escape_string(s)),
        }
    }
}

/// Escape a scalar for a SQL value position.
///
/// When `allow_null` is false a null is written as the text `'null'`.
///
/// ```
/// use sql_stringify::{escape_value, Scalar};
///
/// assert_eq!(escape_value(&Scalar::Null, true), "NULL");
/// assert_eq!(escape_value(&"NOW()".into(), true), "NOW()");
/// assert_eq!(escape_value(&"42".into(), true), "42");
/// assert_eq!(escape_value(&"O'Brien".into(), true), "'O\\'Brien'");
/// ```
pub fn escape_value(value: &Scalar, allow_null: bool) -> String {
    Literal::classify(value, allow_null).to_string()
}

/// Insertion-ordered `key -> value` mapping for SET and VALUES lists.
///
/// A `None` value is an undefined field: it is skipped when undefined
/// fields are ignored and written as `NULL` otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Option<Scalar>)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder style).
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }

    /// Add an undefined field (builder style).
    pub fn undefined(mut self, key: impl Into<String>) -> Self {
        self.insert(key, None);
        self
    }

    /// Set a field. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<Scalar>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a field. `Some(None)` means present but undefined.
    pub fn get(&self, key: &str) -> Option<Option<&Scalar>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_ref())
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Scalar>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Keys whose value is defined, in insertion order.
    pub fn defined_keys(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, v)| v.is_some()).map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Scalar>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, Some(v.into()));
        }
        record
    }
}
