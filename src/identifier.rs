//! Identifier escaping.
//!
//! Table and column references are classified by shape before quoting:
//!
//! | Input | Output |
//! |-------|--------|
//! | `id` | `` `id` `` |
//! | `user.id` | `` `user`.`id` `` |
//! | `*`, `t.*`, `(*)` | `*`, `` `t`.* ``, `(*)` |
//! | `COUNT(*) - 1` | `COUNT(*) - 1` |
//! | `price * 2` | `` `price` * 2 `` |
//! | `(desc)` | ``(`desc`)`` |
//! | `COUNT(*)` | `COUNT(*)` |

use crate::escape::escape_string;
use crate::shape;
use crate::value::{RawSql, SqlText, format_number};

/// A table or column reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    Name(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Raw(RawSql),
    /// Escaped element-wise and joined with `, `; may nest.
    List(Vec<Identifier>),
}

impl Identifier {
    /// Build an identifier from anything with a stable text form.
    pub fn text<T: SqlText + ?Sized>(value: &T) -> Self {
        Self::Name(value.sql_text().into_owned())
    }
}

impl From<&str> for Identifier {
    fn from(v: &str) -> Self {
        Self::Name(v.to_string())
    }
}

impl From<String> for Identifier {
    fn from(v: String) -> Self {
        Self::Name(v)
    }
}

impl From<&String> for Identifier {
    fn from(v: &String) -> Self {
        Self::Name(v.clone())
    }
}

impl From<i32> for Identifier {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Identifier {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Identifier {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Identifier {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<RawSql> for Identifier {
    fn from(v: RawSql) -> Self {
        Self::Raw(v)
    }
}

impl<T: Into<Identifier>> From<Vec<T>> for Identifier {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// Switches for [`escape_key`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOptions {
    /// Quote `a.b` as one name instead of `` `a`.`b` ``.
    pub forbid_qualified: bool,
    /// Write numeric text bare instead of quoting it as a name.
    pub ignore_number: bool,
    /// Skip string escaping and quoting; the text is already a literal.
    pub ignore_string: bool,
}

impl KeyOptions {
    pub fn forbid_qualified(mut self) -> Self {
        self.forbid_qualified = true;
        self
    }

    pub fn ignore_number(mut self) -> Self {
        self.ignore_number = true;
        self
    }

    pub fn ignore_string(mut self) -> Self {
        self.ignore_string = true;
        self
    }
}

/// Backtick-quote a plain name, doubling inner backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a plain name, splitting on dots unless qualification is forbidden.
fn quote_name(name: &str, forbid_qualified: bool) -> String {
    if forbid_qualified {
        return quote_identifier(name);
    }
    name.split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape a table or column reference.
///
/// ```
/// use sql_stringify::{escape_key, Identifier, KeyOptions};
///
/// let opts = KeyOptions::default();
/// assert_eq!(escape_key(&"user.id".into(), opts), "`user`.`id`");
/// assert_eq!(escape_key(&"user.id".into(), opts.forbid_qualified()), "`user.id`");
/// assert_eq!(escape_key(&Identifier::from(vec!["a", "t.c"]), opts), "`a`, `t`.`c`");
/// assert_eq!(escape_key(&42.into(), opts.ignore_number()), "42");
/// ```
pub fn escape_key(value: &Identifier, opts: KeyOptions) -> String {
    match value {
        Identifier::List(items) => items
            .iter()
            .map(|item| escape_key(item, opts))
            .collect::<Vec<_>>()
            .join(", "),
        Identifier::Bool(b) => b.to_string(),
        Identifier::Raw(raw) => raw.as_str().to_string(),
        Identifier::Int(n) if opts.ignore_number => n.to_string(),
        Identifier::Int(n) => escape_key_text(&n.to_string(), opts),
        Identifier::Float(n) => escape_key_text(&format_number(*n), opts),
        Identifier::Name(name) => escape_key_text(name, opts),
    }
}

/// Escape the text form of an identifier.
pub fn escape_key_text(text: &str, opts: KeyOptions) -> String {
    if text == "true" || text == "false" {
        return text.to_string();
    }

    if opts.ignore_number {
        if let Some(digits) = shape::number(text) {
            return digits.to_string();
        }
    }

    if let Some(wildcard) = shape::wildcard(text) {
        tracing::trace!(text, "identifier is a wildcard");
        let star = match wildcard.qualifier {
            Some(q) => format!("{}.*", quote_name(q, opts.forbid_qualified)),
            None => "*".to_string(),
        };
        return if wildcard.parenthesized {
            format!("({star})")
        } else {
            star
        };
    }

    if let Some(chain) = shape::operator_chain(text) {
        tracing::trace!(text, "identifier is an arithmetic expression");
        return escape_chain(&chain, opts);
    }

    if let Some(call) = shape::function_call(text) {
        tracing::trace!(text, "identifier is a function call");
        return if opts.ignore_string {
            call.to_string()
        } else {
            escape_string(call).into_owned()
        };
    }

    if let Some(inner) = shape::parenthesized(text) {
        return format!("({})", escape_key_text(inner, opts));
    }

    if opts.ignore_string {
        return text.to_string();
    }

    quote_name(text, opts.forbid_qualified)
}

/// Escape each operand of an arithmetic chain and rejoin with its operator.
fn escape_chain(chain: &shape::Chain<'_>, opts: KeyOptions) -> String {
    let mut sql = escape_operand(chain.first, opts);
    for (op, operand) in &chain.rest {
        sql.push(' ');
        sql.push(*op);
        sql.push(' ');
        sql.push_str(&escape_operand(operand, opts));
    }
    sql
}

/// Operands keep numerals and quoted words as literals; names are quoted.
fn escape_operand(operand: &str, opts: KeyOptions) -> String {
    let is_literal = operand.len() >= 2
        && (operand.starts_with('\'') && operand.ends_with('\'')
            || operand.starts_with('"') && operand.ends_with('"'));

    let opts = KeyOptions {
        ignore_number: true,
        ignore_string: is_literal,
        ..opts
    };
    escape_key_text(operand, opts)
}
