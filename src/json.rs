//! JSON front-end.
//!
//! Converts `serde_json::Value` input into the typed model. Object key order
//! is preserved, so records and where trees keep the caller's field order.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::column::ColumnSpec;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::WhereNode;
use crate::identifier::Identifier;
use crate::statement::{
    Count, Delete, Insert, InsertMany, Predicate, Select, SortDir, Statement, StatementKind, Update,
};
use crate::value::{Record, Scalar};

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn number(n: &serde_json::Number) -> Scalar {
    match n.as_i64() {
        Some(i) => Scalar::Int(i),
        None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

impl TryFrom<&Value> for Scalar {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            Value::Number(n) => Ok(number(n)),
            Value::String(s) => Ok(Scalar::Text(s.clone())),
            other => Err(Error::invalid(format!(
                "expected a scalar, found {}",
                type_name(other)
            ))),
        }
    }
}

fn record_from_map(map: &Map<String, Value>) -> Result<Record> {
    let mut record = Record::new();
    for (key, value) in map {
        let value = Scalar::try_from(value)
            .map_err(|_| Error::invalid(format!("field `{key}` must be a scalar")))?;
        record.insert(key.clone(), Some(value));
    }
    Ok(record)
}

impl TryFrom<&Value> for Record {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => record_from_map(map),
            other => Err(Error::invalid(format!(
                "expected an object, found {}",
                type_name(other)
            ))),
        }
    }
}

/// Rows for a multi-row insert: an array of objects or a single object.
pub fn records(value: &Value) -> Result<Vec<Record>> {
    match value {
        Value::Array(items) => items.iter().map(Record::try_from).collect(),
        other => Ok(vec![Record::try_from(other)?]),
    }
}

impl TryFrom<&Value> for Identifier {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Identifier::Name(s.clone())),
            Value::Bool(b) => Ok(Identifier::Bool(*b)),
            Value::Number(n) => Ok(match n.as_i64() {
                Some(i) => Identifier::Int(i),
                None => Identifier::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::Array(items) => items
                .iter()
                .map(Identifier::try_from)
                .collect::<Result<Vec<_>>>()
                .map(Identifier::List),
            other => Err(Error::invalid(format!(
                "expected an identifier, found {}",
                type_name(other)
            ))),
        }
    }
}

impl TryFrom<&Value> for ColumnSpec {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(ColumnSpec::default()),
            Value::String(s) => Ok(ColumnSpec::Text(s.clone())),
            Value::Object(map) => record_from_map(map).map(ColumnSpec::Record),
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
                items
                    .iter()
                    .map(Record::try_from)
                    .collect::<Result<Vec<_>>>()
                    .map(ColumnSpec::Records)
            }
            Value::Array(items) => items
                .iter()
                .map(ColumnSpec::try_from)
                .collect::<Result<Vec<_>>>()
                .map(ColumnSpec::List),
            scalar => Scalar::try_from(scalar).map(ColumnSpec::Literal),
        }
    }
}

impl TryFrom<&Value> for WhereNode {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| WhereNode::try_from(value).map(|node| (key.clone(), node)))
                .collect::<Result<Vec<_>>>()
                .map(WhereNode::Group),
            Value::Array(items) => items
                .iter()
                .map(WhereNode::try_from)
                .collect::<Result<Vec<_>>>()
                .map(WhereNode::List),
            scalar => Scalar::try_from(scalar).map(WhereNode::Scalar),
        }
    }
}

/// A `where` member: strings are raw SQL, objects are where trees.
fn predicate(value: &Value) -> Result<Option<Predicate>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(Predicate::Raw(s.clone()))),
        other => WhereNode::try_from(other).map(|tree| Some(Predicate::Tree(tree))),
    }
}

fn optional<'a, T>(
    value: Option<&'a Value>,
    f: impl FnOnce(&'a Value) -> Result<T>,
) -> Result<Option<T>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => f(v).map(Some),
    }
}

fn required_table(value: Option<&Value>, kind: StatementKind) -> Result<Identifier> {
    optional(value, Identifier::try_from)?
        .ok_or_else(|| Error::invalid(format!("{kind} requires a `table`")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectRequest {
    columns: Option<Value>,
    from: Option<Value>,
    #[serde(rename = "where")]
    filter: Option<Value>,
    #[serde(alias = "order_by")]
    order_by: Option<Value>,
    order: Option<SortDir>,
    limit: Option<u64>,
    skip: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountRequest {
    #[serde(alias = "from")]
    table: Option<Value>,
    #[serde(rename = "where")]
    filter: Option<Value>,
    expr: Option<Value>,
    alias: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteRequest {
    #[serde(alias = "from")]
    table: Option<Value>,
    #[serde(rename = "where")]
    filter: Option<Value>,
    #[serde(alias = "values", alias = "row", alias = "rows")]
    set: Option<Value>,
    #[serde(alias = "ignore_undefined")]
    ignore_undefined: Option<bool>,
}

impl Statement {
    /// Build a statement from a JSON request using default settings.
    ///
    /// ```
    /// use serde_json::json;
    /// use sql_stringify::{Statement, StatementKind, ToSql};
    ///
    /// let request = json!({
    ///     "from": "test",
    ///     "columns": ["name AS abc"],
    ///     "where": {"isPublic": true},
    ///     "orderBy": "name",
    ///     "order": "ASC",
    ///     "limit": 20,
    ///     "skip": 10
    /// });
    /// let stmt = Statement::from_json(StatementKind::Select, &request).unwrap();
    /// assert_eq!(
    ///     stmt.to_sql().unwrap(),
    ///     concat!(
    ///         "SELECT `name` AS `abc` FROM `test` WHERE `isPublic` = true ",
    ///         "ORDER BY `name` ASC LIMIT 10, 20"
    ///     )
    /// );
    /// ```
    pub fn from_json(kind: StatementKind, value: &Value) -> Result<Self> {
        Self::from_json_with(kind, value, &Config::default())
    }

    /// Build a statement from a JSON request; absent options fall back to `config`.
    pub fn from_json_with(kind: StatementKind, value: &Value, config: &Config) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::invalid(format!(
                "{kind} request must be an object, found {}",
                type_name(value)
            )));
        }

        let stmt = match kind {
            StatementKind::Select => {
                let req = SelectRequest::deserialize(value)?;
                Statement::Select(Select {
                    columns: optional(req.columns.as_ref(), ColumnSpec::try_from)?
                        .unwrap_or_default()
                        .into(),
                    from: optional(req.from.as_ref(), Identifier::try_from)?,
                    filter: optional(req.filter.as_ref(), predicate)?.flatten(),
                    order_by: optional(req.order_by.as_ref(), Identifier::try_from)?,
                    order: req.order.unwrap_or(config.order),
                    limit: req.limit,
                    skip: req.skip,
                })
            }
            StatementKind::Count => {
                let req = CountRequest::deserialize(value)?;
                Statement::Count(Count {
                    table: required_table(req.table.as_ref(), kind)?,
                    filter: optional(req.filter.as_ref(), predicate)?.flatten(),
                    expr: optional(req.expr.as_ref(), Identifier::try_from)?
                        .unwrap_or_else(|| config.count_expr.as_str().into()),
                    alias: optional(req.alias.as_ref(), Identifier::try_from)?
                        .unwrap_or_else(|| config.count_alias.as_str().into()),
                })
            }
            StatementKind::Delete => {
                let req = WriteRequest::deserialize(value)?;
                Statement::Delete(Delete {
                    table: required_table(req.table.as_ref(), kind)?,
                    filter: optional(req.filter.as_ref(), predicate)?.flatten(),
                })
            }
            StatementKind::Update => {
                let req = WriteRequest::deserialize(value)?;
                Statement::Update(Update {
                    table: required_table(req.table.as_ref(), kind)?,
                    assignments: optional(req.set.as_ref(), Record::try_from)?.unwrap_or_default(),
                    filter: optional(req.filter.as_ref(), predicate)?.flatten(),
                    ignore_undefined: req.ignore_undefined.unwrap_or(config.ignore_undefined),
                })
            }
            StatementKind::Insert => {
                let req = WriteRequest::deserialize(value)?;
                Statement::Insert(Insert {
                    table: required_table(req.table.as_ref(), kind)?,
                    row: optional(req.set.as_ref(), Record::try_from)?.unwrap_or_default(),
                    ignore_undefined: req.ignore_undefined.unwrap_or(config.ignore_undefined),
                })
            }
            StatementKind::InsertMany => {
                let req = WriteRequest::deserialize(value)?;
                Statement::InsertMany(InsertMany {
                    table: required_table(req.table.as_ref(), kind)?,
                    rows: optional(req.set.as_ref(), records)?.unwrap_or_default(),
                    ignore_undefined: req.ignore_undefined.unwrap_or(config.ignore_undefined),
                })
            }
        };

        tracing::debug!(%kind, "parsed json request");
        Ok(stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToSql;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compile(kind: StatementKind, value: Value) -> String {
        Statement::from_json(kind, &value).unwrap().to_sql().unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(Scalar::try_from(&json!(null)).unwrap(), Scalar::Null);
        assert_eq!(Scalar::try_from(&json!(12)).unwrap(), Scalar::Int(12));
        assert_eq!(Scalar::try_from(&json!(1.5)).unwrap(), Scalar::Float(1.5));
        assert_eq!(Scalar::try_from(&json!("x")).unwrap(), Scalar::Text("x".into()));
        assert!(Scalar::try_from(&json!([1])).is_err());
    }

    #[test]
    fn test_record_keeps_order() {
        let record = Record::try_from(&json!({"z": 1, "a": 2, "m": 3})).unwrap();
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert!(Record::try_from(&json!({"a": {"b": 1}})).is_err());
    }

    #[test]
    fn test_column_specs() {
        assert_eq!(
            ColumnSpec::try_from(&json!([{"a": 1}, {"b": 2}])).unwrap(),
            ColumnSpec::Records(vec![
                Record::new().field("a", 1),
                Record::new().field("b", 2)
            ])
        );
        let mixed = ColumnSpec::try_from(&json!([{"a": 1}, "b"])).unwrap();
        assert_eq!(crate::columns(&mixed, None).unwrap(), "`a`");
        assert_eq!(
            ColumnSpec::try_from(&json!(["*", "a"])).unwrap(),
            ColumnSpec::from(vec!["*", "a"])
        );
        assert_eq!(
            ColumnSpec::try_from(&json!(true)).unwrap(),
            ColumnSpec::Literal(Scalar::Bool(true))
        );
    }

    #[test]
    fn test_where_tree() {
        let tree =
            WhereNode::try_from(&json!({"$or": {"name": ["a", "b"], "title": "t"}})).unwrap();
        assert_eq!(
            crate::where_clause(Some(&tree)).unwrap(),
            "(`name` IN ('a', 'b') OR `title` = 't')"
        );
    }

    #[test]
    fn test_select_request() {
        assert_eq!(
            compile(
                StatementKind::Select,
                json!({"from": "test", "where": {}, "columns": "COUNT(*) AS count"})
            ),
            "SELECT COUNT(*) AS `count` FROM `test`"
        );
        assert_eq!(
            compile(StatementKind::Select, json!({"from": "test", "columns": true})),
            "SELECT true FROM `test`"
        );
        assert_eq!(
            compile(
                StatementKind::Select,
                json!({"from": "t", "where": "id > 1", "order_by": "id"})
            ),
            "SELECT * FROM `t` WHERE id > 1 ORDER BY `id` DESC"
        );
    }

    #[test]
    fn test_select_request_without_table() {
        let stmt =
            Statement::from_json(StatementKind::Select, &json!({"columns": "1 AS all"})).unwrap();
        assert!(matches!(stmt.to_sql(), Err(Error::MissingTable)));
    }

    #[test]
    fn test_write_requests() {
        assert_eq!(
            compile(
                StatementKind::Update,
                json!({"table": "abc", "set": {"id": 555}, "where": {"name": 12}})
            ),
            "UPDATE `abc` SET `id` = 555 WHERE `name` = 12"
        );
        assert_eq!(
            compile(
                StatementKind::Insert,
                json!({"table": "abc", "values": {"id": 555, "at": "NOW()"}})
            ),
            "INSERT INTO `abc` SET `id` = 555, `at` = NOW()"
        );
        assert_eq!(
            compile(
                StatementKind::InsertMany,
                json!({"table": "abc", "rows": [{"id": 1, "n": "a"}, {"id": 2, "n": "b"}]})
            ),
            "INSERT INTO `abc` (`id`, `n`) VALUES (1, 'a'), (2, 'b')"
        );
        assert_eq!(
            compile(StatementKind::Delete, json!({"table": "abc", "where": {"id": 222}})),
            "DELETE FROM `abc` WHERE `id` = 222"
        );
        assert_eq!(
            compile(StatementKind::Count, json!({"table": "abc", "expr": 1, "alias": "total"})),
            "SELECT COUNT(1) AS `total` FROM `abc`"
        );
    }

    #[test]
    fn test_config_defaults_apply() {
        let config = Config::builder().order(SortDir::Asc).count_alias("n").build();
        let select = Statement::from_json_with(
            StatementKind::Select,
            &json!({"from": "t", "orderBy": "id"}),
            &config,
        )
        .unwrap();
        assert_eq!(select.to_sql().unwrap(), "SELECT * FROM `t` ORDER BY `id` ASC");

        let count =
            Statement::from_json_with(StatementKind::Count, &json!({"table": "t"}), &config)
                .unwrap();
        assert_eq!(count.to_sql().unwrap(), "SELECT COUNT(*) AS `n` FROM `t`");
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(Statement::from_json(StatementKind::Delete, &json!([1])).is_err());
        assert!(Statement::from_json(StatementKind::Delete, &json!({})).is_err());
        let negative = json!({"from": "t", "limit": -1});
        assert!(Statement::from_json(StatementKind::Select, &negative).is_err());
        assert!(matches!(
            Statement::from_json(StatementKind::Insert, &json!({"table": "t", "set": {}}))
                .and_then(|stmt| stmt.to_sql()),
            Err(Error::InvalidInput(_))
        ));
    }
}
