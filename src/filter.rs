//! Where-clause compilation.
//!
//! A where tree is a mapping whose keys are field names or the connectives
//! `$and` / `$or`:
//!
//! | Tree | SQL |
//! |------|-----|
//! | `{name: 'n1'}` | `` `name` = 'n1' `` |
//! | `{name: 'n%'}` | `` `name` LIKE 'n%' `` |
//! | `{name: null}` | `` `name` IS NULL `` |
//! | `{title: ['t1', 't2']}` | `` `title` IN ('t1', 't2') `` |
//! | `{name: {a: 'x'}}` | `` `name`.`a` = 'x' `` |
//! | `{$or: {a: 1, b: 2}}` | `` (`a` = 1 OR `b` = 2) `` |
//! | `{$or: [{a: 1}, {b: 2}]}` | `` (`a` = 1 OR `b` = 2) `` |

use crate::identifier::{KeyOptions, escape_key_text};
use crate::shape;
use crate::value::{RawSql, Scalar, escape_value};

/// A node of a where tree.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereNode {
    /// Compared with `=`, `LIKE` or `IS`.
    Scalar(Scalar),
    /// Compiled to `IN (...)`; nested groups are skipped.
    List(Vec<WhereNode>),
    /// Ordered `key -> node` entries.
    Group(Vec<(String, WhereNode)>),
}

impl WhereNode {
    /// An empty group.
    pub fn new() -> Self {
        Self::Group(Vec::new())
    }

    /// A `NULL` scalar.
    pub fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Add an entry (builder style). A non-group node is replaced by a group.
    pub fn field(self, key: impl Into<String>, value: impl Into<WhereNode>) -> Self {
        let key = key.into();
        let value = value.into();
        let mut entries = match self {
            Self::Group(entries) => entries,
            _ => Vec::new(),
        };
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
        Self::Group(entries)
    }
}

impl Default for WhereNode {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Scalar> for WhereNode {
    fn from(v: Scalar) -> Self {
        Self::Scalar(v)
    }
}

impl From<&str> for WhereNode {
    fn from(v: &str) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<String> for WhereNode {
    fn from(v: String) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<bool> for WhereNode {
    fn from(v: bool) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<i32> for WhereNode {
    fn from(v: i32) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<i64> for WhereNode {
    fn from(v: i64) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<f64> for WhereNode {
    fn from(v: f64) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<RawSql> for WhereNode {
    fn from(v: RawSql) -> Self {
        Self::Scalar(v.into())
    }
}

impl<T: Into<WhereNode>> From<Vec<T>> for WhereNode {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// Boolean joiner for sibling clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    /// Recognize `$and` / `$or`, ignoring case.
    pub fn from_key(key: &str) -> Option<Self> {
        if key.eq_ignore_ascii_case("$and") {
            Some(Self::And)
        } else if key.eq_ignore_ascii_case("$or") {
            Some(Self::Or)
        } else {
            None
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Compile a where tree into a boolean predicate.
///
/// Returns `None` when there is no tree (or it is not a group) and an empty
/// string for an empty group; callers treat both as "no WHERE".
///
/// ```
/// use sql_stringify::{where_clause, WhereNode};
///
/// let tree = WhereNode::new()
///     .field("name", "n1")
///     .field("title", vec!["t1", "t2"])
///     .field("isActive", true);
/// assert_eq!(
///     where_clause(Some(&tree)).unwrap(),
///     "`name` = 'n1' AND `title` IN ('t1', 't2') AND `isActive` = true"
/// );
/// assert_eq!(where_clause(Some(&WhereNode::new())).unwrap(), "");
/// assert_eq!(where_clause(None), None);
/// ```
pub fn where_clause(tree: Option<&WhereNode>) -> Option<String> {
    match tree? {
        WhereNode::Group(entries) => Some(compile_group(None, entries, Connective::And)),
        _ => None,
    }
}

/// Matches no row. Stands in for malformed or empty alternatives.
const NO_MATCH: &str = "1 = 0";

fn compile_group(
    path: Option<&str>,
    entries: &[(String, WhereNode)],
    connective: Connective,
) -> String {
    entries
        .iter()
        .map(|(key, node)| compile_entry(path, key, node))
        .filter(|sql| !sql.is_empty())
        .collect::<Vec<_>>()
        .join(connective.separator())
}

fn compile_entry(path: Option<&str>, key: &str, node: &WhereNode) -> String {
    if let Some(nested) = Connective::from_key(key) {
        return match node {
            WhereNode::Group(entries) => {
                let sql = compile_group(path, entries, nested);
                if sql.is_empty() { sql } else { format!("({sql})") }
            }
            WhereNode::List(items) if path.is_none() => compile_alternatives(items, nested),
            _ => compile_node(path, node),
        };
    }

    let field = match path {
        Some(path) => format!("{path}.{key}"),
        None => key.to_string(),
    };
    compile_node(Some(field.as_str()), node)
}

fn compile_node(path: Option<&str>, node: &WhereNode) -> String {
    match (path, node) {
        (_, WhereNode::Group(entries)) => compile_group(path, entries, Connective::And),
        (Some(field), WhereNode::List(items)) => compile_in(field, items),
        (Some(field), WhereNode::Scalar(value)) => compile_comparison(field, value),
        (None, _) => NO_MATCH.to_string(),
    }
}

/// `$or: [{...}, {...}]` with no field in scope: one group per element.
///
/// Non-group elements are skipped. A list without any group matches nothing.
fn compile_alternatives(items: &[WhereNode], connective: Connective) -> String {
    if !items.iter().any(|item| matches!(item, WhereNode::Group(_))) {
        return NO_MATCH.to_string();
    }

    let mut parts: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            WhereNode::Group(entries) => {
                let sql = compile_group(None, entries, Connective::And);
                match (sql.is_empty(), entries.len() > 1) {
                    (true, _) => None,
                    (false, true) => Some(format!("({sql})")),
                    (false, false) => Some(sql),
                }
            }
            _ => None,
        })
        .collect();

    match parts.len() {
        0 => String::new(),
        1 => parts.remove(0),
        _ => format!("({})", parts.join(connective.separator())),
    }
}

fn collect_values(items: &[WhereNode], out: &mut Vec<String>) {
    for item in items {
        match item {
            WhereNode::Scalar(value) => out.push(escape_value(value, true)),
            WhereNode::List(nested) => collect_values(nested, out),
            WhereNode::Group(_) => {}
        }
    }
}

fn compile_in(field: &str, items: &[WhereNode]) -> String {
    let mut values = Vec::new();
    collect_values(items, &mut values);

    if values.is_empty() {
        return NO_MATCH.to_string();
    }
    format!("{} IN ({})", escape_field(field), values.join(", "))
}

fn compile_comparison(field: &str, value: &Scalar) -> String {
    let op = match value {
        Scalar::Null => "IS",
        Scalar::Text(text) if shape::is_like_pattern(text) => "LIKE",
        _ => "=",
    };
    format!("{} {op} {}", escape_field(field), escape_value(value, true))
}

fn escape_field(field: &str) -> String {
    escape_key_text(field, KeyOptions::default().ignore_number())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compile(tree: WhereNode) -> String {
        where_clause(Some(&tree)).unwrap()
    }

    #[test]
    fn test_scalar_comparisons() {
        assert_eq!(compile(WhereNode::new().field("name", "name1")), "`name` = 'name1'");
        assert_eq!(compile(WhereNode::new().field("id", 222)), "`id` = 222");
        assert_eq!(compile(WhereNode::new().field("at", WhereNode::null())), "`at` IS NULL");
        assert_eq!(
            compile(
                WhereNode::new()
                    .field("name", "name%")
                    .field("desc", "a_c")
                    .field("isActive", true)
            ),
            "`name` LIKE 'name%' AND `desc` LIKE 'a_c' AND `isActive` = true"
        );
    }

    #[test]
    fn test_lists_use_in() {
        assert_eq!(compile(WhereNode::new().field("name", vec!["name1"])), "`name` IN ('name1')");
        assert_eq!(
            compile(WhereNode::new().field("name", vec!["name1"]).field("title", vec!["t"])),
            "`name` IN ('name1') AND `title` IN ('t')"
        );
        assert_eq!(
            compile(WhereNode::new().field("title", vec!["title[a-z]", "title[^0-9]"])),
            "`title` IN ('title[a-z]', 'title[^0-9]')"
        );
    }

    #[test]
    fn test_list_skips_groups_and_flattens() {
        let list = WhereNode::List(vec![
            1.into(),
            WhereNode::new().field("x", 1),
            WhereNode::List(vec![2.into(), 3.into()]),
        ]);
        assert_eq!(compile(WhereNode::new().field("id", list)), "`id` IN (1, 2, 3)");
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let empty: Vec<&str> = Vec::new();
        assert_eq!(compile(WhereNode::new().field("id", empty)), "1 = 0");
    }

    #[test]
    fn test_connectives_under_field() {
        assert_eq!(
            compile(WhereNode::new().field(
                "name",
                WhereNode::new().field("$or", vec!["name3", "name4"])
            )),
            "`name` IN ('name3', 'name4')"
        );
        assert_eq!(
            compile(WhereNode::new().field(
                "name",
                WhereNode::new()
                    .field("$or", vec!["name1", "name2"])
                    .field("$and", vec!["name1", "name2"])
            )),
            "`name` IN ('name1', 'name2') AND `name` IN ('name1', 'name2')"
        );
        assert_eq!(
            compile(
                WhereNode::new()
                    .field("name", WhereNode::new().field("$and", vec!["name1", "name2"]))
                    .field("title", "title1")
            ),
            "`name` IN ('name1', 'name2') AND `title` = 'title1'"
        );
    }

    #[test]
    fn test_root_connectives_are_grouped() {
        assert_eq!(
            compile(WhereNode::new().field(
                "$and",
                WhereNode::new().field("name", "name1").field("title", "title1")
            )),
            "(`name` = 'name1' AND `title` = 'title1')"
        );
        assert_eq!(
            compile(WhereNode::new().field(
                "$or",
                WhereNode::new().field("name", vec!["name1", "name2"]).field("title", "title1")
            )),
            "(`name` IN ('name1', 'name2') OR `title` = 'title1')"
        );
        assert_eq!(
            compile(
                WhereNode::new()
                    .field(
                        "$or",
                        WhereNode::new()
                            .field("name", "name%")
                            .field("title", vec!["title[a-z]", "title[^0-9]"])
                            .field("desc", "a_c")
                    )
                    .field("isActive", true)
            ),
            concat!(
                "(`name` LIKE 'name%' OR `title` IN ('title[a-z]', 'title[^0-9]') ",
                "OR `desc` LIKE 'a_c') AND `isActive` = true"
            )
        );
    }

    #[test]
    fn test_connective_keys_ignore_case() {
        assert_eq!(
            compile(WhereNode::new().field("$OR", WhereNode::new().field("a", 1).field("b", 2))),
            "(`a` = 1 OR `b` = 2)"
        );
    }

    #[test]
    fn test_dotted_fields() {
        let ab = || WhereNode::new().field("a", "sd").field("b", "f");

        assert_eq!(
            compile(WhereNode::new().field("name", WhereNode::new().field("a", "sd"))),
            "`name`.`a` = 'sd'"
        );
        assert_eq!(
            compile(WhereNode::new().field("name", ab())),
            "`name`.`a` = 'sd' AND `name`.`b` = 'f'"
        );
        assert_eq!(
            compile(WhereNode::new().field("name", WhereNode::new().field("$or", ab()))),
            "(`name`.`a` = 'sd' OR `name`.`b` = 'f')"
        );
        assert_eq!(
            compile(WhereNode::new().field(
                "name",
                WhereNode::new().field("$or", ab()).field("d", "as")
            )),
            "(`name`.`a` = 'sd' OR `name`.`b` = 'f') AND `name`.`d` = 'as'"
        );
        assert_eq!(
            compile(WhereNode::new().field("name", WhereNode::new().field("$and", ab()))),
            "(`name`.`a` = 'sd' AND `name`.`b` = 'f')"
        );
        assert_eq!(
            compile(WhereNode::new().field("$and", WhereNode::new().field("name", ab()))),
            "(`name`.`a` = 'sd' AND `name`.`b` = 'f')"
        );
        assert_eq!(
            compile(WhereNode::new().field("$or", WhereNode::new().field("name", ab()))),
            "(`name`.`a` = 'sd' AND `name`.`b` = 'f')"
        );
    }

    #[test]
    fn test_nested_connectives_keep_precedence() {
        let tree = WhereNode::new().field(
            "$and",
            WhereNode::new()
                .field("$or", WhereNode::new().field("a", 1).field("b", 2))
                .field("c", 3),
        );
        assert_eq!(compile(tree), "((`a` = 1 OR `b` = 2) AND `c` = 3)");
    }

    #[test]
    fn test_alternatives_list() {
        let tree = WhereNode::new()
            .field(
                "$or",
                vec![
                    WhereNode::new().field("role", "admin"),
                    WhereNode::new().field("role", "owner").field("active", true),
                ],
            )
            .field("deleted", false);
        assert_eq!(
            compile(tree),
            "(`role` = 'admin' OR (`role` = 'owner' AND `active` = true)) AND `deleted` = false"
        );

        let single = WhereNode::new().field("$or", vec![WhereNode::new().field("a", 1)]);
        assert_eq!(compile(single), "`a` = 1");
    }

    #[test]
    fn test_empty_and_absent() {
        assert_eq!(compile(WhereNode::new()), "");
        assert_eq!(compile(WhereNode::new().field("$or", WhereNode::new())), "");
        assert_eq!(where_clause(None), None);
        assert_eq!(where_clause(Some(&"x".into())), None);
    }

    #[test]
    fn test_malformed_root_connectives_match_nothing() {
        let empty: Vec<WhereNode> = Vec::new();
        assert_eq!(compile(WhereNode::new().field("$or", vec![1, 2])), "1 = 0");
        assert_eq!(compile(WhereNode::new().field("$or", "x")), "1 = 0");
        assert_eq!(compile(WhereNode::new().field("$and", empty)), "1 = 0");
        assert_eq!(
            compile(WhereNode::new().field("$or", vec![1, 2]).field("id", 3)),
            "1 = 0 AND `id` = 3"
        );
    }

    #[test]
    fn test_alternatives_skip_scalars() {
        let tree = WhereNode::new().field(
            "$or",
            WhereNode::List(vec![1.into(), WhereNode::new().field("a", 1)]),
        );
        assert_eq!(compile(tree), "`a` = 1");
    }

    #[test]
    fn test_values_are_escaped() {
        assert_eq!(
            compile(WhereNode::new().field("name", "x' OR '1'='1")),
            "`name` = 'x\\' OR \\'1\\'=\\'1'"
        );
    }
}
