//! # sql-stringify
//!
//! > **Say what you want. Get escaped SQL back.**
//!
//! Compiles loosely-shaped query intent (column strings, Mongo-style where
//! trees, plain records) into backtick-dialect SQL text. Nothing here talks
//! to a database; every call is a pure string transformation.
//!
//! ## Quick Example
//!
//! ```rust
//! use sql_stringify::prelude::*;
//!
//! let query = Select::table("users")
//!     .columns("id, name AS n, COUNT(*) total")
//!     .filter(
//!         WhereNode::new()
//!             .field("$or", WhereNode::new().field("name", "ann%").field("role", vec!["a", "b"]))
//!             .field("active", true),
//!     )
//!     .order_by("id")
//!     .limit(10);
//!
//! assert_eq!(
//!     query.to_sql()?,
//!     "SELECT `id`, `name` AS `n`, COUNT(*) AS `total` FROM `users` \
//!      WHERE (`name` LIKE 'ann%' OR `role` IN ('a', 'b')) AND `active` = true \
//!      ORDER BY `id` DESC LIMIT 10"
//! );
//! # Ok::<(), sql_stringify::Error>(())
//! ```
//!
//! ## Escaping
//!
//! | Position   | Input          | Output            |
//! |------------|----------------|-------------------|
//! | identifier | `user.id`      | `` `user`.`id` `` |
//! | identifier | `COUNT(*) - 1` | `COUNT(*) - 1`    |
//! | value      | `O'Brien`      | `'O\'Brien'`      |
//! | value      | `NOW()`        | `NOW()`           |
//! | value      | `null`         | `NULL`            |

pub mod column;
pub mod config;
pub mod error;
pub mod escape;
pub mod filter;
pub mod identifier;
pub mod json;
pub mod shape;
pub mod statement;
pub mod value;

pub use column::{ColumnSpec, alias, columns, escape_column};
pub use config::Config;
pub use error::{Error, Result};
pub use escape::escape_string;
pub use filter::{Connective, WhereNode, where_clause};
pub use identifier::{Identifier, KeyOptions, escape_key, escape_key_text, quote_identifier};
pub use statement::{
    Count, Delete, Insert, InsertMany, Predicate, Projection, Select, SortDir, Statement,
    StatementKind, ToSql, count, insert, insert_many, remove, select, set, update, values,
};
pub use value::{Literal, RawSql, Record, Scalar, SqlText, escape_value, no_quote_sql};

pub mod prelude {
    pub use crate::column::ColumnSpec;
    pub use crate::error::*;
    pub use crate::filter::WhereNode;
    pub use crate::identifier::{Identifier, KeyOptions};
    pub use crate::statement::*;
    pub use crate::value::{RawSql, Record, Scalar, no_quote_sql};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prelude_round_trip() {
        let sql = Statement::from(
            Update::new("users", Record::new().field("seen_at", "NOW()"))
                .filter(WhereNode::new().field("id", 7)),
        )
        .to_sql()
        .unwrap();
        assert_eq!(sql, "UPDATE `users` SET `seen_at` = NOW() WHERE `id` = 7");
    }
}
