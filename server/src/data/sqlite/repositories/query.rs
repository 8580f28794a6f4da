//! Filtered entity selection
//!
//! Turns a `CompiledQuery` into the final SELECT for one entity table and
//! binds its operands in placeholder order.

use sqlx::query::QueryAs;
use sqlx::sqlite::{Sqlite, SqliteArguments};

use crate::data::types::{CompiledQuery, FilterValue};

/// Most ids bound into one `IN (...)` list; keeps every statement well
/// under SQLite's bound parameter limit
pub const ID_BATCH: usize = 500;

/// `?,?,...` for `count` parameters
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

/// Build `SELECT e.* FROM <table> e WHERE 1=1 AND e.deleted_at IS NULL <fragments>`
///
/// Rows come back in id order unless a fragment orders them; the default
/// ORDER BY is placed before any LIMIT/OFFSET fragment.
pub fn select_sql(table: &str, compiled: &CompiledQuery) -> String {
    let mut sql = format!("SELECT e.* FROM {} e WHERE 1=1 AND e.deleted_at IS NULL", table);
    let has_order = compiled
        .fragments
        .iter()
        .any(|f| f.starts_with(" ORDER BY"));
    let mut ordered = has_order;

    for fragment in &compiled.fragments {
        if !ordered && (fragment.starts_with(" LIMIT") || fragment.starts_with(" OFFSET")) {
            sql.push_str(" ORDER BY e.id ASC");
            ordered = true;
        }
        sql.push_str(fragment);
    }
    if !ordered {
        sql.push_str(" ORDER BY e.id ASC");
    }
    sql
}

/// Bind compiled operands onto a prepared query
pub fn bind_operands<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    operands: &[FilterValue],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for operand in operands {
        query = match operand {
            FilterValue::Text(v) => query.bind(v.clone()),
            FilterValue::Integer(v) => query.bind(*v),
            FilterValue::Boolean(v) => query.bind(*v),
        };
    }
    query
}
