//! SQL composition helpers shared by the repositories.
//!
//! Two builders live here: [`compile_partial_update`] turns a sparse,
//! ordered set of client-facing fields into `SET` fragments, and
//! [`FilterClause`] accumulates `WHERE` conditions. Both number their
//! placeholders from `$1` and keep values in placeholder order, so the
//! caller binds `values` front to back.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;

use crate::error::ServiceError;

/// A typed bind value.
///
/// `None` inside a variant is a typed SQL `NULL`, so Postgres sees the
/// column's own type even when the client clears a field.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(Option<i32>),
    Text(Option<String>),
    Decimal(Option<Decimal>),
}

impl SqlValue {
    pub fn bind_to<'q, O>(
        self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        match self {
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Decimal(v) => query.bind(v),
        }
    }
}

/// Client-facing field name to storage column name.
///
/// Fields absent from the table map to a column of the same name.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap(pub &'static [(&'static str, &'static str)]);

impl ColumnMap {
    pub const IDENTITY: ColumnMap = ColumnMap(&[]);

    pub fn resolve<'a>(&self, field: &'a str) -> &'a str {
        match self.0.iter().find(|(from, _)| *from == field) {
            Some((_, column)) => *column,
            None => field,
        }
    }
}

/// `SET` fragments and their bind values, index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUpdate<V> {
    pub set_cols: Vec<String>,
    pub values: Vec<V>,
}

impl<V> CompiledUpdate<V> {
    /// Fragments joined for use after `SET`.
    pub fn set_clause(&self) -> String {
        self.set_cols.join(", ")
    }

    /// First placeholder number free for the caller's `WHERE` clause.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Compile a sparse update into `"column"=$N` fragments.
///
/// Iteration follows `data`'s insertion order, which fixes the placeholder
/// numbering. A `NULL` value is kept as an assignment, not dropped.
pub fn compile_partial_update<V>(
    data: IndexMap<String, V>,
    columns: ColumnMap,
) -> Result<CompiledUpdate<V>, ServiceError> {
    if data.is_empty() {
        return Err(ServiceError::invalid("No data"));
    }

    let mut set_cols = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());

    for (idx, (field, value)) in data.into_iter().enumerate() {
        set_cols.push(format!("\"{}\"=${}", columns.resolve(&field), idx + 1));
        values.push(value);
    }

    Ok(CompiledUpdate { set_cols, values })
}

/// Accumulates `AND`-joined conditions with positional placeholders.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterClause {
    pub conditions: Vec<String>,
    pub values: Vec<SqlValue>,
}

impl FilterClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition binding one value. `{}` in `template` is replaced
    /// by the placeholder.
    pub fn push_bound(&mut self, template: &str, value: SqlValue) {
        self.values.push(value);
        let placeholder = format!("${}", self.values.len());
        self.conditions.push(template.replace("{}", &placeholder));
    }

    /// Add a condition with no bind value.
    pub fn push_literal(&mut self, condition: &str) {
        self.conditions.push(condition.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// `WHERE ...` or an empty string when nothing constrains the query.
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// `%value%` for a case-insensitive substring match.
pub fn contains_pattern(value: &str) -> String {
    format!("%{}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const COMPANY_COLUMNS: ColumnMap =
        ColumnMap(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

    fn ordered(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn translates_columns_and_keeps_input_order() {
        let data = ordered(&[("numEmployees", json!(10)), ("name", json!("X"))]);
        let compiled = compile_partial_update(data, COMPANY_COLUMNS).unwrap();

        assert_eq!(compiled.set_cols, vec![r#""num_employees"=$1"#, r#""name"=$2"#]);
        assert_eq!(compiled.values, vec![json!(10), json!("X")]);
    }

    #[test]
    fn company_example() {
        let data = ordered(&[
            ("name", json!("newCompany")),
            ("numEmployees", json!(10)),
            ("logoUrl", json!("newLogo_url")),
        ]);
        let compiled = compile_partial_update(data, COMPANY_COLUMNS).unwrap();

        assert_eq!(
            compiled.set_clause(),
            r#""name"=$1, "num_employees"=$2, "logo_url"=$3"#
        );
        assert_eq!(compiled.values, vec![json!("newCompany"), json!(10), json!("newLogo_url")]);
        assert_eq!(compiled.next_placeholder(), 4);
    }

    #[test]
    fn user_example_with_unused_table_entries() {
        let columns = ColumnMap(&[
            ("firstName", "first_name"),
            ("lastName", "last_name"),
            ("isAdmin", "is_admin"),
        ]);
        let data = ordered(&[
            ("firstName", json!("testUser")),
            ("email", json!("test@e.com")),
            ("isAdmin", json!(false)),
        ]);
        let compiled = compile_partial_update(data, columns).unwrap();

        assert_eq!(
            compiled.set_clause(),
            r#""first_name"=$1, "email"=$2, "is_admin"=$3"#
        );
        assert_eq!(compiled.values, vec![json!("testUser"), json!("test@e.com"), json!(false)]);
    }

    #[test]
    fn null_values_are_assignments() {
        let data = ordered(&[("title", json!("New")), ("salary", Value::Null), ("equity", Value::Null)]);
        let compiled = compile_partial_update(data, ColumnMap::IDENTITY).unwrap();

        assert_eq!(compiled.set_cols.len(), 3);
        assert_eq!(compiled.values, vec![json!("New"), Value::Null, Value::Null]);
    }

    #[test]
    fn empty_update_is_rejected() {
        let err = compile_partial_update(IndexMap::<String, Value>::new(), ColumnMap::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn empty_translation_still_counts_as_present() {
        let columns = ColumnMap(&[("weird", "")]);
        assert_eq!(columns.resolve("weird"), "");
        assert_eq!(columns.resolve("other"), "other");

        let compiled = compile_partial_update(ordered(&[("weird", json!(1))]), columns).unwrap();
        assert_eq!(compiled.set_cols, vec![r#"""=$1"#]);
    }

    #[test]
    fn fragments_and_values_stay_aligned() {
        let keys = ["a", "b", "c", "d", "e"];
        for n in 1..=keys.len() {
            let data: IndexMap<String, Value> = keys[..n]
                .iter()
                .enumerate()
                .map(|(i, k)| (k.to_string(), json!(i)))
                .collect();
            let compiled = compile_partial_update(data, ColumnMap::IDENTITY).unwrap();

            assert_eq!(compiled.set_cols.len(), n);
            assert_eq!(compiled.values.len(), n);
            for (i, frag) in compiled.set_cols.iter().enumerate() {
                assert_eq!(frag, &format!("\"{}\"=${}", keys[i], i + 1));
                assert_eq!(compiled.values[i], json!(i));
            }
        }
    }

    #[test]
    fn filter_clause_numbers_placeholders_in_push_order() {
        let mut clause = FilterClause::new();
        assert!(clause.is_empty());
        assert_eq!(clause.where_sql(), "");

        clause.push_bound("salary >= {}", SqlValue::Int(Some(100)));
        clause.push_bound("title ILIKE {}", SqlValue::Text(Some(contains_pattern("dev"))));
        clause.push_literal("equity > 0");

        assert_eq!(
            clause.where_sql(),
            "WHERE salary >= $1 AND title ILIKE $2 AND equity > 0"
        );
        assert_eq!(
            clause.values,
            vec![SqlValue::Int(Some(100)), SqlValue::Text(Some("%dev%".to_string()))]
        );
    }
}
