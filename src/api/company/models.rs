use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::api::validation::{parse_non_negative_int, parse_text};
use crate::db::sql::{contains_pattern, ColumnMap, FilterClause, SqlValue};
use crate::error::ServiceError;

pub const COMPANY_COLUMNS: ColumnMap =
    ColumnMap(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

fn validate_handle(handle: &str) -> Result<(), ValidationError> {
    let ok = handle
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("handle_format");
        err.message = Some("Handle may only contain lowercase letters, digits, '-' and '_'".into());
        Err(err)
    }
}

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    #[validate(
        length(min = 1, max = 25, message = "Handle must be between 1 and 25 characters"),
        custom(function = "validate_handle")
    )]
    pub handle: String,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0, message = "numEmployees must be a non-negative integer"))]
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Sparse set of company fields to change, in client order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyUpdate {
    fields: IndexMap<String, SqlValue>,
}

impl CompanyUpdate {
    pub fn into_fields(self) -> IndexMap<String, SqlValue> {
        self.fields
    }
}

impl TryFrom<Map<String, Value>> for CompanyUpdate {
    type Error = ServiceError;

    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        if body.is_empty() {
            return Err(ServiceError::invalid("No data"));
        }

        let mut fields = IndexMap::with_capacity(body.len());
        for (key, value) in body {
            let parsed = match key.as_str() {
                "name" => parse_text("name", &value, false)?,
                "description" => match &value {
                    // description may be blank, never null
                    Value::String(s) => SqlValue::Text(Some(s.clone())),
                    _ => return Err(ServiceError::invalid("description must be a string")),
                },
                "numEmployees" => parse_non_negative_int("numEmployees", &value)?,
                "logoUrl" => parse_text("logoUrl", &value, true)?,
                "handle" => return Err(ServiceError::invalid("handle cannot be changed")),
                other => {
                    return Err(ServiceError::invalid(format!("Unrecognized field: {}", other)));
                }
            };
            fields.insert(key, parsed);
        }

        Ok(Self { fields })
    }
}

/// Query-string filters accepted by `GET /companies`.
#[derive(Deserialize, Debug, Default, Clone, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub name: Option<String>,
    #[validate(range(min = 0, message = "minEmployees must be a non-negative integer"))]
    pub min_employees: Option<i32>,
    #[validate(range(min = 0, message = "maxEmployees must be a non-negative integer"))]
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    /// Conditions come out as name, min, max.
    pub fn compose(&self) -> Result<FilterClause, ServiceError> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(ServiceError::invalid(
                    "minEmployees cannot be greater than maxEmployees",
                ));
            }
        }
        if self.min_employees.is_some_and(|n| n < 0) || self.max_employees.is_some_and(|n| n < 0) {
            return Err(ServiceError::invalid("Employee bounds must be non-negative"));
        }

        let mut clause = FilterClause::new();
        if let Some(name) = &self.name {
            clause.push_bound("name ILIKE {}", SqlValue::Text(Some(contains_pattern(name))));
        }
        if let Some(min) = self.min_employees {
            clause.push_bound("num_employees >= {}", SqlValue::Int(Some(min)));
        }
        if let Some(max) = self.max_employees {
            clause.push_bound("num_employees <= {}", SqlValue::Int(Some(max)));
        }
        Ok(clause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sql::compile_partial_update;
    use actix_web::web::Query;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn update_translates_columns() {
        let update = CompanyUpdate::try_from(body(json!({
            "name": "newCompany", "numEmployees": 10, "logoUrl": null
        })))
        .unwrap();
        let compiled = compile_partial_update(update.into_fields(), COMPANY_COLUMNS).unwrap();

        assert_eq!(
            compiled.set_clause(),
            r#""name"=$1, "num_employees"=$2, "logo_url"=$3"#
        );
        assert_eq!(
            compiled.values,
            vec![
                SqlValue::Text(Some("newCompany".to_string())),
                SqlValue::Int(Some(10)),
                SqlValue::Text(None),
            ]
        );
    }

    #[test]
    fn update_rejects_handle_and_unknown_keys() {
        for case in [json!({}), json!({ "handle": "c2" }), json!({ "ceo": "x" }), json!({ "name": null })] {
            let err = CompanyUpdate::try_from(body(case.clone())).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "case {case}");
        }
    }

    #[test]
    fn new_company_handle_format() {
        let ok: NewCompany = serde_json::from_value(json!({
            "handle": "new-co", "name": "New", "description": "d"
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let bad: NewCompany = serde_json::from_value(json!({
            "handle": "New Co", "name": "New", "description": "d"
        }))
        .unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn filter_composes_in_fixed_order() {
        let filter =
            Query::<CompanyFilter>::from_query("maxEmployees=10&name=net&minEmployees=2").unwrap();
        let clause = filter.compose().unwrap();

        assert_eq!(
            clause.where_sql(),
            "WHERE name ILIKE $1 AND num_employees >= $2 AND num_employees <= $3"
        );
        assert_eq!(
            clause.values,
            vec![
                SqlValue::Text(Some("%net%".to_string())),
                SqlValue::Int(Some(2)),
                SqlValue::Int(Some(10)),
            ]
        );
    }

    #[test]
    fn filter_rejects_inverted_bounds_and_unknown_keys() {
        let inverted = CompanyFilter {
            min_employees: Some(10),
            max_employees: Some(2),
            ..Default::default()
        };
        assert!(matches!(inverted.compose(), Err(ServiceError::InvalidInput(_))));
        assert!(Query::<CompanyFilter>::from_query("name=a&nope=b").is_err());
    }
}
