use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::api::validation::{equity_in_range, parse_equity, parse_non_negative_int, parse_text};
use crate::db::sql::{contains_pattern, ColumnMap, FilterClause, SqlValue};
use crate::error::ServiceError;

/// Job fields all map to columns of the same name.
pub const JOB_COLUMNS: ColumnMap = ColumnMap::IDENTITY;

fn validate_equity(equity: &Decimal) -> Result<(), ValidationError> {
    if equity_in_range(equity) {
        Ok(())
    } else {
        let mut err = ValidationError::new("equity_range");
        err.message = Some("Equity must be between 0 and 1".into());
        Err(err)
    }
}

/// Job model for creating and validating jobs
#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(range(min = 0, message = "Salary must be a non-negative integer"))]
    pub salary: i32,
    #[validate(custom(function = "validate_equity"))]
    pub equity: Decimal,
    #[validate(length(
        min = 1,
        max = 25,
        message = "Company handle must be between 1 and 25 characters"
    ))]
    pub company_handle: String,
}

/// Sparse set of job fields to change, in the order the client sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct JobUpdate {
    fields: IndexMap<String, SqlValue>,
}

impl JobUpdate {
    pub fn into_fields(self) -> IndexMap<String, SqlValue> {
        self.fields
    }
}

impl TryFrom<Map<String, Value>> for JobUpdate {
    type Error = ServiceError;

    /// Checks every key and value before anything reaches storage.
    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        if body.is_empty() {
            return Err(ServiceError::invalid("No data"));
        }

        let mut fields = IndexMap::with_capacity(body.len());
        for (key, value) in body {
            let parsed = match key.as_str() {
                "title" => parse_text("title", &value, false)?,
                "salary" => parse_non_negative_int("salary", &value)?,
                "equity" => parse_equity("equity", &value)?,
                "companyHandle" => {
                    return Err(ServiceError::invalid("companyHandle cannot be changed"));
                }
                other => {
                    return Err(ServiceError::invalid(format!("Unrecognized field: {}", other)));
                }
            };
            fields.insert(key, parsed);
        }

        Ok(Self { fields })
    }
}

/// Query-string filters accepted by `GET /jobs`.
#[derive(Deserialize, Debug, Default, Clone, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    #[validate(range(min = 0, message = "minSalary must be a non-negative integer"))]
    pub min_salary: Option<i32>,
    pub title_like: Option<String>,
    pub has_equity: Option<bool>,
}

impl JobFilter {
    /// Build the `WHERE` conditions.
    ///
    /// Conditions always come out as salary, title, equity regardless of
    /// how the filter was written, so placeholder numbers are stable.
    pub fn compose(&self) -> Result<FilterClause, ServiceError> {
        let mut clause = FilterClause::new();

        if let Some(min_salary) = self.min_salary {
            if min_salary < 0 {
                return Err(ServiceError::invalid("minSalary must be a non-negative integer"));
            }
            clause.push_bound("salary >= {}", SqlValue::Int(Some(min_salary)));
        }

        if let Some(title) = &self.title_like {
            clause.push_bound("title ILIKE {}", SqlValue::Text(Some(contains_pattern(title))));
        }

        if self.has_equity == Some(true) {
            clause.push_literal("equity > 0");
        }

        Ok(clause)
    }
}
