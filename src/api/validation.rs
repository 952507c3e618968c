use std::str::FromStr;

use actix_web::{error::InternalError, HttpResponse};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::db::sql::SqlValue;
use crate::error::ServiceError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

fn bad_request(error: &str, fields: serde_json::Map<String, Value>) -> actix_web::Error {
    InternalError::from_response(
        "",
        HttpResponse::BadRequest().json(ErrorResponse {
            error: error.to_string(),
            fields: Value::Object(fields),
        }),
    )
    .into()
}

fn message_only(message: &str) -> serde_json::Map<String, Value> {
    let mut fields = serde_json::Map::new();
    fields.insert("message".to_string(), serde_json::json!(message));
    fields
}

/// Maps `validator` failures to `{field: {errors: [...]}}`.
fn validation_fields(errors: &validator::ValidationErrors) -> serde_json::Map<String, Value> {
    let mut fields = serde_json::Map::new();
    for (field, errors) in errors.field_errors() {
        let messages: Vec<String> = errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Validation error in field: {}", field))
            })
            .collect();
        fields.insert(field.to_string(), serde_json::json!({ "errors": messages }));
    }
    fields
}

/// Describe a serde failure without echoing the payload back.
fn deserialize_message(err: &str) -> &'static str {
    if err.contains("EOF while parsing") {
        "Request body is empty. Expected JSON payload"
    } else if err.contains("unknown field") {
        "Unrecognized field in request"
    } else if err.contains("missing field") {
        "Required field is missing"
    } else {
        "Invalid JSON format"
    }
}

/// Creates a configured JsonConfig with standardized error handling for the entire project
pub fn json_config() -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default().error_handler(|err, _req| match err {
        actix_web_validator::Error::Validate(errors) => {
            bad_request("Validation failed", validation_fields(&errors))
        }
        actix_web_validator::Error::Deserialize(de_err) => bad_request(
            "Request validation failed",
            message_only(deserialize_message(&de_err.to_string())),
        ),
        _ => bad_request("Validation failed", message_only("Validation error")),
    })
}

/// Same error shape for query strings; unknown keys land here.
pub fn query_config() -> actix_web_validator::QueryConfig {
    actix_web_validator::QueryConfig::default().error_handler(|err, _req| match err {
        actix_web_validator::Error::Validate(errors) => {
            bad_request("Validation failed", validation_fields(&errors))
        }
        actix_web_validator::Error::Deserialize(de_err) => bad_request(
            "Invalid query parameters",
            message_only(&de_err.to_string()),
        ),
        _ => bad_request("Invalid query parameters", message_only("Validation error")),
    })
}

/// For bodies taken as a raw JSON object (sparse updates).
pub fn raw_json_config(limit: usize) -> actix_web::web::JsonConfig {
    actix_web::web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            bad_request(
                "Request validation failed",
                message_only(deserialize_message(&err.to_string())),
            )
        })
}

pub fn equity_in_range(equity: &Decimal) -> bool {
    *equity >= Decimal::ZERO && *equity <= Decimal::ONE
}

/// A string column; `nullable` decides whether `null` clears it.
pub fn parse_text(field: &str, value: &Value, nullable: bool) -> Result<SqlValue, ServiceError> {
    match value {
        Value::Null if nullable => Ok(SqlValue::Text(None)),
        Value::String(s) if !s.is_empty() => Ok(SqlValue::Text(Some(s.clone()))),
        Value::String(_) => Err(ServiceError::invalid(format!("{} must not be empty", field))),
        _ => Err(ServiceError::invalid(format!("{} must be a string", field))),
    }
}

/// A nullable integer column that must be `>= 0`.
pub fn parse_non_negative_int(field: &str, value: &Value) -> Result<SqlValue, ServiceError> {
    if value.is_null() {
        return Ok(SqlValue::Int(None));
    }
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .filter(|n| *n >= 0)
        .map(|n| SqlValue::Int(Some(n)))
        .ok_or_else(|| ServiceError::invalid(format!("{} must be a non-negative integer", field)))
}

/// A nullable decimal in `[0, 1]`, given as a string or a number.
pub fn parse_equity(field: &str, value: &Value) -> Result<SqlValue, ServiceError> {
    let decimal = match value {
        Value::Null => return Ok(SqlValue::Decimal(None)),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };

    match decimal {
        Some(d) if equity_in_range(&d) => Ok(SqlValue::Decimal(Some(d))),
        _ => Err(ServiceError::invalid(format!(
            "{} must be a decimal between 0 and 1",
            field
        ))),
    }
}
