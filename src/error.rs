use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::{error, warn};

use crate::api::validation::ErrorResponse;

/// Service-level errors
///
/// Every operation on jobs and companies fails with one of these. Raw
/// `sqlx` errors are translated at the service boundary; anything left
/// over ends up in `Database` and is never shown to the client.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed, empty, unknown or immutable input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No row matches the identifier or handle
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or insufficient credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Machine-checkable kind, mirrored in the JSON body.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidInput(_) => "invalid_input",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Unauthorized(_) => "unauthorized",
            ServiceError::Database(_) => "database",
        }
    }

    /// Translate constraint violations into domain errors.
    ///
    /// Foreign-key failures mean the referenced parent is missing, so they
    /// surface as `NotFound` carrying `missing`. Unique and check violations
    /// are the client's fault.
    pub fn from_constraint(err: sqlx::Error, missing: impl Into<String>) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_foreign_key_violation() {
                return Self::NotFound(missing.into());
            }
            if db_err.is_unique_violation() {
                return Self::InvalidInput(format!("Duplicate value: {}", db_err.message()));
            }
            if db_err.is_check_violation() {
                return Self::InvalidInput(format!("Value out of range: {}", db_err.message()));
            }
        }
        Self::Database(err)
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (summary, message) = match self {
            ServiceError::Database(e) => {
                error!("Database error: {}", e);
                ("Failed to process request", "Database error occurred".to_string())
            }
            ServiceError::InvalidInput(msg) => {
                warn!("Invalid input: {}", msg);
                ("Validation failed", msg.clone())
            }
            ServiceError::NotFound(msg) => {
                warn!("Not found: {}", msg);
                ("Not found", msg.clone())
            }
            ServiceError::Unauthorized(msg) => {
                warn!("Unauthorized: {}", msg);
                ("Unauthorized", msg.clone())
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: summary.to_string(),
            fields: serde_json::json!({ "kind": self.kind(), "message": message }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(ServiceError::invalid("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ServiceError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_constraint_errors_stay_database_errors() {
        let err = ServiceError::from_constraint(sqlx::Error::PoolTimedOut, "No company: c1");
        assert!(matches!(err, ServiceError::Database(_)));
        assert_eq!(err.kind(), "database");
    }

    #[actix_web::test]
    async fn error_body_carries_kind_and_message() {
        let resp = ServiceError::not_found("No job: 7").error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Not found");
        assert_eq!(json["fields"]["kind"], "not_found");
        assert_eq!(json["fields"]["message"], "No job: 7");
    }
}
