// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::database::manager::DatabaseError;
use crate::database::sort::SortError;
use crate::services::ownership::OwnershipError;

/// Field name -> problem, reported with validation failures
pub type FieldErrors = BTreeMap<String, String>;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    IdAlreadyExists { entity: &'static str },
    IdNull { entity: &'static str },
    IdMismatch { entity: &'static str },
    IdNotFound { entity: &'static str },
    ValidationFailed { message: String, field_errors: FieldErrors },
    InvalidJson(String),
    BadRequest(String),

    // 404 Not Found, empty body
    NotFound,

    // 415 Unsupported Media Type
    UnsupportedMediaType(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::IdAlreadyExists { .. }
            | ApiError::IdNull { .. }
            | ApiError::IdMismatch { .. }
            | ApiError::IdNotFound { .. }
            | ApiError::ValidationFailed { .. }
            | ApiError::InvalidJson(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::IdAlreadyExists { entity } => format!("A new {} cannot already have an ID", entity),
            ApiError::IdNull { .. } => "Invalid id".to_string(),
            ApiError::IdMismatch { .. } => "Invalid ID".to_string(),
            ApiError::IdNotFound { .. } => "Entity not found".to_string(),
            ApiError::ValidationFailed { message, .. } => message.clone(),
            ApiError::NotFound => "Not found".to_string(),
            ApiError::InvalidJson(msg)
            | ApiError::BadRequest(msg)
            | ApiError::UnsupportedMediaType(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg.clone(),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::IdAlreadyExists { .. } => "ID_EXISTS",
            ApiError::IdNull { .. } => "ID_NULL",
            ApiError::IdMismatch { .. } => "ID_INVALID",
            ApiError::IdNotFound { .. } => "ID_NOT_FOUND",
            ApiError::ValidationFailed { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    fn entity(&self) -> Option<&'static str> {
        match self {
            ApiError::IdAlreadyExists { entity }
            | ApiError::IdNull { entity }
            | ApiError::IdMismatch { entity }
            | ApiError::IdNotFound { entity } => Some(*entity),
            _ => None,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        if let Some(entity) = self.entity() {
            response["entity"] = json!(entity);
        }
        if let ApiError::ValidationFailed { field_errors, .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_failed(field_errors: FieldErrors) -> Self {
        ApiError::ValidationFailed {
            message: "Validation failed".to_string(),
            field_errors,
        }
    }

    pub fn invalid_field(field: &str, problem: impl Into<String>) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.to_string(), problem.into());
        Self::validation_failed(field_errors)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UnsupportedField { field, .. } => {
                ApiError::bad_request(format!("Unsupported field: {}", field))
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            other => {
                tracing::error!("Storage error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<SortError> for ApiError {
    fn from(err: SortError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<OwnershipError> for ApiError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::UnknownProduct(id) => {
                ApiError::invalid_field("products", format!("Unknown product: {}", id))
            }
            OwnershipError::Database(db) => db.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(r) => ApiError::UnsupportedMediaType(r.body_text()),
            other => ApiError::InvalidJson(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if let ApiError::NotFound = self {
            return status.into_response();
        }
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_errors_are_bad_requests_naming_the_entity() {
        let err = ApiError::IdAlreadyExists { entity: "user" };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "A new user cannot already have an ID");

        let body = ApiError::IdMismatch { entity: "product" }.to_json();
        assert_eq!(body["code"], "ID_INVALID");
        assert_eq!(body["entity"], "product");
    }

    #[test]
    fn validation_errors_carry_fields() {
        let body = ApiError::invalid_field("name", "must not be blank").to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["name"], "must not be blank");
    }

    #[test]
    fn not_found_has_empty_body() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(axum::http::header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn storage_errors_hide_details() {
        let err: ApiError = DatabaseError::ConfigMissing("DATABASE_URL").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("DATABASE_URL"));
    }

    #[test]
    fn query_rejection_is_json_bad_request() {
        use axum::extract::Query;
        use std::collections::HashMap;

        let uri: axum::http::Uri = "/api/users?size=many".parse().unwrap();
        let rejection = Query::<HashMap<String, u32>>::try_from_uri(&uri).unwrap_err();
        let err = ApiError::from(rejection);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_json()["code"], "BAD_REQUEST");
    }

    #[test]
    fn unknown_sort_field_is_bad_request() {
        let err: ApiError = SortError::UnknownField("password".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
