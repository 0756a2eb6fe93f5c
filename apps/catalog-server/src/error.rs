//! Server error types.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog_store::CatalogStoreError;
use entities::Violation;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A business rule rejected the request.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// One or more payload fields are invalid.
    #[error("Invalid fields: {}", field_names(.0))]
    InvalidFields(Vec<Violation>),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request names an identifier that cannot be used for the operation.
    #[error("Incorrect id: {0}")]
    IncorrectId(String),

    /// Storage error.
    #[error(transparent)]
    Store(#[from] CatalogStoreError),
}

fn field_names(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.field_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ServerError {
    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_)
            | ServerError::InvalidFields(_)
            | ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::IncorrectId(_) => StatusCode::NOT_FOUND,
            ServerError::Store(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ServerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = match self {
            ServerError::InvalidFields(violations) => json!({ "violations": violations }),
            ServerError::Validation(msg) | ServerError::InvalidRequest(msg) => json!({
                "error": "Validation failed",
                "errorMessage": msg,
            }),
            ServerError::IncorrectId(msg) => json!({
                "error": "Incorrect film or user id",
                "errorMessage": msg,
            }),
            ServerError::Store(e) if e.is_not_found() => json!({
                "error": "Incorrect film or user id",
                "errorMessage": e.to_string(),
            }),
            ServerError::Store(e) => json!({
                "error": "Internal error",
                "errorMessage": e.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<Vec<Violation>> for ServerError {
    fn from(violations: Vec<Violation>) -> Self {
        ServerError::InvalidFields(violations)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServerError::Validation("too early".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(vec![Violation::new("name", "must not be empty")]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::IncorrectId("self".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::from(CatalogStoreError::not_found("Film", 3)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::from(CatalogStoreError::Corrupted("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_fields_message_lists_fields() {
        let err = ServerError::InvalidFields(vec![
            Violation::new("name", "must not be empty"),
            Violation::new("duration", "must be greater than or equal to 0"),
        ]);
        assert_eq!(err.to_string(), "Invalid fields: name, duration");
    }
}
