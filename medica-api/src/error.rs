use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medica_core::LedgerError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation { .. } => AppError::ValidationError(err.to_string()),
            LedgerError::NotFound(entity) => AppError::NotFoundError(format!("{} not found", entity)),
            LedgerError::Forbidden(msg) => AppError::AuthorizationError(msg),
            LedgerError::Conflict(msg) => AppError::ConflictError(msg),
            LedgerError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_ledger_error_mapping() {
        assert_eq!(
            status_of(LedgerError::validation("amount", "must be positive").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(LedgerError::NotFound("payment").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(LedgerError::Forbidden("nope".into()).into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(LedgerError::Conflict("already settled".into()).into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_internal_error_body_is_generic() {
        let response =
            AppError::InternalServerError("connection pool exhausted".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The cause is logged server-side, never echoed to the caller.
    }
}
