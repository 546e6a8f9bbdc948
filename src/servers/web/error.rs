//! JSON API errors. Every failure renders as `{"error": "<message>"}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::LoginError;
use crate::database::{Collection, DraftError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing required fields")]
    MissingFields(Vec<&'static str>),
    #[error("Fields too long")]
    FieldsTooLong(Vec<&'static str>),
    #[error("Invalid query string")]
    BadQuery(#[from] QueryRejection),
    #[error("Invalid request body")]
    BadBody(#[from] JsonRejection),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{} not found", .0.title())]
    NotFound(Collection),
    #[error("Too many attempts")]
    TooManyAttempts,
    /// Message is safe to show; the cause has already been logged.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Missing rows become 404; anything else is logged and reported as
    /// `Failed to {action}`.
    pub fn store(action: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(collection) => ApiError::NotFound(collection),
            StoreError::Database(e) => {
                tracing::error!("[api] [db_error] action={} err={}", action, e);
                ApiError::Internal(format!("Failed to {action}"))
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_)
            | ApiError::FieldsTooLong(_)
            | ApiError::BadBody(_)
            | ApiError::BadQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DraftError> for ApiError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::Missing(fields) => ApiError::MissingFields(fields),
            DraftError::TooLong(fields) => ApiError::FieldsTooLong(fields),
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidCredentials => ApiError::InvalidCredentials,
            LoginError::LockedOut => ApiError::TooManyAttempts,
            LoginError::Session(e) => {
                tracing::error!("[api] [session_error] {}", e);
                ApiError::Internal("Failed to create session".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::MissingFields(fields) | ApiError::FieldsTooLong(fields) => {
                json!({ "error": self.to_string(), "fields": fields })
            }
            ApiError::BadBody(rejection) => {
                tracing::debug!("[api] [bad_body] {}", rejection.body_text());
                json!({ "error": self.to_string() })
            }
            ApiError::BadQuery(rejection) => {
                tracing::debug!("[api] [bad_query] {}", rejection.body_text());
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TooManyAttempts.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ApiError::from(DraftError::Missing(vec!["price"])).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_errors() {
        let err = ApiError::store("fetch package", StoreError::NotFound(Collection::Packages));
        assert_eq!(err.to_string(), "Package not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::store("delete destination", StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.to_string(), "Failed to delete destination");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
