use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Request-level error taxonomy. Every failure a handler can produce maps to
/// exactly one variant, and every variant maps to one HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Unavailable(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Duplicates are reported as 400, not 409.
            ApiError::InvalidInput(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Unavailable(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ApiError {
    /// Maps a store unique-violation to `Conflict`; anything else stays
    /// `Internal`. Create paths race their own existence prechecks (two
    /// concurrent inserts both pass the lookup), so the constraint error is
    /// the authoritative duplicate signal.
    pub fn conflict_on_unique(e: anyhow::Error, message: &str) -> ApiError {
        if let Some(sqlx::Error::Database(db_err)) = e.downcast_ref::<sqlx::Error>() {
            if db_err.is_unique_violation() {
                return ApiError::Conflict(message.into());
            }
        }
        ApiError::Internal(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::InvalidInput("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Unauthenticated("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Unavailable("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn conflict_on_unique_passes_through_other_errors() {
        let err = ApiError::conflict_on_unique(anyhow::anyhow!("boom"), "duplicate");
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let row_not_found: anyhow::Error = sqlx::Error::RowNotFound.into();
        let err = ApiError::conflict_on_unique(row_not_found, "duplicate");
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn message_passthrough() {
        let err = ApiError::NotFound("Profile not found".into());
        assert_eq!(err.to_string(), "Profile not found");
    }
}
