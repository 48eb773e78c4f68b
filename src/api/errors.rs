use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Request-level error taxonomy, mapped onto the status codes the original
/// API contract promises.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input → 400.
    #[error("{0}")]
    Validation(String),

    /// Missing or wrong admin token → 401.
    #[error("Invalid credentials")]
    Unauthorized,

    /// No matching document → 404.
    #[error("{0}")]
    NotFound(String),

    /// Unique-key collision → 409.
    #[error("{0}")]
    Conflict(String),

    /// Prediction service unreachable or misconfigured → 500.
    #[error("Failed to generate predictions")]
    Upstream(anyhow::Error),

    /// Persistence failure → 500. Logged; internals never reach the client.
    #[error("Internal server error")]
    Store(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store(e) => error!(error = %e, "Store error"),
            ApiError::Upstream(e) => error!(error = %e, "Prediction upstream error"),
            _ => {}
        }
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Postgres unique-violation (SQLSTATE 23505). Used to turn a duplicate
/// `sensor_id` insert into a 409 while leaving the registry untouched.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_the_contract() {
        assert_eq!(
            ApiError::Validation("missing field".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::NotFound("no device".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("duplicate".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Upstream(anyhow::anyhow!("down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Store(sqlx::Error::PoolClosed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_error_body_does_not_leak_internals() {
        // The Display impl is the response body; it must stay generic.
        let e = ApiError::Store(sqlx::Error::PoolClosed);
        assert_eq!(e.to_string(), "Internal server error");
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
