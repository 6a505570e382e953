use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level error type. Every handler returns `Result<_, ApiError>`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input; nothing was mutated.
    #[error("{0}")]
    Validation(String),

    /// A uniqueness constraint was broken (duplicate username/email).
    #[error("{0}")]
    Conflict(String),

    /// The requested record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The authenticated user does not own the record.
    #[error("{0}")]
    Forbidden(String),

    /// Missing or invalid credentials/token.
    #[error("{0}")]
    Unauthorized(String),

    /// Anything unexpected; details are logged, never sent to the client.
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // `Internal` displays as a fixed message, so causes never leak out.
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound("record not found".into()),
            sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation => {
                let message = match db.constraint() {
                    Some(c) if c.contains("username") => "username is already taken",
                    Some(c) if c.contains("email") => "email is already registered",
                    _ => "record already exists",
                };
                Self::Conflict(message.into())
            }
            _ => Self::Internal(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_variants() {
        let cases = [
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::Conflict("dup".into()), StatusCode::CONFLICT),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (ApiError::Forbidden("nope".into()), StatusCode::FORBIDDEN),
            (
                ApiError::Unauthorized("who".into()),
                StatusCode::UNAUTHORIZED,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn internal_hides_the_cause() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(err.to_string(), "internal error");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
