use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::QueryRejection;
use log::{error, warn};
use roster_core::{RepoError, SortParseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    InvalidSort(#[from] SortParseError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Repo(RepoError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Repo(RepoError::NonUniqueResult { .. }) => (StatusCode::CONFLICT, "non_unique"),
            Self::Repo(RepoError::ConstraintViolation(_)) => (StatusCode::CONFLICT, "conflict"),
            Self::Repo(RepoError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            Self::InvalidSort(_) | Self::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            Self::Repo(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = if status.is_server_error() {
            error!("event=http_error module=api status=error code={code} error={self}");
            "internal server error".to_string()
        } else {
            warn!("event=http_error module=api status=rejected code={code} error={self}");
            self.to_string()
        };
        json_error(status, code, message)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.to_string())
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: code,
            message: message.into(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use roster_core::{EntityRef, RepoError, SortParseError};

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::from(RepoError::NotFound(EntityRef::Member(1))).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn ambiguous_result_maps_to_409() {
        let err = ApiError::from(RepoError::NonUniqueResult {
            expected: 1,
            actual: 2,
        });
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn bad_sort_maps_to_400() {
        let err = ApiError::from(SortParseError::UnknownProperty("email".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_failures_map_to_500() {
        let err = ApiError::from(RepoError::InvalidData("bad row".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
