/// HTTP error mapping
/// Every service failure surfaces as 400 with a `{kind, message}` body
use crate::services::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

/// Error payload returned to HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] ServiceError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.0.kind().to_string(),
            message: self.0.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
