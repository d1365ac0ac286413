use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ocrlabel_core::LabelError;

use crate::schema::ErrorBody;

/// A [`LabelError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub LabelError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            LabelError::NotFound(_) => StatusCode::NOT_FOUND,
            LabelError::Validation(_) => StatusCode::BAD_REQUEST,
            LabelError::Recognition(_) | LabelError::Storage { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Storage failures do not leak paths or OS errors.
    pub fn detail(&self) -> String {
        match &self.0 {
            LabelError::Storage { .. } => "Failed to access label storage".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<LabelError> for ApiError {
    fn from(err: LabelError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody { detail: self.detail() })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
