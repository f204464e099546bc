use crate::storage::StorageError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use baladiya_core::{GalleryIndexError, ValidationErrors};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type CmsResult<T> = Result<T, CmsError>;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("forbidden")]
    Forbidden,

    /// The upsert transaction was rolled back.
    #[error("save failed: {0}")]
    SaveFailed(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CmsError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CmsError::NotFound(what.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CmsError::Validation(_) | CmsError::SaveFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CmsError::NotFound(_) => StatusCode::NOT_FOUND,
            CmsError::Forbidden => StatusCode::FORBIDDEN,
            CmsError::Database(_) | CmsError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GalleryIndexError> for CmsError {
    fn from(why: GalleryIndexError) -> Self {
        CmsError::NotFound(why.to_string())
    }
}

impl IntoResponse for CmsError {
    fn into_response(self) -> Response {
        let body = match &self {
            CmsError::Validation(errors) => json!({
                "message": "validation_failed",
                "error": errors.to_string(),
                "errors": errors,
            }),
            CmsError::NotFound(what) => json!({ "message": "not_found", "error": what }),
            CmsError::Forbidden => json!({ "message": "forbidden" }),
            CmsError::SaveFailed(why) => json!({ "message": "save_failed", "error": why }),
            CmsError::Database(why) => {
                error!(error = %why, "database error");
                json!({ "message": "server_error" })
            }
            CmsError::Storage(why) => {
                error!(error = %why, "storage error");
                json!({ "message": "server_error" })
            }
        };

        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(CmsError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(CmsError::not_found("page").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            CmsError::SaveFailed("deadlock".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            CmsError::from(ValidationErrors::single("slug", "bad")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn gallery_index_is_not_found() {
        let err = CmsError::from(GalleryIndexError { index: 5, len: 3 });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("index 5"));
    }
}
