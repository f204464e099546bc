use crate::auth::Principal;
use crate::error::CmsResult;
use crate::storage::Prefix;
use crate::upload::{required_image, MultipartForm};
use crate::AppState;
use axum::extract::{Multipart, State};
use axum::Json;
use baladiya_core::validate::BLOCK_IMAGE;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredAsset {
    pub path: String,
    pub url: String,
}

/// Block imagery. Only the relative `path` belongs in a block, `url` is for
/// the editor preview.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    multipart: Multipart,
) -> CmsResult<Json<StoredAsset>> {
    principal.require_admin()?;
    let form = MultipartForm::read(multipart).await?;
    let file = required_image(&form, "file", BLOCK_IMAGE)?;

    let path = state
        .blobs
        .put(Prefix::PageBlocks, &file.file_name, file.data.clone())
        .await?;
    info!(path = %path, "page asset uploaded");

    Ok(Json(StoredAsset {
        url: state.media.resolve(&path),
        path,
    }))
}
