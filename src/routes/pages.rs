use crate::auth::Principal;
use crate::error::CmsResult;
use crate::pages::legacy::{self, NewPage, PagePatch};
use crate::pages::read::{self, PageSummary};
use crate::pages::{upsert as engine, GalleryView, PageView};
use crate::routes::json_body;
use crate::upload::MultipartForm;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use baladiya_core::PageSubmission;
use std::sync::Arc;

pub async fn index(State(state): State<Arc<AppState>>) -> CmsResult<Json<Vec<PageSummary>>> {
    Ok(Json(read::list_summaries(&state.database).await?))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> CmsResult<Json<PageView>> {
    Ok(Json(
        read::get_by_slug(&state.database, &state.media, &slug).await?,
    ))
}

pub async fn upsert(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(slug): Path<String>,
    payload: Result<Json<PageSubmission>, JsonRejection>,
) -> CmsResult<Json<PageView>> {
    principal.require_admin()?;
    let submission = json_body(payload)?;
    Ok(Json(engine::upsert(&state, principal, &slug, submission).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    payload: Result<Json<NewPage>, JsonRejection>,
) -> CmsResult<(StatusCode, Json<PageView>)> {
    principal.require_admin()?;
    let new = json_body(payload)?;
    let page = legacy::create_page(&state, principal, new).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(slug): Path<String>,
    payload: Result<Json<PagePatch>, JsonRejection>,
) -> CmsResult<Json<PageView>> {
    principal.require_admin()?;
    let patch = json_body(payload)?;
    Ok(Json(legacy::update_page(&state, principal, &slug, patch).await?))
}

pub async fn add_gallery_image(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> CmsResult<Json<GalleryView>> {
    principal.require_admin()?;
    let form = MultipartForm::read(multipart).await?;
    Ok(Json(
        legacy::add_gallery_image(&state, principal, &slug, &form).await?,
    ))
}

pub async fn delete_gallery_image(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path((slug, index)): Path<(String, usize)>,
) -> CmsResult<Json<GalleryView>> {
    Ok(Json(
        legacy::delete_gallery_image(&state, principal, &slug, index).await?,
    ))
}
