use crate::auth::Principal;
use crate::error::CmsResult;
use crate::news::{self, NewsImageView, NewsText, NewsView};
use crate::routes::json_body;
use crate::upload::MultipartForm;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn index(State(state): State<Arc<AppState>>) -> CmsResult<Json<Vec<NewsView>>> {
    Ok(Json(news::list(&state).await?))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> CmsResult<Json<NewsView>> {
    Ok(Json(news::get(&state, id).await?))
}

pub async fn store(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    multipart: Multipart,
) -> CmsResult<(StatusCode, Json<Value>)> {
    principal.require_admin()?;
    let form = MultipartForm::read(multipart).await?;
    let created = news::create(&state, principal, &form).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "News created successfully", "data": created })),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    payload: Result<Json<NewsText>, JsonRejection>,
) -> CmsResult<Json<Value>> {
    principal.require_admin()?;
    let text = json_body(payload)?;
    let updated = news::update(&state, principal, id, text).await?;
    Ok(Json(json!({ "message": "News updated successfully", "data": updated })))
}

/// Multipart variant of [`update`], as sent by `POST /news/{id}?_method=PUT`.
/// Files in the form are ignored.
pub async fn update_form(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> CmsResult<Json<Value>> {
    principal.require_admin()?;
    let form = MultipartForm::read(multipart).await?;
    let updated = news::update(&state, principal, id, NewsText::from_form(&form)).await?;
    Ok(Json(json!({ "message": "News updated successfully", "data": updated })))
}

pub async fn destroy(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> CmsResult<Json<Value>> {
    news::delete(&state, principal, id).await?;
    Ok(Json(json!({ "message": "News deleted successfully" })))
}

pub async fn add_images(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> CmsResult<(StatusCode, Json<Value>)> {
    principal.require_admin()?;
    let form = MultipartForm::read(multipart).await?;
    let images: Vec<NewsImageView> = news::add_images(&state, principal, id, &form).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Images uploaded", "images": images })),
    ))
}

pub async fn destroy_image(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> CmsResult<Json<Value>> {
    let news_id = news::delete_image(&state, principal, id).await?;
    Ok(Json(json!({ "message": "Extra image deleted successfully", "news_id": news_id })))
}
