use crate::error::{CmsError, CmsResult};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use baladiya_core::ValidationErrors;
use std::sync::Arc;

pub mod assets;
pub mod news;
pub mod pages;

/// Everything lives under `/api`, where the frontend expects it.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/pages", get(pages::index).post(pages::create))
        .route(
            "/pages/:slug",
            get(pages::show).post(pages::upsert).put(pages::update),
        )
        .route("/pages/:slug/gallery", post(pages::add_gallery_image))
        .route("/pages/:slug/gallery/:index", delete(pages::delete_gallery_image))
        .route("/pages-asset", post(assets::upload))
        .route("/news", get(news::index).post(news::store))
        .route(
            "/news/:id",
            get(news::show)
                .put(news::update)
                .post(news::update_form)
                .delete(news::destroy),
        )
        .route("/news/:id/images", post(news::add_images))
        .route("/news-images/:id", delete(news::destroy_image));

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(state.config.body_limit()))
        .with_state(state)
}

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> CmsResult<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(CmsError::Validation(ValidationErrors::single(
            "body",
            rejection.body_text(),
        ))),
    }
}
