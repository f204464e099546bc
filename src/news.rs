use crate::auth::Principal;
use crate::error::{CmsError, CmsResult};
use crate::models::{news, news_images};
use crate::storage::{discard, Prefix};
use crate::upload::{MultipartForm, Upload};
use crate::AppState;
use baladiya_core::validate::{max_chars, required, BLOCK_IMAGE, MAX_STRING_CHARS, NEWS_IMAGE};
use baladiya_core::{MediaResolver, ValidationErrors};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewsImageView {
    pub id: i32,
    pub news_id: i32,
    pub image: String,
    pub url: String,
    pub created_at: DateTimeWithTimeZone,
}

impl NewsImageView {
    pub fn new(image: news_images::Model, media: &MediaResolver) -> Self {
        NewsImageView {
            id: image.id,
            news_id: image.news_id,
            url: media.resolve(&image.image),
            image: image.image,
            created_at: image.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewsView {
    pub id: i32,
    pub title_fr: String,
    pub title_ar: String,
    pub content_fr: String,
    pub content_ar: String,
    pub image: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub images: Vec<NewsImageView>,
}

impl NewsView {
    pub fn new(item: news::Model, images: Vec<news_images::Model>, media: &MediaResolver) -> Self {
        NewsView {
            id: item.id,
            image_url: media.resolve_opt(item.image.as_deref()),
            title_fr: item.title_fr,
            title_ar: item.title_ar,
            content_fr: item.content_fr,
            content_ar: item.content_ar,
            image: item.image,
            created_at: item.created_at,
            updated_at: item.updated_at,
            images: images
                .into_iter()
                .map(|image| NewsImageView::new(image, media))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NewsText {
    pub title_fr: Option<String>,
    pub title_ar: Option<String>,
    pub content_fr: Option<String>,
    pub content_ar: Option<String>,
}

impl NewsText {
    pub fn from_form(form: &MultipartForm) -> Self {
        let text = |name: &str| form.text(name).map(str::to_string);
        NewsText {
            title_fr: text("title_fr"),
            title_ar: text("title_ar"),
            content_fr: text("content_fr"),
            content_ar: text("content_ar"),
        }
    }

    fn check(&self, errors: &mut ValidationErrors) {
        required(errors, "title_fr", self.title_fr.as_deref());
        required(errors, "title_ar", self.title_ar.as_deref());
        required(errors, "content_fr", self.content_fr.as_deref());
        required(errors, "content_ar", self.content_ar.as_deref());
        max_chars(errors, "title_fr", self.title_fr.as_deref(), MAX_STRING_CHARS);
        max_chars(errors, "title_ar", self.title_ar.as_deref(), MAX_STRING_CHARS);
    }
}

async fn images_of<C>(db: &C, news_id: i32) -> CmsResult<Vec<news_images::Model>>
where
    C: ConnectionTrait,
{
    Ok(news_images::Entity::find()
        .filter(news_images::Column::NewsId.eq(news_id))
        .order_by_asc(news_images::Column::Id)
        .all(db)
        .await?)
}

async fn find_news(state: &AppState, id: i32) -> CmsResult<news::Model> {
    news::Entity::find_by_id(id)
        .one(&state.database)
        .await?
        .ok_or_else(|| CmsError::not_found(format!("news {id} does not exist")))
}

async fn store_all(state: &AppState, uploads: &[&Upload]) -> CmsResult<Vec<String>> {
    let mut paths = Vec::with_capacity(uploads.len());
    for upload in uploads {
        match state
            .blobs
            .put(Prefix::News, &upload.file_name, upload.data.clone())
            .await
        {
            Ok(path) => paths.push(path),
            Err(why) => {
                discard_all(state, &paths).await;
                return Err(why.into());
            }
        }
    }
    Ok(paths)
}

async fn discard_all(state: &AppState, paths: &[String]) {
    for path in paths {
        discard(state.blobs.as_ref(), path).await;
    }
}

/// Newest first, each with its images.
pub async fn list(state: &AppState) -> CmsResult<Vec<NewsView>> {
    let items = news::Entity::find()
        .order_by_desc(news::Column::CreatedAt)
        .order_by_desc(news::Column::Id)
        .all(&state.database)
        .await?;
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = items.iter().map(|n| n.id).collect();
    let mut images: BTreeMap<i32, Vec<news_images::Model>> = BTreeMap::new();
    for image in news_images::Entity::find()
        .filter(news_images::Column::NewsId.is_in(ids))
        .order_by_asc(news_images::Column::Id)
        .all(&state.database)
        .await?
    {
        images.entry(image.news_id).or_default().push(image);
    }

    Ok(items
        .into_iter()
        .map(|item| {
            let own = images.remove(&item.id).unwrap_or_default();
            NewsView::new(item, own, &state.media)
        })
        .collect())
}

pub async fn get(state: &AppState, id: i32) -> CmsResult<NewsView> {
    let item = find_news(state, id).await?;
    let images = images_of(&state.database, id).await?;
    Ok(NewsView::new(item, images, &state.media))
}

/// Multipart: four text fields, an optional `image` and any number of
/// `extra_images[]`.
#[instrument(skip(state, form))]
pub async fn create(state: &AppState, principal: Principal, form: &MultipartForm) -> CmsResult<NewsView> {
    principal.require_admin()?;

    let text = NewsText::from_form(form);
    let mut errors = ValidationErrors::new();
    text.check(&mut errors);
    let main = form.file("image");
    if let Some(upload) = main {
        upload.check(&mut errors, "image", NEWS_IMAGE);
    }
    let extras: Vec<&Upload> = form.files("extra_images").collect();
    for (idx, upload) in extras.iter().enumerate() {
        upload.check(&mut errors, &format!("extra_images.{idx}"), NEWS_IMAGE);
    }
    errors.into_result()?;

    let main_path = match main {
        Some(upload) => store_all(state, &[upload]).await?.pop(),
        None => None,
    };
    let extra_paths = match store_all(state, &extras).await {
        Ok(paths) => paths,
        Err(why) => {
            discard_all(state, main_path.as_slice()).await;
            return Err(why);
        }
    };

    let saved = insert_news(state, text, main_path.clone(), &extra_paths).await;
    match saved {
        Ok((item, images)) => {
            info!(id = item.id, images = images.len(), "news created");
            Ok(NewsView::new(item, images, &state.media))
        }
        Err(why) => {
            discard_all(state, main_path.as_slice()).await;
            discard_all(state, &extra_paths).await;
            Err(why)
        }
    }
}

async fn insert_news(
    state: &AppState,
    text: NewsText,
    image: Option<String>,
    extra_paths: &[String],
) -> CmsResult<(news::Model, Vec<news_images::Model>)> {
    let txn = state.database.begin().await?;
    let now: DateTimeWithTimeZone = Utc::now().into();

    let item = news::ActiveModel {
        title_fr: Set(text.title_fr.unwrap_or_default()),
        title_ar: Set(text.title_ar.unwrap_or_default()),
        content_fr: Set(text.content_fr.unwrap_or_default()),
        content_ar: Set(text.content_ar.unwrap_or_default()),
        image: Set(image),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut images = Vec::with_capacity(extra_paths.len());
    for path in extra_paths {
        let image = news_images::ActiveModel {
            news_id: Set(item.id),
            image: Set(path.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        images.push(image);
    }

    txn.commit().await?;
    Ok((item, images))
}

/// Replaces the four text fields. Images are managed separately.
#[instrument(skip(state, text))]
pub async fn update(state: &AppState, principal: Principal, id: i32, text: NewsText) -> CmsResult<NewsView> {
    principal.require_admin()?;

    let mut errors = ValidationErrors::new();
    text.check(&mut errors);
    errors.into_result()?;

    let mut item: news::ActiveModel = find_news(state, id).await?.into();
    item.title_fr = Set(text.title_fr.unwrap_or_default());
    item.title_ar = Set(text.title_ar.unwrap_or_default());
    item.content_fr = Set(text.content_fr.unwrap_or_default());
    item.content_ar = Set(text.content_ar.unwrap_or_default());
    item.updated_at = Set(Utc::now().into());
    let item = item.update(&state.database).await?;

    info!(id, "news updated");
    let images = images_of(&state.database, id).await?;
    Ok(NewsView::new(item, images, &state.media))
}

/// Rows go first; files are removed afterwards on a best-effort basis.
#[instrument(skip(state))]
pub async fn delete(state: &AppState, principal: Principal, id: i32) -> CmsResult<()> {
    principal.require_admin()?;
    let item = find_news(state, id).await?;
    let images = images_of(&state.database, id).await?;

    let txn = state.database.begin().await?;
    news_images::Entity::delete_many()
        .filter(news_images::Column::NewsId.eq(id))
        .exec(&txn)
        .await?;
    item.clone().delete(&txn).await?;
    txn.commit().await?;

    let mut files: Vec<String> = images.into_iter().map(|image| image.image).collect();
    files.extend(item.image);
    discard_all(state, &files).await;

    info!(id, files = files.len(), "news deleted");
    Ok(())
}

/// `images[]`: at least one image.
#[instrument(skip(state, form))]
pub async fn add_images(
    state: &AppState,
    principal: Principal,
    id: i32,
    form: &MultipartForm,
) -> CmsResult<Vec<NewsImageView>> {
    principal.require_admin()?;

    let uploads: Vec<&Upload> = form.files("images").collect();
    let mut errors = ValidationErrors::new();
    if uploads.is_empty() {
        errors.add("images", "The images field is required.");
    }
    for (idx, upload) in uploads.iter().enumerate() {
        upload.check(&mut errors, &format!("images.{idx}"), BLOCK_IMAGE);
    }
    errors.into_result()?;

    let item = find_news(state, id).await?;
    let paths = store_all(state, &uploads).await?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let inserted = async {
        let txn = state.database.begin().await?;
        let mut saved = Vec::with_capacity(paths.len());
        for path in &paths {
            let image = news_images::ActiveModel {
                news_id: Set(item.id),
                image: Set(path.clone()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            saved.push(image);
        }
        txn.commit().await?;
        Ok::<_, CmsError>(saved)
    }
    .await;

    match inserted {
        Ok(saved) => {
            info!(id, images = saved.len(), "news images added");
            Ok(saved
                .into_iter()
                .map(|image| NewsImageView::new(image, &state.media))
                .collect())
        }
        Err(why) => {
            discard_all(state, &paths).await;
            Err(why)
        }
    }
}

/// Returns the id of the news the image belonged to.
#[instrument(skip(state))]
pub async fn delete_image(state: &AppState, principal: Principal, image_id: i32) -> CmsResult<i32> {
    principal.require_admin()?;
    let image = news_images::Entity::find_by_id(image_id)
        .one(&state.database)
        .await?
        .ok_or_else(|| CmsError::not_found(format!("news image {image_id} does not exist")))?;

    let news_id = image.news_id;
    let path = image.image.clone();
    image.delete(&state.database).await?;
    discard(state.blobs.as_ref(), &path).await;

    info!(image_id, news_id, "news image deleted");
    Ok(news_id)
}
