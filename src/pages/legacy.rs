//! The flat page shape that predates blocks: `content_fr`/`content_ar` plus a
//! free-form `extra` object holding a gallery and a map URL.
//!
//! Gallery entries are addressed by their current index, which shifts after
//! every removal. Removing an entry leaves its file in storage.

use crate::auth::Principal;
use crate::error::{CmsError, CmsResult};
use crate::models::pages;
use crate::pages::read::{blocks_of, find_page};
use crate::pages::{GalleryView, PageView};
use crate::storage::{discard, Prefix};
use crate::upload::{required_image, MultipartForm};
use crate::AppState;
use baladiya_core::validate::{max_chars, validate_slug, BLOCK_IMAGE, MAX_STRING_CHARS};
use baladiya_core::{LegacyExtra, ValidationErrors};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{info, instrument};

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct NewPage {
    #[serde(default)]
    pub slug: String,
    pub title_fr: Option<String>,
    pub title_ar: Option<String>,
    pub content_fr: Option<String>,
    pub content_ar: Option<String>,
    pub extra: Option<Value>,
}

/// Partial update. An absent field is left alone, an explicit `null` clears.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PagePatch {
    #[serde(default, deserialize_with = "present")]
    pub title_fr: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub title_ar: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub content_fr: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub content_ar: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub extra: Option<Option<Value>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check_titles(
    errors: &mut ValidationErrors,
    title_fr: Option<&str>,
    title_ar: Option<&str>,
) {
    max_chars(errors, "title_fr", title_fr, MAX_STRING_CHARS);
    max_chars(errors, "title_ar", title_ar, MAX_STRING_CHARS);
}

fn clean_extra(errors: &mut ValidationErrors, extra: Option<Value>) -> Option<Value> {
    match extra {
        None | Some(Value::Null) => None,
        Some(value) => match LegacyExtra::from_submitted(value) {
            Ok(extra) => Some(extra.sanitized().to_value()),
            Err(why) => {
                errors.merge(why);
                None
            }
        },
    }
}

async fn existing_page(state: &AppState, slug: &str) -> CmsResult<pages::Model> {
    find_page(&state.database, slug)
        .await?
        .ok_or_else(|| CmsError::not_found(format!("page `{slug}` does not exist")))
}

async fn view(state: &AppState, page: pages::Model) -> CmsResult<PageView> {
    let rows = blocks_of(&state.database, page.id).await?;
    Ok(PageView::new(page, &rows, &state.media))
}

#[instrument(skip(state, new), fields(slug = %new.slug))]
pub async fn create_page(state: &AppState, principal: Principal, new: NewPage) -> CmsResult<PageView> {
    principal.require_admin()?;

    let mut errors = match validate_slug(&new.slug) {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    check_titles(&mut errors, new.title_fr.as_deref(), new.title_ar.as_deref());
    let extra = clean_extra(&mut errors, new.extra);
    errors.into_result()?;

    if find_page(&state.database, &new.slug).await?.is_some() {
        return Err(ValidationErrors::single("slug", "The slug has already been taken.").into());
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    let page = pages::ActiveModel {
        slug: Set(new.slug),
        title_fr: Set(new.title_fr),
        title_ar: Set(new.title_ar),
        content_fr: Set(new.content_fr),
        content_ar: Set(new.content_ar),
        extra: Set(extra),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.database)
    .await?;

    info!(slug = %page.slug, "page created");
    view(state, page).await
}

#[instrument(skip(state, patch))]
pub async fn update_page(
    state: &AppState,
    principal: Principal,
    slug: &str,
    patch: PagePatch,
) -> CmsResult<PageView> {
    principal.require_admin()?;

    let mut errors = ValidationErrors::new();
    check_titles(
        &mut errors,
        patch.title_fr.as_ref().and_then(Option::as_deref),
        patch.title_ar.as_ref().and_then(Option::as_deref),
    );
    let extra = patch.extra.map(|extra| clean_extra(&mut errors, extra));
    errors.into_result()?;

    let existing = existing_page(state, slug).await?;
    let mut page: pages::ActiveModel = existing.into();
    if let Some(title_fr) = patch.title_fr {
        page.title_fr = Set(title_fr);
    }
    if let Some(title_ar) = patch.title_ar {
        page.title_ar = Set(title_ar);
    }
    if let Some(content_fr) = patch.content_fr {
        page.content_fr = Set(content_fr);
    }
    if let Some(content_ar) = patch.content_ar {
        page.content_ar = Set(content_ar);
    }
    if let Some(extra) = extra {
        page.extra = Set(extra);
    }
    page.updated_at = Set(Utc::now().into());

    let page = page.update(&state.database).await?;
    info!(slug, "page updated");
    view(state, page).await
}

async fn save_extra(state: &AppState, page: pages::Model, extra: &LegacyExtra) -> CmsResult<()> {
    let mut page: pages::ActiveModel = page.into();
    page.extra = Set(Some(extra.to_value()));
    page.updated_at = Set(Utc::now().into());
    page.update(&state.database).await?;
    Ok(())
}

#[instrument(skip(state, form))]
pub async fn add_gallery_image(
    state: &AppState,
    principal: Principal,
    slug: &str,
    form: &MultipartForm,
) -> CmsResult<GalleryView> {
    principal.require_admin()?;
    let upload = required_image(form, "file", BLOCK_IMAGE)?;
    let page = existing_page(state, slug).await?;

    let path = state
        .blobs
        .put(Prefix::Pages, &upload.file_name, upload.data.clone())
        .await?;

    let mut extra = LegacyExtra::from_value(page.extra.as_ref());
    extra.push_image(path.clone());
    if let Err(why) = save_extra(state, page, &extra).await {
        discard(state.blobs.as_ref(), &path).await;
        return Err(why);
    }

    info!(slug, path = %path, "gallery image added");
    Ok(GalleryView::new(&extra, &state.media))
}

#[instrument(skip(state))]
pub async fn delete_gallery_image(
    state: &AppState,
    principal: Principal,
    slug: &str,
    index: usize,
) -> CmsResult<GalleryView> {
    principal.require_admin()?;
    let page = existing_page(state, slug).await?;

    let mut extra = LegacyExtra::from_value(page.extra.as_ref());
    let removed = extra.remove_image(index)?;
    save_extra(state, page, &extra).await?;

    // file is left in storage
    info!(slug, index, path = %removed, "gallery image removed");
    Ok(GalleryView::new(&extra, &state.media))
}
