//! CMS pages: a slug-addressed document made of ordered, typed blocks.
//!
//! [`upsert`] is the only writer of blocks. [`read`] serves the public side,
//! and [`legacy`] keeps the older flat `content_*` + `extra` shape editable.

use crate::models::{page_blocks, pages};
use baladiya_core::{Bilingual, BlockContent, BlockRecord, LegacyExtra, Locale, MediaResolver};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

pub mod legacy;
pub mod read;
pub mod upsert;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockView {
    pub id: i32,
    pub position: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub text_fr: Option<String>,
    pub text_ar: Option<String>,
    pub image_path: Option<String>,
    pub alt_fr: Option<String>,
    pub alt_ar: Option<String>,
    pub gallery: Option<Vec<String>>,
    pub map_url: Option<String>,
    pub meta: Option<Map<String, Value>>,
    pub full_image_url: Option<String>,
    pub gallery_urls: Vec<String>,
    /// Alt text per locale with fallback applied, image blocks only.
    pub alt: Option<Bilingual>,
}

impl BlockView {
    /// Raw fields come back as stored. Resolved URLs and alt text only use
    /// the fields the block's type renders.
    pub fn new(id: i32, position: i32, record: &BlockRecord, media: &MediaResolver) -> Self {
        let block = record.to_block();
        let (full_image_url, gallery_urls) = match &block.content {
            BlockContent::Image { path, .. } => (media.resolve_opt(path.as_deref()), Vec::new()),
            BlockContent::Gallery { paths } => (None, media.resolve_all(paths)),
            BlockContent::Heading { .. } | BlockContent::Text { .. } | BlockContent::Map { .. } => {
                (None, Vec::new())
            }
        };

        let alt = matches!(block.content, BlockContent::Image { .. }).then(|| {
            Bilingual::new(
                block.alt(Locale::Fr).map(str::to_string),
                block.alt(Locale::Ar).map(str::to_string),
            )
        });

        let fields = record.fields.clone();
        BlockView {
            id,
            position,
            kind: record.kind.as_str().to_string(),
            text_fr: fields.text_fr,
            text_ar: fields.text_ar,
            image_path: fields.image_path,
            alt_fr: fields.alt_fr,
            alt_ar: fields.alt_ar,
            gallery: fields.gallery,
            map_url: fields.map_url,
            meta: fields.meta,
            full_image_url,
            gallery_urls,
            alt,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageView {
    pub slug: String,
    pub title_fr: Option<String>,
    pub title_ar: Option<String>,
    pub content_fr: Option<String>,
    pub content_ar: Option<String>,
    pub extra: Option<Value>,
    pub gallery_urls: Vec<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub blocks: Vec<BlockView>,
}

impl PageView {
    /// `rows` must already be in position order.
    pub fn new(page: pages::Model, rows: &[page_blocks::Model], media: &MediaResolver) -> Self {
        let blocks = rows
            .iter()
            .filter_map(|row| match row.to_record() {
                Ok(record) => Some(BlockView::new(row.id, row.position, &record, media)),
                Err(why) => {
                    warn!(slug = %page.slug, block = row.id, error = %why, "skipping unreadable block");
                    None
                }
            })
            .collect();

        let gallery_urls = media.resolve_all(&LegacyExtra::from_value(page.extra.as_ref()).gallery);

        PageView {
            slug: page.slug,
            title_fr: page.title_fr,
            title_ar: page.title_ar,
            content_fr: page.content_fr,
            content_ar: page.content_ar,
            extra: page.extra,
            gallery_urls,
            created_at: page.created_at,
            updated_at: page.updated_at,
            blocks,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GalleryView {
    pub gallery: Vec<String>,
    pub gallery_urls: Vec<String>,
}

impl GalleryView {
    pub fn new(extra: &LegacyExtra, media: &MediaResolver) -> Self {
        GalleryView {
            gallery: extra.gallery.clone(),
            gallery_urls: media.resolve_all(&extra.gallery),
        }
    }
}
