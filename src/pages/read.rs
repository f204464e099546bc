use crate::error::{CmsError, CmsResult};
use crate::models::{page_blocks, pages};
use crate::pages::PageView;
use baladiya_core::MediaResolver;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use tracing::instrument;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct PageSummary {
    pub slug: String,
    pub title_fr: Option<String>,
    pub title_ar: Option<String>,
    pub updated_at: DateTimeWithTimeZone,
}

pub async fn find_page<C>(db: &C, slug: &str) -> Result<Option<pages::Model>, DbErr>
where
    C: ConnectionTrait,
{
    pages::Entity::find()
        .filter(pages::Column::Slug.eq(slug))
        .one(db)
        .await
}

pub async fn blocks_of<C>(db: &C, page_id: i32) -> Result<Vec<page_blocks::Model>, DbErr>
where
    C: ConnectionTrait,
{
    page_blocks::Entity::find()
        .filter(page_blocks::Column::PageId.eq(page_id))
        .order_by_asc(page_blocks::Column::Position)
        .all(db)
        .await
}

/// Page plus its blocks in position order.
#[instrument(skip(db, media))]
pub async fn get_by_slug<C>(db: &C, media: &MediaResolver, slug: &str) -> CmsResult<PageView>
where
    C: ConnectionTrait,
{
    let page = find_page(db, slug)
        .await?
        .ok_or_else(|| CmsError::not_found(format!("page `{slug}` does not exist")))?;
    let rows = blocks_of(db, page.id).await?;
    Ok(PageView::new(page, &rows, media))
}

/// Every page without its blocks, ordered by slug.
pub async fn list_summaries<C>(db: &C) -> CmsResult<Vec<PageSummary>>
where
    C: ConnectionTrait,
{
    let summaries = pages::Entity::find()
        .select_only()
        .column(pages::Column::Slug)
        .column(pages::Column::TitleFr)
        .column(pages::Column::TitleAr)
        .column(pages::Column::UpdatedAt)
        .order_by_asc(pages::Column::Slug)
        .into_model::<PageSummary>()
        .all(db)
        .await?;
    Ok(summaries)
}
