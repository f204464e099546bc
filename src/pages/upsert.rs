//! Saving a page replaces its whole block list.
//!
//! Inside one transaction the page row is created or updated, every block it
//! owns is deleted and the submitted blocks are inserted with positions
//! `1..=N` in submission order. Nothing is diffed, so a save can never leave
//! stale positions or blocks behind. Two admins saving the same slug at the
//! same time race; the later commit wins as a whole.

use crate::auth::Principal;
use crate::error::{CmsError, CmsResult};
use crate::models::{page_blocks, pages};
use crate::pages::read::{blocks_of, find_page};
use crate::pages::PageView;
use crate::AppState;
use baladiya_core::validate::{validate_page, validate_slug, PageSubmission};
use baladiya_core::{Bilingual, BlockRecord};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{error, info, instrument};

#[instrument(skip(state, submission), fields(blocks = submission.blocks.len()))]
pub async fn upsert(
    state: &AppState,
    principal: Principal,
    slug: &str,
    submission: PageSubmission,
) -> CmsResult<PageView> {
    principal.require_admin()?;
    validate_slug(slug)?;
    let page = validate_page(submission)?;
    let blocks: Vec<BlockRecord> = page.blocks.into_iter().map(BlockRecord::sanitize).collect();

    match save(&state.database, slug, page.title, &blocks).await {
        Ok((page, rows)) => {
            info!(slug, blocks = rows.len(), "page saved");
            Ok(PageView::new(page, &rows, &state.media))
        }
        Err(why) => {
            error!(slug, error = %why, "page upsert failed");
            Err(CmsError::SaveFailed(why.to_string()))
        }
    }
}

/// Dropping the transaction on an early return rolls it back.
async fn save(
    db: &DatabaseConnection,
    slug: &str,
    title: Bilingual,
    blocks: &[BlockRecord],
) -> Result<(pages::Model, Vec<page_blocks::Model>), DbErr> {
    let txn = db.begin().await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let (title_fr, title_ar) = title.into_parts();

    let page = match find_page(&txn, slug).await? {
        Some(existing) => {
            let mut page: pages::ActiveModel = existing.into();
            page.title_fr = Set(title_fr);
            page.title_ar = Set(title_ar);
            page.updated_at = Set(now);
            page.update(&txn).await?
        }
        None => {
            pages::ActiveModel {
                slug: Set(slug.to_string()),
                title_fr: Set(title_fr),
                title_ar: Set(title_ar),
                content_fr: Set(None),
                content_ar: Set(None),
                extra: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    page_blocks::Entity::delete_many()
        .filter(page_blocks::Column::PageId.eq(page.id))
        .exec(&txn)
        .await?;

    for (position, block) in (1..).zip(blocks) {
        page_blocks::ActiveModel::from_record(page.id, position, block, now)
            .insert(&txn)
            .await?;
    }

    let rows = blocks_of(&txn, page.id).await?;
    txn.commit().await?;
    Ok((page, rows))
}
