use crate::models::{news, news_images, page_blocks, pages};
use color_eyre::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Schema};
use tracing::info;

/// Creates missing tables straight from the entity definitions. Tables are
/// created parents first so foreign keys resolve.
pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, pages::Entity).await?;
    create_table(db, &schema, page_blocks::Entity).await?;
    create_table(db, &schema, news::Entity).await?;
    create_table(db, &schema, news_images::Entity).await?;

    let mut ordering = Index::create();
    ordering
        .name("idx_page_blocks_page_position")
        .table(page_blocks::Entity)
        .col(page_blocks::Column::PageId)
        .col(page_blocks::Column::Position)
        .if_not_exists();
    db.execute(db.get_database_backend().build(&ordering)).await?;

    info!("database schema ready");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(db.get_database_backend().build(&table)).await?;
    Ok(())
}
