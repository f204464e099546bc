use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(nullable)]
    pub title_fr: Option<String>,
    #[sea_orm(nullable)]
    pub title_ar: Option<String>,
    // flat content, predates blocks
    #[sea_orm(column_type = "Text", nullable)]
    pub content_fr: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub content_ar: Option<String>,
    #[sea_orm(nullable)]
    pub extra: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::page_blocks::Entity")]
    Blocks,
}

impl Related<super::page_blocks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blocks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
