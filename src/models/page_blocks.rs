use baladiya_core::{BlockFields, BlockKind, BlockRecord};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "page_blocks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub page_id: i32,
    pub position: i32,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub text_fr: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub text_ar: Option<String>,
    #[sea_orm(nullable)]
    pub image_path: Option<String>,
    #[sea_orm(nullable)]
    pub alt_fr: Option<String>,
    #[sea_orm(nullable)]
    pub alt_ar: Option<String>,
    #[sea_orm(nullable)]
    pub gallery: Option<Json>, // Vec<String>
    #[sea_orm(column_type = "Text", nullable)]
    pub map_url: Option<String>,
    #[sea_orm(nullable)]
    pub meta: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pages::Entity",
        from = "Column::PageId",
        to = "super::pages::Column::Id",
        on_delete = "Cascade"
    )]
    Page,
}

impl Related<super::pages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Page.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Fails only when the stored type is not a known block kind.
    pub fn to_record(&self) -> Result<BlockRecord, String> {
        let kind = self.kind.parse::<BlockKind>()?;
        let fields = BlockFields {
            kind: Some(self.kind.clone()),
            text_fr: self.text_fr.clone(),
            text_ar: self.text_ar.clone(),
            image_path: self.image_path.clone(),
            alt_fr: self.alt_fr.clone(),
            alt_ar: self.alt_ar.clone(),
            gallery: self
                .gallery
                .clone()
                .and_then(|g| serde_json::from_value(g).ok()),
            map_url: self.map_url.clone(),
            meta: match &self.meta {
                Some(Value::Object(map)) => Some(map.clone()),
                _ => None,
            },
        };
        Ok(BlockRecord::new(kind, fields))
    }
}

impl ActiveModel {
    /// Every submitted field is written, whatever the block's type.
    pub fn from_record(
        page_id: i32,
        position: i32,
        record: &BlockRecord,
        now: DateTimeWithTimeZone,
    ) -> ActiveModel {
        let fields = record.fields.clone();
        ActiveModel {
            page_id: Set(page_id),
            position: Set(position),
            kind: Set(record.kind.as_str().to_string()),
            text_fr: Set(fields.text_fr),
            text_ar: Set(fields.text_ar),
            image_path: Set(fields.image_path),
            alt_fr: Set(fields.alt_fr),
            alt_ar: Set(fields.alt_ar),
            gallery: Set(fields.gallery.map(Value::from)),
            map_url: Set(fields.map_url),
            meta: Set(fields.meta.map(Value::Object)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}
