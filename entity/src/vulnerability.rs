use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

/// A raw vulnerability record, as ingested from an upstream database snapshot.
///
/// The `document` column holds the opaque upstream structure. It is only
/// interpreted when a lookup reshapes it into the client-facing document.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vulnerability")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub document: serde_json::Value,
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
