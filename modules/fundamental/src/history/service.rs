use crate::{Error, history::model::SearchHistoryEntry};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::OnConflict,
};
use time::OffsetDateTime;
use tracing::instrument;
use vulnscope_common::id::CveId;
use vulnscope_entity::search_history;

pub const DEFAULT_RETENTION: u64 = 20;

/// Records lookups and enforces the bounded retention window.
#[derive(Clone, Debug)]
pub struct SearchHistoryService {
    retention: u64,
}

impl SearchHistoryService {
    pub fn new(retention: u64) -> Self {
        Self { retention }
    }

    /// Upsert the lookup event, then trim everything ranked below the
    /// retention window.
    #[instrument(skip(self, connection, description), err)]
    pub async fn record<C: ConnectionTrait>(
        &self,
        id: &CveId,
        description: Option<String>,
        connection: &C,
    ) -> Result<(), Error> {
        search_history::Entity::insert(search_history::ActiveModel {
            cve_id: Set(id.to_string()),
            description: Set(description),
            search_time: Set(OffsetDateTime::now_utc()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(search_history::Column::CveId)
                .update_columns([
                    search_history::Column::Description,
                    search_history::Column::SearchTime,
                ])
                .to_owned(),
        )
        .exec(connection)
        .await?;

        // timestamp ties are broken by insertion order
        let expired: Vec<i32> = search_history::Entity::find()
            .select_only()
            .column(search_history::Column::Id)
            .order_by_desc(search_history::Column::SearchTime)
            .order_by_desc(search_history::Column::Id)
            .offset(self.retention)
            .into_tuple()
            .all(connection)
            .await?;

        if !expired.is_empty() {
            search_history::Entity::delete_many()
                .filter(search_history::Column::Id.is_in(expired))
                .exec(connection)
                .await?;
        }

        Ok(())
    }

    /// All entries, most recent first.
    #[instrument(skip(self, connection), err)]
    pub async fn list<C: ConnectionTrait>(
        &self,
        connection: &C,
    ) -> Result<Vec<SearchHistoryEntry>, Error> {
        Ok(search_history::Entity::find()
            .order_by_desc(search_history::Column::SearchTime)
            .order_by_desc(search_history::Column::Id)
            .all(connection)
            .await?
            .into_iter()
            .map(SearchHistoryEntry::from)
            .collect())
    }

    #[instrument(skip(self, connection), err)]
    pub async fn clear<C: ConnectionTrait>(&self, connection: &C) -> Result<(), Error> {
        search_history::Entity::delete_many().exec(connection).await?;
        Ok(())
    }
}
