use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use vulnscope_entity::search_history;

/// One recent-search entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub cve_id: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub search_time: OffsetDateTime,
}

impl From<search_history::Model> for SearchHistoryEntry {
    fn from(model: search_history::Model) -> Self {
        Self {
            cve_id: model.cve_id,
            description: model.description,
            search_time: model.search_time,
        }
    }
}
