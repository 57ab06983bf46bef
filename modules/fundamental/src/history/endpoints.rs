use crate::{
    Error,
    history::{model::SearchHistoryEntry, service::SearchHistoryService},
};
use actix_web::{HttpResponse, Responder, delete, get, web};
use vulnscope_common::db::Database;

pub fn configure(
    config: &mut utoipa_actix_web::service_config::ServiceConfig,
    db: Database,
    service: SearchHistoryService,
) {
    config
        .app_data(web::Data::new(db))
        .app_data(web::Data::new(service))
        .service(list_history)
        .service(clear_history);
}

#[utoipa::path(
    tag = "history",
    operation_id = "listSearchHistory",
    responses(
        (status = 200, description = "Recent searches, most recent first", body = Vec<SearchHistoryEntry>),
    )
)]
#[get("/v2/search-history")]
/// List the recent searches
async fn list_history(
    db: web::Data<Database>,
    service: web::Data<SearchHistoryService>,
) -> Result<impl Responder, Error> {
    Ok(HttpResponse::Ok().json(service.list(db.get_ref()).await?))
}

#[utoipa::path(
    tag = "history",
    operation_id = "clearSearchHistory",
    responses(
        (status = 204, description = "The search history was cleared"),
    )
)]
#[delete("/v2/search-history")]
/// Remove all recent searches
async fn clear_history(
    db: web::Data<Database>,
    service: web::Data<SearchHistoryService>,
) -> Result<impl Responder, Error> {
    service.clear(db.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}
