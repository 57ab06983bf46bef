use crate::{
    Error, history::service::SearchHistoryService, vulnerability::model::VulnerabilityDetails,
    vulnerability::service::VulnerabilityService,
};
use actix_web::{HttpResponse, Responder, get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vulnscope_common::{db::Database, id::CveId};
use vulnscope_module_enrichment::{AnalysisClient, CweClient, EpssClient, ExposureClient};

/// The lookup service wired with the production provider clients.
pub type Service = VulnerabilityService<EpssClient, ExposureClient, AnalysisClient, CweClient>;

pub fn configure(
    config: &mut utoipa_actix_web::service_config::ServiceConfig,
    db: Database,
    service: Service,
) {
    config
        .app_data(web::Data::new(db))
        .app_data(web::Data::new(service))
        .service(get_cve)
        .service(count_cves);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CveCount {
    pub count: u64,
}

#[utoipa::path(
    tag = "vulnerability",
    operation_id = "getCve",
    params(
        ("id", Path, description = "The CVE identifier to look up, case insensitive"),
    ),
    responses(
        (status = 200, description = "The enriched vulnerability document", body = VulnerabilityDetails),
        (status = 400, description = "The identifier is malformed"),
        (status = 404, description = "No record exists for the identifier"),
    )
)]
#[get("/v2/cve/{id}")]
/// Look up a single CVE and enrich it
async fn get_cve(
    db: web::Data<Database>,
    service: web::Data<Service>,
    history: web::Data<SearchHistoryService>,
    id: web::Path<String>,
) -> Result<impl Responder, Error> {
    let id = id.into_inner().to_uppercase().parse::<CveId>()?;

    let Some(details) = service.lookup(&id, db.get_ref()).await? else {
        return Err(Error::NotFound(id.to_string()));
    };

    // the document is the primary value of a lookup, a failed history write
    // must not fail it
    if let Err(err) = history
        .record(&id, Some(details.description.clone()), db.get_ref())
        .await
    {
        log::warn!("failed to record search history for {id}: {err}");
    }

    Ok(HttpResponse::Ok().json(details))
}

#[utoipa::path(
    tag = "vulnerability",
    operation_id = "countCves",
    responses(
        (status = 200, description = "The number of stored raw records", body = CveCount),
    )
)]
#[get("/v2/cve-count")]
/// The total number of stored vulnerability records
async fn count_cves(
    db: web::Data<Database>,
    service: web::Data<Service>,
) -> Result<impl Responder, Error> {
    let count = service.count(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(CveCount { count }))
}
