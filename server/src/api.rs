use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use std::process::ExitCode;
use utoipa::OpenApi;
use utoipa_actix_web::AppExt;
use vulnscope_common::{config, db::Database};
use vulnscope_module_enrichment::{
    AnalysisClient, CweClient, EnrichmentConfig, EpssClient, ExposureClient,
};
use vulnscope_module_fundamental::{
    history::{
        self,
        service::{DEFAULT_RETENTION, SearchHistoryService},
    },
    vulnerability::{self, endpoints::Service},
};

/// Run the API server
#[derive(clap::Args, Debug)]
pub struct Run {
    /// The address to bind to
    #[arg(long, env = "VULNSCOPE_BIND", default_value = "0.0.0.0:8080")]
    pub bind: String,

    /// The number of entries kept in the search history
    #[arg(
        long,
        env = "VULNSCOPE_HISTORY_RETENTION",
        default_value_t = DEFAULT_RETENTION
    )]
    pub history_retention: u64,

    /// Apply pending migrations on startup
    #[arg(long, env = "VULNSCOPE_DB_MIGRATE", default_value_t = false)]
    pub migrate: bool,

    // flattened commands must go last
    //
    /// Database configuration
    #[command(flatten)]
    pub database: config::Database,

    /// Enrichment provider configuration
    #[command(flatten)]
    pub enrichment: EnrichmentConfig,
}

#[derive(OpenApi)]
#[openapi(info(
    title = "vulnscope",
    description = "Vulnerability lookup and enrichment service"
))]
struct ApiDoc;

impl Run {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        crate::logging::init("api");

        let db = Database::new(&self.database).await?;
        if self.migrate {
            vulnscope_db::Database(&db).migrate().await?;
        }

        let service = Service::new(
            EpssClient::new(&self.enrichment)?,
            ExposureClient::new(&self.enrichment)?,
            AnalysisClient::new(&self.enrichment)?,
            CweClient::new(&self.enrichment)?,
        );
        let history = SearchHistoryService::new(self.history_retention);

        log::info!("listening on {}", self.bind);

        HttpServer::new(move || {
            let (app, api) = App::new()
                .into_utoipa_app()
                .openapi(ApiDoc::openapi())
                .map(|app| app.wrap(Logger::default()))
                .configure(|config| {
                    vulnerability::endpoints::configure(config, db.clone(), service.clone());
                    history::endpoints::configure(config, db.clone(), history.clone());
                })
                .split_for_parts();

            app.app_data(web::Data::new(api)).service(openapi_json)
        })
        .bind(self.bind)?
        .run()
        .await?;

        Ok(ExitCode::SUCCESS)
    }
}

#[get("/openapi.json")]
async fn openapi_json(api: web::Data<utoipa::openapi::OpenApi>) -> impl Responder {
    HttpResponse::Ok().json(api.as_ref())
}
