mod context;
mod normalize;
mod weakness;

use crate::{
    Error,
    vulnerability::model::{
        VulnerabilityDetails,
        nvd::{CveDocument, CveRecord},
    },
};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};
use tracing::instrument;
use vulnscope_common::id::CveId;
use vulnscope_entity::vulnerability;
use vulnscope_module_enrichment::{
    AnalysisRequest, ExploitPrediction, ExposureLookup, ThreatAnalysis, WeaknessCatalog,
};

/// The lookup pipeline: raw record + enrichment providers in, one coherent
/// output document out.
///
/// The provider clients are injected explicitly, so the pipeline can be
/// exercised with fakes.
#[derive(Clone, Debug)]
pub struct VulnerabilityService<E, X, A, W> {
    epss: E,
    exposure: X,
    analysis: A,
    catalog: W,
}

impl<E, X, A, W> VulnerabilityService<E, X, A, W>
where
    E: ExploitPrediction,
    X: ExposureLookup,
    A: ThreatAnalysis,
    W: WeaknessCatalog,
{
    pub fn new(epss: E, exposure: X, analysis: A, catalog: W) -> Self {
        Self {
            epss,
            exposure,
            analysis,
            catalog,
        }
    }

    /// Look up one vulnerability and produce the client-facing document.
    ///
    /// All provider calls are issued concurrently and none of them can fail
    /// the lookup; each absence degrades the matching output fields. A
    /// missing record returns `None`, a malformed one fails the lookup as a
    /// whole.
    #[instrument(skip(self, connection), err(level = tracing::Level::INFO))]
    pub async fn lookup<C: ConnectionTrait>(
        &self,
        id: &CveId,
        connection: &C,
    ) -> Result<Option<VulnerabilityDetails>, Error> {
        let Some(record) = vulnerability::Entity::find_by_id(id.to_string())
            .one(connection)
            .await?
        else {
            return Ok(None);
        };

        let document: CveDocument = serde_json::from_value(record.document)
            .map_err(|err| Error::Data(format!("malformed vulnerability document: {err}")))?;
        let cve = document.cve;

        let severity = normalize::cvss(&cve).and_then(|data| data.base_severity.clone());
        let request = analysis_request(id, &cve);

        let (epss, exposure, analysis, weaknesses) = tokio::join!(
            self.epss.lookup(id),
            self.exposure.lookup(id),
            self.analysis.analyze(&request),
            weakness::resolve(&self.catalog, &cve, severity.as_deref()),
        );

        let mut details =
            normalize::normalize(id, &cve, record.created_at, epss, exposure, weaknesses)?;

        if let Some(analysis) = analysis {
            context::attach_analysis(&mut details, &analysis)?;
        }

        Ok(Some(details))
    }

    /// The total number of stored raw records.
    #[instrument(skip(self, connection), err)]
    pub async fn count<C: ConnectionTrait>(&self, connection: &C) -> Result<u64, Error> {
        Ok(vulnerability::Entity::find().count(connection).await?)
    }
}

fn analysis_request(id: &CveId, cve: &CveRecord) -> AnalysisRequest {
    let cvss = normalize::cvss(cve);
    let references = normalize::references(cve);

    AnalysisRequest {
        id: id.to_string(),
        severity: cvss.and_then(|data| data.base_severity.clone()),
        score: cvss.and_then(|data| data.base_score),
        description: normalize::description(cve),
        weakness_ids: weakness::canonical_ids(cve),
        attack_vector: cvss.and_then(|data| data.attack_vector.clone()),
        attack_complexity: cvss.and_then(|data| data.attack_complexity.clone()),
        privileges_required: cvss.and_then(|data| data.privileges_required.clone()),
        user_interaction: cvss.and_then(|data| data.user_interaction.clone()),
        exploit_references: references
            .iter()
            .filter(|reference| normalize::is_exploit_evidence(reference))
            .count(),
        vendor_references: references
            .iter()
            .filter(|reference| normalize::is_mitigation(reference))
            .count(),
    }
}
