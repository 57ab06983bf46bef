use crate::config::EnrichmentConfig;
use serde::{Deserialize, Serialize};

/// Weakness taxonomy details, keyed by canonical CWE id.
pub trait WeaknessCatalog {
    /// Returns the catalog entry for one id, or `None` when the id is
    /// unknown or the call failed.
    fn lookup(&self, id: &str) -> impl Future<Output = Option<CweDetails>>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CweDetails {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consequences: Vec<CweConsequence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mitigations: Vec<CweMitigation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CweConsequence {
    pub scope: String,
    pub impact: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CweMitigation {
    pub phase: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effectiveness: Option<String>,
}

/// Client for the MITRE CWE REST API.
#[derive(Clone, Debug)]
pub struct CweClient {
    client: reqwest::Client,
    url: String,
}

impl CweClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, anyhow::Error> {
        Ok(Self {
            client: config.client()?,
            url: config.cwe_url.clone(),
        })
    }

    async fn fetch(&self, id: &str) -> Result<Option<CweDetails>, anyhow::Error> {
        let number = id.strip_prefix("CWE-").unwrap_or(id);

        let response: WeaknessResponse = self
            .client
            .get(format!("{}/cwe/weakness/{number}", self.url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.weaknesses.into_iter().next().map(|weakness| {
            CweDetails {
                id: id.to_string(),
                name: weakness.name,
                description: weakness.description,
                likelihood: weakness.likelihood,
                status: weakness.status,
                consequences: weakness
                    .consequences
                    .into_iter()
                    .map(|consequence| CweConsequence {
                        scope: consequence.scope.join(", "),
                        impact: consequence.impact.join(", "),
                    })
                    .collect(),
                mitigations: weakness
                    .mitigations
                    .into_iter()
                    .map(|mitigation| CweMitigation {
                        phase: mitigation.phase.join(", "),
                        description: mitigation.description,
                        effectiveness: mitigation.effectiveness,
                    })
                    .collect(),
            }
        }))
    }
}

impl WeaknessCatalog for CweClient {
    async fn lookup(&self, id: &str) -> Option<CweDetails> {
        match self.fetch(id).await {
            Ok(details) => details,
            Err(err) => {
                log::warn!("CWE lookup for {id} failed: {err}");
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct WeaknessResponse {
    #[serde(rename = "Weaknesses", default)]
    weaknesses: Vec<RawWeakness>,
}

#[derive(Deserialize)]
struct RawWeakness {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "LikelihoodOfExploit")]
    likelihood: Option<String>,
    #[serde(rename = "Status")]
    status: Option<String>,
    #[serde(rename = "CommonConsequences", default)]
    consequences: Vec<RawConsequence>,
    #[serde(rename = "PotentialMitigations", default)]
    mitigations: Vec<RawMitigation>,
}

#[derive(Deserialize)]
struct RawConsequence {
    #[serde(rename = "Scope", default)]
    scope: Vec<String>,
    #[serde(rename = "Impact", default)]
    impact: Vec<String>,
}

#[derive(Deserialize)]
struct RawMitigation {
    #[serde(rename = "Phase", default)]
    phase: Vec<String>,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Effectiveness")]
    effectiveness: Option<String>,
}
