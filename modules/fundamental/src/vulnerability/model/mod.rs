pub mod nvd;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use vulnscope_module_enrichment::CweDetails;

/// The flat, client-facing document produced by a lookup.
///
/// Collection-valued fields are string-encoded JSON sub-documents, consumed
/// as opaque payloads by the UI. Every field that can be structurally absent
/// in the raw record degrades to `null` or an empty collection; the document
/// is produced whenever the raw record exists, even if every enrichment
/// provider fails.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityDetails {
    pub id: String,
    pub cve_id: String,
    pub description: String,
    pub cvss_score: Option<f64>,
    pub severity: Option<String>,
    pub published: Option<String>,
    pub modified: Option<String>,
    pub epss_score: Option<f64>,
    pub epss_percentile: Option<f64>,
    pub cvss_vector: Option<String>,
    pub attack_vector: Option<String>,
    pub attack_complexity: Option<String>,
    pub privileges: Option<String>,
    pub user_interaction: Option<String>,
    /// The raw configuration node list, passed through unmodified
    pub affected_products: String,
    pub known_exploits: String,
    pub related_news: String,
    /// The raw reference list, passed through unmodified
    pub references: String,
    pub weaknesses: String,
    pub exposure: Option<String>,
    pub threat_intelligence: String,
    pub threat_context: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// One piece of exploit evidence derived from the reference list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnownExploit {
    pub r#type: String,
    pub description: String,
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsReference {
    pub title: String,
    pub description: String,
    pub source: String,
    pub time: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MitigationReference {
    pub strategy: String,
    pub implementation: String,
    pub effectiveness: String,
}

/// A de-duplicated, human readable classification of one piece of exploit
/// evidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveThreat {
    pub r#type: String,
    pub description: String,
    pub source: String,
    pub confidence: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnrichedWeakness {
    pub id: String,
    pub description: String,
    pub severity: String,
    pub implication: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CweDetails>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackVector {
    pub r#type: String,
    pub description: String,
    pub risk: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: String,
    pub priority: Priority,
    pub rationale: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatIntelligence {
    pub threat_level: String,
    pub attack_vectors: Vec<AttackVector>,
    pub mitigations: Vec<MitigationReference>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndustryImpact {
    pub severity: String,
    pub description: String,
    pub sectors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatContext {
    pub news: Vec<NewsReference>,
    pub active_threats: Vec<ActiveThreat>,
    pub industry_impact: IndustryImpact,
    pub emerging_trends: Vec<EnrichedWeakness>,
}
