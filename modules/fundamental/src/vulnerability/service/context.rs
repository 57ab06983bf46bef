//! Derives the two synthesized threat views from the normalized fields.

use crate::{
    Error,
    vulnerability::model::{
        ActiveThreat, AttackVector, EnrichedWeakness, IndustryImpact, MitigationReference,
        NewsReference, Priority, Recommendation, ThreatContext, ThreatIntelligence,
        VulnerabilityDetails,
    },
};
use vulnscope_common::severity::Severity;

const INDUSTRY_IMPACT: &str = "Based on CVSS severity and affected products";

pub(crate) fn threat_intelligence(
    severity: Option<&str>,
    attack_vector: Option<&str>,
    mitigations: Vec<MitigationReference>,
) -> ThreatIntelligence {
    let threat_level = severity.unwrap_or("Unknown").to_string();

    ThreatIntelligence {
        threat_level: threat_level.clone(),
        attack_vectors: vec![AttackVector {
            r#type: attack_vector.unwrap_or("Unknown").to_string(),
            description: "Attack vector from CVSS metrics".to_string(),
            risk: threat_level,
        }],
        mitigations,
        recommendations: recommendations(severity),
    }
}

/// The priority assigned to the patch-related recommendations.
pub(crate) fn recommendation_priority(severity: Option<&str>) -> Priority {
    match severity.and_then(|tier| tier.parse::<Severity>().ok()) {
        Some(Severity::Critical) => Priority::High,
        Some(Severity::High) => Priority::Medium,
        _ => Priority::Low,
    }
}

fn recommendations(severity: Option<&str>) -> Vec<Recommendation> {
    vec![
        Recommendation {
            action: "Update to the latest version".to_string(),
            priority: recommendation_priority(severity),
            rationale: "Keeping software up to date is crucial for security".to_string(),
        },
        Recommendation {
            action: "Monitor for exploitation attempts".to_string(),
            priority: Priority::Medium,
            rationale: "Early detection can prevent successful attacks".to_string(),
        },
        Recommendation {
            action: "Apply available security patches".to_string(),
            priority: recommendation_priority(severity),
            rationale: "Patches address known vulnerabilities".to_string(),
        },
    ]
}

pub(crate) fn threat_context(
    severity: Option<&str>,
    news: Vec<NewsReference>,
    active_threats: Vec<ActiveThreat>,
    sectors: Vec<String>,
    emerging_trends: Vec<EnrichedWeakness>,
) -> ThreatContext {
    ThreatContext {
        news,
        active_threats,
        industry_impact: IndustryImpact {
            severity: severity.unwrap_or("Unknown").to_string(),
            description: INDUSTRY_IMPACT.to_string(),
            sectors,
        },
        emerging_trends,
    }
}

/// Merge the narrative analysis into the already serialized threat
/// intelligence object, by re-parsing and re-attaching. The merge happens
/// strictly after the base object was produced.
pub(crate) fn attach_analysis(
    details: &mut VulnerabilityDetails,
    analysis: &str,
) -> Result<(), Error> {
    let mut value: serde_json::Value = serde_json::from_str(&details.threat_intelligence)
        .map_err(|err| Error::Data(format!("re-parsing threat intelligence: {err}")))?;

    if let Some(object) = value.as_object_mut() {
        object.insert(
            "aiAnalysis".to_string(),
            serde_json::json!({ "summary": analysis }),
        );
    }

    details.threat_intelligence = serde_json::to_string(&value)
        .map_err(|err| Error::Data(format!("re-serializing threat intelligence: {err}")))?;

    Ok(())
}
