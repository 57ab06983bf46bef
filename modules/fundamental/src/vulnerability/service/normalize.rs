//! Reshapes the raw record plus enrichment results into the flat output
//! document.

use super::context;
use crate::{
    Error,
    vulnerability::model::{
        ActiveThreat, EnrichedWeakness, KnownExploit, MitigationReference, NewsReference,
        VulnerabilityDetails,
        nvd::{CveRecord, CvssData, Descriptions, Reference},
    },
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use vulnscope_common::id::CveId;
use vulnscope_module_enrichment::{EpssScore, ExposureReport};

pub(crate) const NO_DESCRIPTION: &str = "No description available";

/// Collapse the polymorphic description field into a plain string.
pub(crate) fn description(cve: &CveRecord) -> String {
    match &cve.descriptions {
        Descriptions::Localized(items) => items
            .iter()
            .find(|text| text.lang == "en")
            .map(|text| text.value.clone())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        Descriptions::Text(value) => value.clone(),
        Descriptions::Single(single) => single.value.clone(),
        Descriptions::Absent => NO_DESCRIPTION.to_string(),
    }
}

/// The first CVSS v3.1 data block, if any.
pub(crate) fn cvss(cve: &CveRecord) -> Option<&CvssData> {
    cve.metrics
        .as_ref()?
        .cvss_metric_v31
        .first()?
        .cvss_data
        .as_ref()
}

/// The typed view of the reference list. Entries that do not parse are
/// dropped from classification, never from the passthrough.
pub(crate) fn references(cve: &CveRecord) -> Vec<Reference> {
    cve.references
        .iter()
        .filter_map(|value| serde_json::from_value(value.clone()).ok())
        .collect()
}

pub(crate) fn is_exploit_evidence(reference: &Reference) -> bool {
    if reference.tags.iter().any(|tag| tag == "Exploit") {
        return true;
    }

    let url = reference.url.to_lowercase();
    url.contains("exploit") || url.contains("poc") || url.contains("github.com")
}

pub(crate) fn is_advisory_news(reference: &Reference) -> bool {
    if reference
        .tags
        .iter()
        .any(|tag| tag == "News" || tag == "Mailing List")
    {
        return true;
    }

    let url = reference.url.to_lowercase();
    url.contains("news") || url.contains("blog")
}

pub(crate) fn is_mitigation(reference: &Reference) -> bool {
    reference
        .tags
        .iter()
        .any(|tag| tag == "Patch" || tag == "Vendor Advisory")
}

/// Classify every reference into the exploit evidence and news buckets.
/// Exploit evidence wins when a reference matches both. The mitigation
/// bucket is independent of the other two.
fn classify(
    references: &[Reference],
    published: Option<&str>,
) -> (
    Vec<KnownExploit>,
    Vec<NewsReference>,
    Vec<MitigationReference>,
) {
    let mut exploits = Vec::new();
    let mut news = Vec::new();
    let mut mitigations = Vec::new();

    for reference in references {
        if is_exploit_evidence(reference) {
            exploits.push(KnownExploit {
                r#type: "Exploit".into(),
                description: join_tags(reference).unwrap_or_else(|| "Exploit available".into()),
                source: reference.url.clone(),
            });
        } else if is_advisory_news(reference) {
            news.push(NewsReference {
                title: join_tags(reference).unwrap_or_else(|| "Related news".into()),
                description: reference.url.clone(),
                source: reference.url.clone(),
                time: published.map(ToString::to_string).unwrap_or_else(now),
            });
        }

        if is_mitigation(reference) {
            mitigations.push(MitigationReference {
                strategy: join_tags(reference)
                    .unwrap_or_else(|| "Security patch available".into()),
                implementation: reference.url.clone(),
                effectiveness: "High".into(),
            });
        }
    }

    (exploits, news, mitigations)
}

fn join_tags(reference: &Reference) -> Option<String> {
    if reference.tags.is_empty() {
        None
    } else {
        Some(reference.tags.join(", "))
    }
}

fn now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

fn threat_profile(url: &str) -> (&'static str, &'static str) {
    let url = url.to_lowercase();

    if url.contains("github.com") {
        ("GitHub PoC", "Proof of concept code published on GitHub")
    } else if url.contains("exploit-db") {
        ("Exploit-DB", "Exploit published in the Exploit Database")
    } else if url.contains("cve.mitre.org") || url.contains("cve.org") {
        ("CVE Reference", "Tracked in the CVE program records")
    } else if url.contains("nvd.nist.gov") {
        (
            "NVD Reference",
            "Referenced by the National Vulnerability Database",
        )
    } else if url.contains("poc") || url.contains("exploit") {
        (
            "Public PoC",
            "Public proof of concept or exploit code available",
        )
    } else {
        ("Exploit Evidence", "Reference tagged as exploit evidence")
    }
}

/// The richer, de-duplicated view of the exploit evidence bucket. Keyed by
/// (type, description); the last entry wins, first-occurrence order is kept.
pub(crate) fn active_threats(exploits: &[KnownExploit]) -> Vec<ActiveThreat> {
    let mut threats: Vec<ActiveThreat> = Vec::new();
    let mut index: HashMap<(&'static str, &'static str), usize> = HashMap::new();

    for exploit in exploits {
        let (r#type, description) = threat_profile(&exploit.source);
        let threat = ActiveThreat {
            r#type: r#type.into(),
            description: description.into(),
            source: exploit.source.clone(),
            confidence: "High".into(),
        };

        match index.get(&(r#type, description)) {
            Some(&existing) => threats[existing] = threat,
            None => {
                index.insert((r#type, description), threats.len());
                threats.push(threat);
            }
        }
    }

    threats
}

/// All `cpeMatch` criteria across all configuration nodes, flattened.
/// Duplicates are intentionally kept.
pub(crate) fn sectors(cve: &CveRecord) -> Vec<String> {
    cve.configurations
        .iter()
        .flat_map(|configuration| {
            configuration
                .get("nodes")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
        })
        .flat_map(|node| {
            node.get("cpeMatch")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
        })
        .filter_map(|cpe_match| {
            cpe_match
                .get("criteria")
                .and_then(Value::as_str)
                .map(ToString::to_string)
        })
        .collect()
}

/// The pure transformation of (raw record, enrichment results, resolved
/// weaknesses) into the output document.
pub(crate) fn normalize(
    id: &CveId,
    cve: &CveRecord,
    created_at: OffsetDateTime,
    epss: Option<EpssScore>,
    exposure: Option<ExposureReport>,
    weaknesses: Vec<EnrichedWeakness>,
) -> Result<VulnerabilityDetails, Error> {
    let description = description(cve);
    let cvss = cvss(cve);
    let references = references(cve);

    let (exploits, news, mitigations) = classify(&references, cve.published.as_deref());
    let threats = active_threats(&exploits);
    let sectors = sectors(cve);

    let severity = cvss.and_then(|data| data.base_severity.clone());
    let attack_vector = cvss.and_then(|data| data.attack_vector.clone());

    let intelligence =
        context::threat_intelligence(severity.as_deref(), attack_vector.as_deref(), mitigations);

    let related_news = encode(&news)?;
    let context = context::threat_context(severity.as_deref(), news, threats, sectors, weaknesses.clone());

    let identifier = cve.id.clone().unwrap_or_else(|| id.to_string());

    Ok(VulnerabilityDetails {
        id: identifier.clone(),
        cve_id: identifier,
        description,
        cvss_score: cvss.and_then(|data| data.base_score),
        severity,
        published: cve.published.clone(),
        modified: cve.last_modified.clone(),
        epss_score: epss.map(|epss| epss.score),
        epss_percentile: epss.map(|epss| epss.percentile),
        cvss_vector: cvss.and_then(|data| data.vector_string.clone()),
        attack_vector,
        attack_complexity: cvss.and_then(|data| data.attack_complexity.clone()),
        privileges: cvss.and_then(|data| data.privileges_required.clone()),
        user_interaction: cvss.and_then(|data| data.user_interaction.clone()),
        affected_products: encode(&cve.configurations)?,
        known_exploits: encode(&exploits)?,
        related_news,
        references: encode(&cve.references)?,
        weaknesses: encode(&weaknesses)?,
        exposure: exposure.as_ref().map(encode).transpose()?,
        threat_intelligence: encode(&intelligence)?,
        threat_context: encode(&context)?,
        created_at,
    })
}

fn encode<T: Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value)
        .map_err(|err| Error::Data(format!("serializing sub-document: {err}")))
}
