#![allow(clippy::expect_used)]

use serde_json::json;
use test_context::test_context;
use test_log::test;
use vulnscope_common::id::CveId;
use vulnscope_module_enrichment::{
    AnalysisRequest, CweDetails, EpssScore, ExploitPrediction, ExposureLookup, ExposureReport,
    ThreatAnalysis, WeaknessCatalog,
};
use vulnscope_module_fundamental::vulnerability::service::VulnerabilityService;
use vulnscope_test_context::VulnscopeContext;

/// Every provider fails or is unconfigured.
struct Offline;

impl ExploitPrediction for Offline {
    async fn lookup(&self, _: &CveId) -> Option<EpssScore> {
        None
    }
}

impl ExposureLookup for Offline {
    async fn lookup(&self, _: &CveId) -> Option<ExposureReport> {
        None
    }
}

impl ThreatAnalysis for Offline {
    async fn analyze(&self, _: &AnalysisRequest) -> Option<String> {
        None
    }
}

impl WeaknessCatalog for Offline {
    async fn lookup(&self, _: &str) -> Option<CweDetails> {
        None
    }
}

/// Every provider answers.
struct Online;

impl ExploitPrediction for Online {
    async fn lookup(&self, _: &CveId) -> Option<EpssScore> {
        Some(EpssScore {
            score: 0.42,
            percentile: 0.97,
        })
    }
}

impl ExposureLookup for Online {
    async fn lookup(&self, id: &CveId) -> Option<ExposureReport> {
        Some(ExposureReport {
            summary: format!("2 exposed hosts matching {id} observed"),
            matches: vec![],
            total: 2,
        })
    }
}

impl ThreatAnalysis for Online {
    async fn analyze(&self, _: &AnalysisRequest) -> Option<String> {
        Some("Patch immediately.".to_string())
    }
}

impl WeaknessCatalog for Online {
    async fn lookup(&self, id: &str) -> Option<CweDetails> {
        Some(CweDetails {
            id: id.to_string(),
            name: "Cross-site Scripting".to_string(),
            description: "Improper neutralization of input.".to_string(),
            likelihood: Some("High".to_string()),
            status: Some("Stable".to_string()),
            consequences: vec![],
            mitigations: vec![],
        })
    }
}

fn sample_document() -> serde_json::Value {
    json!({"cve": {
        "id": "CVE-2024-0001",
        "descriptions": [{"lang": "en", "value": "Sample flaw"}],
        "metrics": {"cvssMetricV31": [{"cvssData": {
            "baseScore": 9.8,
            "baseSeverity": "CRITICAL",
            "vectorString": "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H",
            "attackVector": "NETWORK",
            "attackComplexity": "LOW",
            "privilegesRequired": "NONE",
            "userInteraction": "NONE"
        }}]},
        "references": [{"url": "https://github.com/x/poc", "tags": ["Exploit"]}],
        "weaknesses": [{
            "type": "Primary:CWE-79",
            "description": [{"lang": "en", "value": "Cross-site scripting"}]
        }],
        "published": "2024-01-01T00:00:00.000Z",
        "lastModified": "2024-02-01T00:00:00.000Z"
    }})
}

#[test_context(VulnscopeContext)]
#[test(tokio::test)]
async fn lookup_degrades_when_every_provider_fails(
    ctx: &VulnscopeContext,
) -> Result<(), anyhow::Error> {
    ctx.ingest_document("CVE-2024-0001", sample_document())
        .await?;

    let service = VulnerabilityService::new(Offline, Offline, Offline, Offline);
    let id: CveId = "CVE-2024-0001".parse()?;

    let details = service
        .lookup(&id, &ctx.db)
        .await?
        .expect("document must be produced");

    assert_eq!(details.id, "CVE-2024-0001");
    assert_eq!(details.description, "Sample flaw");
    assert_eq!(details.cvss_score, Some(9.8));
    assert_eq!(details.severity.as_deref(), Some("CRITICAL"));
    assert_eq!(
        details.cvss_vector.as_deref(),
        Some("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H")
    );

    // every enrichment absence degrades to null
    assert_eq!(details.epss_score, None);
    assert_eq!(details.epss_percentile, None);
    assert_eq!(details.exposure, None);

    let exploits: serde_json::Value = serde_json::from_str(&details.known_exploits)?;
    assert_eq!(exploits.as_array().map(Vec::len), Some(1));
    assert_eq!(exploits[0]["source"], "https://github.com/x/poc");

    let news: serde_json::Value = serde_json::from_str(&details.related_news)?;
    assert_eq!(news.as_array().map(Vec::len), Some(0));

    let weaknesses: serde_json::Value = serde_json::from_str(&details.weaknesses)?;
    assert_eq!(weaknesses.as_array().map(Vec::len), Some(1));
    assert_eq!(weaknesses[0]["id"], "CWE-79");
    assert!(weaknesses[0].get("details").is_none());

    let intelligence: serde_json::Value = serde_json::from_str(&details.threat_intelligence)?;
    let priorities: Vec<&str> = intelligence["recommendations"]
        .as_array()
        .expect("recommendations must be a list")
        .iter()
        .filter_map(|recommendation| recommendation["priority"].as_str())
        .collect();
    assert_eq!(priorities, vec!["High", "Medium", "High"]);
    assert!(intelligence.get("aiAnalysis").is_none());

    let context: serde_json::Value = serde_json::from_str(&details.threat_context)?;
    assert_eq!(context["industryImpact"]["severity"], "CRITICAL");
    assert_eq!(context["activeThreats"][0]["type"], "GitHub PoC");

    Ok(())
}

#[test_context(VulnscopeContext)]
#[test(tokio::test)]
async fn lookup_attaches_enrichment_results(ctx: &VulnscopeContext) -> Result<(), anyhow::Error> {
    ctx.ingest_document("CVE-2024-0001", sample_document())
        .await?;

    let service = VulnerabilityService::new(Online, Online, Online, Online);
    let id: CveId = "CVE-2024-0001".parse()?;

    let details = service
        .lookup(&id, &ctx.db)
        .await?
        .expect("document must be produced");

    assert_eq!(details.epss_score, Some(0.42));
    assert_eq!(details.epss_percentile, Some(0.97));

    let exposure: serde_json::Value =
        serde_json::from_str(details.exposure.as_deref().expect("exposure must be set"))?;
    assert_eq!(exposure["total"], 2);

    // the narrative analysis was merged into the serialized object
    let intelligence: serde_json::Value = serde_json::from_str(&details.threat_intelligence)?;
    assert_eq!(intelligence["aiAnalysis"]["summary"], "Patch immediately.");
    assert_eq!(intelligence["threatLevel"], "CRITICAL");

    let weaknesses: serde_json::Value = serde_json::from_str(&details.weaknesses)?;
    assert_eq!(weaknesses[0]["details"]["name"], "Cross-site Scripting");

    Ok(())
}

#[test_context(VulnscopeContext)]
#[test(tokio::test)]
async fn unknown_identifier_is_not_found(ctx: &VulnscopeContext) -> Result<(), anyhow::Error> {
    let service = VulnerabilityService::new(Offline, Offline, Offline, Offline);
    let id: CveId = "CVE-2024-9999".parse()?;

    assert!(service.lookup(&id, &ctx.db).await?.is_none());

    Ok(())
}

#[test_context(VulnscopeContext)]
#[test(tokio::test)]
async fn malformed_document_fails_the_lookup(ctx: &VulnscopeContext) -> Result<(), anyhow::Error> {
    // record exists, but the core substructure is missing
    ctx.ingest_document("CVE-2024-0002", json!({"vendor": "data"}))
        .await?;

    let service = VulnerabilityService::new(Offline, Offline, Offline, Offline);
    let id: CveId = "CVE-2024-0002".parse()?;

    assert!(service.lookup(&id, &ctx.db).await.is_err());

    Ok(())
}

#[test_context(VulnscopeContext)]
#[test(tokio::test)]
async fn count_reflects_stored_records(ctx: &VulnscopeContext) -> Result<(), anyhow::Error> {
    let service = VulnerabilityService::new(Offline, Offline, Offline, Offline);
    assert_eq!(service.count(&ctx.db).await?, 0);

    ctx.ingest_document("CVE-2024-0001", sample_document())
        .await?;
    ctx.ingest_document("CVE-2024-0002", sample_document())
        .await?;

    assert_eq!(service.count(&ctx.db).await?, 2);

    Ok(())
}
