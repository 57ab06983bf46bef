//! Deduplicates and enriches the weakness entries of a raw record.

use crate::vulnerability::model::{
    EnrichedWeakness,
    nvd::{CveRecord, Weakness},
};
use futures::future::join_all;
use std::collections::HashMap;
use vulnscope_module_enrichment::{CweDetails, WeaknessCatalog};

pub(crate) const UNKNOWN_ID: &str = "Unknown";

const IMPLICATION: &str =
    "This weakness could lead to security vulnerabilities if not properly addressed";

/// Derive the canonical taxonomy id from a weakness type field.
///
/// Strips a `Qualifier:` prefix (`Primary:`, `Secondary:`, ...) and forces
/// the canonical `CWE-` form; bare numbers gain the prefix. Anything that
/// cannot be canonicalized maps to `Unknown`.
pub(crate) fn canonical_id(r#type: Option<&str>) -> String {
    let Some(value) = r#type else {
        return UNKNOWN_ID.to_string();
    };

    let value = value
        .split_once(':')
        .map(|(_, rest)| rest)
        .unwrap_or(value)
        .trim();

    if let Some(number) = value.strip_prefix("CWE-") {
        if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) {
            return value.to_string();
        }
    } else if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return format!("CWE-{value}");
    }

    UNKNOWN_ID.to_string()
}

/// The ids eligible for the catalog batch: deduplicated, `Unknown` excluded,
/// first-occurrence order.
pub(crate) fn canonical_ids(cve: &CveRecord) -> Vec<String> {
    let mut ids = Vec::new();

    for weakness in &cve.weaknesses {
        let id = canonical_id(weakness.r#type.as_deref());
        if id != UNKNOWN_ID && !ids.contains(&id) {
            ids.push(id);
        }
    }

    ids
}

fn english_description(weakness: &Weakness) -> Option<String> {
    weakness
        .description
        .iter()
        .find(|text| text.lang == "en")
        .map(|text| text.value.clone())
}

/// Resolve the record's weakness entries into the enriched output list.
///
/// Entries without an English description are skipped, never failed.
/// Entries are deduplicated by canonical id with the last entry winning,
/// while the first occurrence determines the output order. Catalog lookups
/// run as one concurrent batch; each individual failure only loses the
/// `details` of that id.
pub(crate) async fn resolve<W: WeaknessCatalog>(
    catalog: &W,
    cve: &CveRecord,
    severity: Option<&str>,
) -> Vec<EnrichedWeakness> {
    let mut order: Vec<String> = Vec::new();
    let mut descriptions: HashMap<String, String> = HashMap::new();

    for weakness in &cve.weaknesses {
        let Some(description) = english_description(weakness) else {
            continue;
        };

        let id = canonical_id(weakness.r#type.as_deref());
        if !descriptions.contains_key(&id) {
            order.push(id.clone());
        }
        descriptions.insert(id, description);
    }

    let batch: Vec<String> = order
        .iter()
        .filter(|id| *id != UNKNOWN_ID)
        .cloned()
        .collect();
    let resolved = join_all(batch.iter().map(|id| catalog.lookup(id))).await;

    let mut details: HashMap<String, CweDetails> = batch
        .into_iter()
        .zip(resolved)
        .filter_map(|(id, details)| details.map(|details| (id, details)))
        .collect();

    order
        .into_iter()
        .map(|id| EnrichedWeakness {
            description: descriptions.remove(&id).unwrap_or_default(),
            severity: severity.unwrap_or("Unknown").to_string(),
            implication: IMPLICATION.to_string(),
            details: details.remove(&id),
            id,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    /// Serves a canned catalog from a map; `None` for everything else.
    struct FakeCatalog(HashMap<String, CweDetails>);

    impl FakeCatalog {
        fn with(ids: &[&str]) -> Self {
            Self(
                ids.iter()
                    .map(|id| {
                        (
                            id.to_string(),
                            CweDetails {
                                id: id.to_string(),
                                name: format!("{id} name"),
                                description: format!("{id} description"),
                                likelihood: Some("High".into()),
                                status: Some("Stable".into()),
                                consequences: vec![],
                                mitigations: vec![],
                            },
                        )
                    })
                    .collect(),
            )
        }
    }

    impl WeaknessCatalog for FakeCatalog {
        async fn lookup(&self, id: &str) -> Option<CweDetails> {
            self.0.get(id).cloned()
        }
    }

    fn record(weaknesses: serde_json::Value) -> CveRecord {
        serde_json::from_value(json!({"id": "CVE-2024-0001", "weaknesses": weaknesses}))
            .expect("record must parse")
    }

    #[rstest]
    #[case(Some("Primary:CWE-79"), "CWE-79")]
    #[case(Some("Secondary:CWE-89"), "CWE-89")]
    #[case(Some("CWE-79"), "CWE-79")]
    #[case(Some("Primary:79"), "CWE-79")]
    #[case(Some("79"), "CWE-79")]
    #[case(Some("Primary"), UNKNOWN_ID)]
    #[case(Some("NVD-CWE-noinfo"), UNKNOWN_ID)]
    #[case(Some(""), UNKNOWN_ID)]
    #[case(None, UNKNOWN_ID)]
    fn canonical_id_derivation(#[case] r#type: Option<&str>, #[case] expected: &str) {
        assert_eq!(canonical_id(r#type), expected);
    }

    #[test_log::test(tokio::test)]
    async fn duplicate_ids_collapse_with_last_entry_winning() {
        let cve = record(json!([
            {"type": "Primary:CWE-79", "description": [{"lang": "en", "value": "first"}]},
            {"type": "CWE-79", "description": [{"lang": "en", "value": "second"}]}
        ]));

        let resolved = resolve(&FakeCatalog::with(&["CWE-79"]), &cve, Some("HIGH")).await;

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "CWE-79");
        assert_eq!(resolved[0].description, "second");
        assert_eq!(resolved[0].severity, "HIGH");
        assert!(resolved[0].details.is_some());
    }

    #[test_log::test(tokio::test)]
    async fn entries_without_english_description_are_skipped() {
        let cve = record(json!([
            {"type": "CWE-79", "description": [{"lang": "fr", "value": "défaut"}]},
            {"type": "CWE-89", "description": []},
            {"type": "CWE-22", "description": [{"lang": "en", "value": "traversal"}]}
        ]));

        let resolved = resolve(&FakeCatalog::with(&["CWE-22"]), &cve, None).await;

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "CWE-22");
        assert_eq!(resolved[0].severity, "Unknown");
    }

    #[test_log::test(tokio::test)]
    async fn unknown_ids_stay_out_of_the_batch_but_in_the_output() {
        let cve = record(json!([
            {"description": [{"lang": "en", "value": "untyped"}]},
            {"type": "CWE-79", "description": [{"lang": "en", "value": "xss"}]}
        ]));

        assert_eq!(canonical_ids(&cve), vec!["CWE-79"]);

        let resolved = resolve(&FakeCatalog::with(&["CWE-79"]), &cve, None).await;

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].id, UNKNOWN_ID);
        assert!(resolved[0].details.is_none());
        assert_eq!(resolved[1].id, "CWE-79");
        assert!(resolved[1].details.is_some());
    }

    #[test_log::test(tokio::test)]
    async fn catalog_failures_only_lose_details() {
        let cve = record(json!([
            {"type": "CWE-79", "description": [{"lang": "en", "value": "xss"}]},
            {"type": "CWE-89", "description": [{"lang": "en", "value": "sqli"}]}
        ]));

        // the catalog only knows CWE-89
        let resolved = resolve(&FakeCatalog::with(&["CWE-89"]), &cve, None).await;

        assert_eq!(resolved.len(), 2);
        assert!(resolved[0].details.is_none());
        assert!(resolved[1].details.is_some());
    }

    #[test_log::test(tokio::test)]
    async fn first_occurrence_determines_order() {
        let cve = record(json!([
            {"type": "CWE-89", "description": [{"lang": "en", "value": "sqli"}]},
            {"type": "CWE-79", "description": [{"lang": "en", "value": "xss"}]},
            {"type": "Primary:CWE-89", "description": [{"lang": "en", "value": "sqli again"}]}
        ]));

        let resolved = resolve(&FakeCatalog::with(&[]), &cve, None).await;

        assert_eq!(
            resolved.iter().map(|w| w.id.as_str()).collect::<Vec<_>>(),
            vec!["CWE-89", "CWE-79"]
        );
        assert_eq!(resolved[0].description, "sqli again");
    }
}
