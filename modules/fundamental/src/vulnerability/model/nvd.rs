//! The shape of the stored upstream document.
//!
//! Only the parts the pipeline interprets are typed. Configuration nodes and
//! references stay opaque [`serde_json::Value`]s so they can be passed through
//! to the output unmodified.

use serde::Deserialize;
use serde_json::Value;

/// The stored document, with the record nested under a top level `cve` key.
///
/// A document without that key is a shape violation and fails the lookup.
#[derive(Clone, Debug, Deserialize)]
pub struct CveDocument {
    pub cve: CveRecord,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CveRecord {
    pub id: Option<String>,
    #[serde(default)]
    pub descriptions: Descriptions,
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub configurations: Vec<Value>,
    #[serde(default)]
    pub references: Vec<Value>,
    #[serde(default)]
    pub weaknesses: Vec<Weakness>,
    pub published: Option<String>,
    #[serde(rename = "lastModified")]
    pub last_modified: Option<String>,
}

/// The description field drifted across several shapes in upstream snapshots.
/// All observed variants are modeled here and collapsed into a plain string
/// in one place, by the normalizer.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(untagged)]
pub enum Descriptions {
    Localized(Vec<LocalizedText>),
    Text(String),
    Single(SingleText),
    #[default]
    Absent,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LocalizedText {
    pub lang: String,
    pub value: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SingleText {
    pub value: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Metrics {
    #[serde(rename = "cvssMetricV31", default)]
    pub cvss_metric_v31: Vec<CvssMetric>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CvssMetric {
    #[serde(rename = "cvssData")]
    pub cvss_data: Option<CvssData>,
}

/// One CVSS v3.1 data block. Every field is independently optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvssData {
    pub base_score: Option<f64>,
    pub base_severity: Option<String>,
    pub vector_string: Option<String>,
    pub attack_vector: Option<String>,
    pub attack_complexity: Option<String>,
    pub privileges_required: Option<String>,
    pub user_interaction: Option<String>,
}

/// The typed view of a reference, used for classification. References that
/// do not even carry a URL are ignored by the classifier.
#[derive(Clone, Debug, Deserialize)]
pub struct Reference {
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Weakness {
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub source: Option<String>,
    #[serde(default)]
    pub description: Vec<LocalizedText>,
}
