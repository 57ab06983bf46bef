use crate::config::EnrichmentConfig;
use hide::Hide;
use serde::{Deserialize, Serialize};
use vulnscope_common::id::CveId;

/// Network exposure intelligence for a single vulnerability.
pub trait ExposureLookup {
    fn lookup(&self, id: &CveId) -> impl Future<Output = Option<ExposureReport>>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExposureReport {
    pub summary: String,
    pub matches: Vec<ExposureMatch>,
    pub total: u64,
}

/// One observed network host affected by the vulnerability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExposureMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Client for a Shodan-style host search API.
#[derive(Clone, Debug)]
pub struct ExposureClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<Hide<String>>,
}

impl ExposureClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, anyhow::Error> {
        Ok(Self {
            client: config.client()?,
            url: config.exposure_url.clone(),
            api_key: config.exposure_api_key.clone(),
        })
    }

    async fn fetch(&self, key: &str, id: &CveId) -> Result<ExposureReport, anyhow::Error> {
        let response: SearchResponse = self
            .client
            .get(format!("{}/shodan/host/search", self.url))
            .query(&[("key", key), ("query", &format!("vuln:{id}"))])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(ExposureReport {
            summary: format!(
                "{total} exposed hosts matching {id} observed",
                total = response.total
            ),
            matches: response
                .matches
                .into_iter()
                .map(|m| ExposureMatch {
                    location: m.location.and_then(SearchLocation::render),
                    host: m.ip_str,
                    timestamp: m.timestamp,
                })
                .collect(),
            total: response.total,
        })
    }
}

impl ExposureLookup for ExposureClient {
    async fn lookup(&self, id: &CveId) -> Option<ExposureReport> {
        let Some(key) = &self.api_key else {
            log::debug!("no exposure API credential configured, skipping lookup");
            return None;
        };

        match self.fetch(&key.0, id).await {
            Ok(report) => Some(report),
            Err(err) => {
                log::warn!("exposure lookup for {id} failed: {err}");
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    matches: Vec<SearchMatch>,
    #[serde(default)]
    total: u64,
}

#[derive(Deserialize)]
struct SearchMatch {
    ip_str: Option<String>,
    timestamp: Option<String>,
    location: Option<SearchLocation>,
}

#[derive(Deserialize)]
struct SearchLocation {
    city: Option<String>,
    country_name: Option<String>,
}

impl SearchLocation {
    fn render(self) -> Option<String> {
        match (self.city, self.country_name) {
            (Some(city), Some(country)) => Some(format!("{city}, {country}")),
            (Some(city), None) => Some(city),
            (None, Some(country)) => Some(country),
            (None, None) => None,
        }
    }
}
