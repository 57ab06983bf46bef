use crate::config::EnrichmentConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use vulnscope_common::id::CveId;

/// Exploit prediction scoring for a single vulnerability.
pub trait ExploitPrediction {
    /// Returns the score, or `None` when the provider has no data or the
    /// call failed.
    fn lookup(&self, id: &CveId) -> impl Future<Output = Option<EpssScore>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpssScore {
    /// Exploitation probability in `[0, 1]`
    pub score: f64,
    /// Percentile rank in `[0, 1]`
    pub percentile: f64,
}

/// Client for the FIRST.org EPSS API.
#[derive(Clone, Debug)]
pub struct EpssClient {
    client: reqwest::Client,
    url: String,
}

impl EpssClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, anyhow::Error> {
        Ok(Self {
            client: config.client()?,
            url: config.epss_url.clone(),
        })
    }

    async fn fetch(&self, id: &CveId) -> Result<Option<EpssScore>, anyhow::Error> {
        let response: EpssResponse = self
            .client
            .get(&self.url)
            .query(&[("cve", id.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(record) = response.data.into_iter().next() else {
            return Ok(None);
        };

        // the provider encodes both values as decimal strings
        let score = record.epss.parse().context("malformed epss score")?;
        let percentile = record
            .percentile
            .parse()
            .context("malformed epss percentile")?;

        Ok(Some(EpssScore { score, percentile }))
    }
}

impl ExploitPrediction for EpssClient {
    async fn lookup(&self, id: &CveId) -> Option<EpssScore> {
        match self.fetch(id).await {
            Ok(score) => score,
            Err(err) => {
                log::warn!("EPSS lookup for {id} failed: {err}");
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct EpssResponse {
    #[serde(default)]
    data: Vec<EpssRecord>,
}

#[derive(Deserialize)]
struct EpssRecord {
    epss: String,
    percentile: String,
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use test_log::test;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    async fn client(server: &MockServer) -> EpssClient {
        let mut config = EnrichmentConfig::from_env().expect("config from env");
        config.epss_url = format!("{}/data/v1/epss", server.uri());
        EpssClient::new(&config).expect("client")
    }

    #[test(tokio::test)]
    async fn parses_decimal_strings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/v1/epss"))
            .and(query_param("cve", "CVE-2024-1234"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"cve": "CVE-2024-1234", "epss": "0.42", "percentile": "0.97"}]
            })))
            .mount(&server)
            .await;

        let id = "CVE-2024-1234".parse().unwrap();
        let score = client(&server).await.lookup(&id).await;

        assert_eq!(
            score,
            Some(EpssScore {
                score: 0.42,
                percentile: 0.97
            })
        );
    }

    #[test(tokio::test)]
    async fn empty_result_set_is_absence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/v1/epss"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let id = "CVE-2024-1234".parse().unwrap();
        assert_eq!(client(&server).await.lookup(&id).await, None);
    }

    #[test(tokio::test)]
    async fn transport_error_is_absence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let id = "CVE-2024-1234".parse().unwrap();
        assert_eq!(client(&server).await.lookup(&id).await, None);
    }

    #[test(tokio::test)]
    async fn malformed_payload_is_absence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"cve": "CVE-2024-1234", "epss": "not-a-number", "percentile": "0.5"}]
            })))
            .mount(&server)
            .await;

        let id = "CVE-2024-1234".parse().unwrap();
        assert_eq!(client(&server).await.lookup(&id).await, None);
    }
}
