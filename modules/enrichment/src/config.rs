use hide::Hide;
use std::time::Duration;

/// Configuration for the external enrichment providers.
///
/// Clients are constructed once at startup from this configuration and passed
/// into the lookup service explicitly.
#[derive(clap::Args, Debug, Clone)]
#[command(next_help_heading = "Enrichment providers")]
pub struct EnrichmentConfig {
    /// Base URL of the EPSS scoring API
    #[arg(
        id = "epss-url",
        long,
        env = "VULNSCOPE_EPSS_URL",
        default_value = "https://api.first.org/data/v1/epss"
    )]
    pub epss_url: String,

    /// Base URL of the exposure intelligence API
    #[arg(
        id = "exposure-url",
        long,
        env = "VULNSCOPE_EXPOSURE_URL",
        default_value = "https://api.shodan.io"
    )]
    pub exposure_url: String,

    /// API key for the exposure intelligence provider. Exposure enrichment is
    /// skipped when unset.
    #[arg(id = "exposure-api-key", long, env = "VULNSCOPE_EXPOSURE_API_KEY")]
    pub exposure_api_key: Option<Hide<String>>,

    /// Base URL of the OpenAI-compatible narrative analysis API
    #[arg(
        id = "analysis-url",
        long,
        env = "VULNSCOPE_ANALYSIS_URL",
        default_value = "https://api.openai.com"
    )]
    pub analysis_url: String,

    /// API key for the narrative analysis provider. Narrative analysis is
    /// skipped when unset.
    #[arg(id = "analysis-api-key", long, env = "VULNSCOPE_ANALYSIS_API_KEY")]
    pub analysis_api_key: Option<Hide<String>>,

    /// Model requested from the narrative analysis provider
    #[arg(
        id = "analysis-model",
        long,
        env = "VULNSCOPE_ANALYSIS_MODEL",
        default_value = "gpt-4o-mini"
    )]
    pub analysis_model: String,

    /// Base URL of the CWE catalog API
    #[arg(
        id = "cwe-url",
        long,
        env = "VULNSCOPE_CWE_URL",
        default_value = "https://cwe-api.mitre.org/api/v1"
    )]
    pub cwe_url: String,

    /// Timeout applied to every provider call
    #[arg(
        id = "enrichment-timeout",
        long,
        env = "VULNSCOPE_ENRICHMENT_TIMEOUT",
        default_value = "10s",
        value_parser = humantime::parse_duration
    )]
    pub timeout: Duration,
}

impl EnrichmentConfig {
    /// Evaluate the configuration from the environment only.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        #[derive(clap::Parser)]
        struct Env {
            #[command(flatten)]
            enrichment: EnrichmentConfig,
        }

        Ok(<Env as clap::Parser>::try_parse_from(["env"])?.enrichment)
    }

    pub(crate) fn client(&self) -> Result<reqwest::Client, anyhow::Error> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }
}
