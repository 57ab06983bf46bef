use crate::config::EnrichmentConfig;
use hide::Hide;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Narrative threat analysis of a vulnerability record.
pub trait ThreatAnalysis {
    /// Returns the analysis text, or `None` when the provider is not
    /// configured, rate limited or otherwise unavailable.
    fn analyze(&self, request: &AnalysisRequest) -> impl Future<Output = Option<String>>;
}

/// The record summary the analysis prompt is built from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisRequest {
    pub id: String,
    pub severity: Option<String>,
    pub score: Option<f64>,
    pub description: String,
    pub weakness_ids: Vec<String>,
    pub attack_vector: Option<String>,
    pub attack_complexity: Option<String>,
    pub privileges_required: Option<String>,
    pub user_interaction: Option<String>,
    pub exploit_references: usize,
    pub vendor_references: usize,
}

/// Client for an OpenAI-compatible chat completion API.
#[derive(Clone, Debug)]
pub struct AnalysisClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<Hide<String>>,
    model: String,
}

const SYSTEM_PROMPT: &str = "You are a senior cybersecurity expert with deep knowledge of \
vulnerability analysis, exploitation techniques, and incident response. Provide comprehensive, \
actionable analysis that helps security teams understand and respond to vulnerabilities \
effectively. Use clear, professional language and structure your response with headers for easy \
reading.";

// keeps the prompt bounded for records with very long descriptions
const MAX_DESCRIPTION_LEN: usize = 1500;

impl AnalysisClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, anyhow::Error> {
        Ok(Self {
            client: config.client()?,
            url: config.analysis_url.clone(),
            api_key: config.analysis_api_key.clone(),
            model: config.analysis_model.clone(),
        })
    }

    async fn complete(
        &self,
        key: &str,
        request: &AnalysisRequest,
    ) -> Result<Option<String>, CompletionError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt(request),
                },
            ],
            max_tokens: 400,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionError::RateLimited);
        }

        let response: ChatResponse = response.error_for_status()?.json().await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

impl ThreatAnalysis for AnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Option<String> {
        let Some(key) = &self.api_key else {
            log::debug!("no analysis API credential configured, skipping narrative analysis");
            return None;
        };

        match self.complete(&key.0, request).await {
            Ok(analysis) => analysis,
            Err(CompletionError::RateLimited) => {
                log::info!("analysis provider rate limited, skipping narrative analysis");
                None
            }
            Err(err) => {
                log::warn!("narrative analysis for {} failed: {err}", request.id);
                None
            }
        }
    }
}

fn prompt(request: &AnalysisRequest) -> String {
    let severity = request.severity.as_deref().unwrap_or("Unknown");
    let score = request
        .score
        .map(|score| score.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let weaknesses = if request.weakness_ids.is_empty() {
        "No CWE information available".to_string()
    } else {
        format!("CWE IDs: {}", request.weakness_ids.join(", "))
    };

    format!(
        r#"Analyze CVE {id} with the following information:

**Basic Information:**
- Severity: {severity} (CVSS: {score})
- Description: {description}
- {weaknesses}

**CVSS Metrics:**
- Attack Vector: {attack_vector}
- Attack Complexity: {attack_complexity}
- Privileges Required: {privileges}
- User Interaction: {user_interaction}

**References Found:**
- Exploit References: {exploits} found
- Vendor Advisories: {vendors} found

Provide a comprehensive analysis covering:

**1. Key Risks**
**2. Exploitation Status**
**3. Impact Analysis**
**4. Mitigation & Remediation**
**5. CWE Context**

Keep the analysis concise but comprehensive. Focus on actionable insights for security teams."#,
        id = request.id,
        description = truncate(&request.description, MAX_DESCRIPTION_LEN),
        attack_vector = request.attack_vector.as_deref().unwrap_or("Unknown"),
        attack_complexity = request.attack_complexity.as_deref().unwrap_or("Unknown"),
        privileges = request.privileges_required.as_deref().unwrap_or("Unknown"),
        user_interaction = request.user_interaction.as_deref().unwrap_or("Unknown"),
        exploits = request.exploit_references,
        vendors = request.vendor_references,
    )
}

fn truncate(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }

    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[derive(Debug, thiserror::Error)]
enum CompletionError {
    #[error("analysis provider rate limited")]
    RateLimited,
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
