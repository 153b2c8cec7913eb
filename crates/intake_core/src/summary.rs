use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::domain::{FormData, FormField};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const SUMMARY_TEMPERATURE: f32 = 0.2;
const FALLBACK_DESCRIPTION_CHARS: usize = 100;

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, form: &FormData) -> Result<String>;
}

/// Used when no AI credential is configured; every filing gets the fallback.
pub struct MissingSummarizer;

#[async_trait]
impl Summarizer for MissingSummarizer {
    async fn summarize(&self, _form: &FormData) -> Result<String> {
        Err(SummaryError::Unconfigured.into())
    }
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summary service is not configured")]
    Unconfigured,
    #[error("summary service returned status {0}")]
    Status(u16),
    #[error("summary service returned no text")]
    EmptyResponse,
}

/// Deterministic stand-in used whenever the summary service fails.
pub fn fallback_summary(form: &FormData) -> String {
    let excerpt: String = form
        .description
        .chars()
        .take(FALLBACK_DESCRIPTION_CHARS)
        .collect();
    format!(
        "Case between {} and {} regarding a claim of INR {}. Description: {}...",
        form.petitioner_name, form.respondent_name, form.claim_amount, excerpt
    )
}

/// Never fails: summary errors degrade to [`fallback_summary`].
pub async fn summarize_or_fallback(summarizer: &dyn Summarizer, form: &FormData) -> String {
    match summarizer.summarize(form).await {
        Ok(summary) => summary,
        Err(err) => {
            warn!("intake: smart summary unavailable, using fallback: {err:#}");
            fallback_summary(form)
        }
    }
}

pub fn build_prompt(form: &FormData) -> String {
    let deadlines = if form.deadline_details.is_empty() {
        "None specified"
    } else {
        form.deadline_details.as_str()
    };

    format!(
        "As a legal analyst for an online dispute resolution provider, provide a professional, \
one-paragraph executive summary of the following dispute for a case management sheet.

Details:
- Petitioner: {petitioner}
- Respondent: {respondent}
- Service Track: {track}
- Stakeholder Class: {stakeholder}
- Claim Value: INR {claim}
- Urgency: {urgency}
- Deadlines: {deadlines}
- Raw Description: {description}

The summary should be objective, formal, and focus on the core legal/commercial conflict.
Avoid bullet points. Max 100 words.",
        petitioner = form.petitioner_name,
        respondent = form.respondent_name,
        track = form.value_of(FormField::ServiceTrack),
        stakeholder = form.value_of(FormField::StakeholderType),
        claim = form.claim_amount,
        urgency = form.value_of(FormField::Urgency),
        description = form.description,
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateContentResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Gemini `generateContent` over REST.
pub struct GeminiSummarizer {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: impl Into<String>, model: &str, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("invalid summary service url '{base_url}'"))?;
        let endpoint = base
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|e| anyhow!("invalid summary model '{model}': {e}"))?;
        Ok(Self {
            http: Client::new(),
            endpoint,
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, form: &FormData) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(form),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: SUMMARY_TEMPERATURE,
            },
        };

        debug!(endpoint = %self.endpoint, "intake: requesting smart summary");
        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("summary request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummaryError::Status(status.as_u16()).into());
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .context("malformed summary response")?;
        body.text().ok_or_else(|| SummaryError::EmptyResponse.into())
    }
}
