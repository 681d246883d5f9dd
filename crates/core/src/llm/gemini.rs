use crate::config::{ConfigError, Settings};
use crate::llm::error::AnalysisError;
use crate::llm::{AnalysisModel, Citation, RawModelResponse};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let api_key = settings.require_gemini_api_key()?.to_string();
        let base_url = settings
            .gemini_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = settings
            .gemini_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout_secs = settings.gemini_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        // Header values must be visible ASCII; catch a bad key at startup rather than per request.
        HeaderValue::from_str(&api_key).map_err(|_| ConfigError::Invalid {
            name: "GEMINI_API_KEY",
            value: "<redacted>".to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn headers(&self) -> Result<HeaderMap, AnalysisError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| AnalysisError::request_failed(format!("invalid api key header: {e}")))?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }

    async fn generate_content(
        &self,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AnalysisError> {
        let res = self
            .http
            .post(self.url())
            .headers(self.headers()?)
            .json(req)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(AnalysisError::RequestFailed {
                status: Some(status.as_u16()),
                detail: format!("status={status}: {detail}"),
            });
        }

        serde_json::from_str::<GenerateContentResponse>(&text).map_err(|e| {
            AnalysisError::request_failed(format!("undecodable generateContent response: {e}"))
        })
    }
}

#[async_trait::async_trait]
impl AnalysisModel for GeminiClient {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_grounded(&self, prompt: &str) -> Result<RawModelResponse, AnalysisError> {
        let req = GenerateContentRequest::grounded(prompt);
        let res = self.generate_content(&req).await?;
        res.into_raw_response()
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
}

impl GenerateContentRequest {
    fn grounded(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Clone, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Clone, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GenerateContentResponse {
    fn into_raw_response(self) -> Result<RawModelResponse, AnalysisError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let feedback = self
                .prompt_feedback
                .map(|f| f.to_string())
                .unwrap_or_else(|| "none".to_string());
            return Err(AnalysisError::request_failed(format!(
                "response has no candidates (prompt_feedback={feedback})"
            )));
        };

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let citations = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .map(|chunk| match chunk.web {
                Some(web) => Citation {
                    uri: web.uri,
                    title: web.title,
                },
                None => Citation::default(),
            })
            .collect();

        Ok(RawModelResponse { text, citations })
    }
}
