pub mod error;
pub mod gemini;
pub mod json;
pub mod prompt;
pub mod sources;

use crate::llm::error::AnalysisError;

/// Free-form answer of the model plus whatever grounding citations came with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawModelResponse {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Citation {
    pub uri: Option<String>,
    pub title: Option<String>,
}

#[async_trait::async_trait]
pub trait AnalysisModel: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// One request/response round trip with live web-search grounding enabled.
    async fn generate_grounded(&self, prompt: &str) -> Result<RawModelResponse, AnalysisError>;
}
