use crate::domain::analysis::StockAnalysis;
use crate::llm::error::{AnalysisError, AnalysisErrorKind};
use crate::llm::{json, prompt, sources, AnalysisModel};
use std::sync::Arc;
use std::time::Instant;

/// Prompt → model round trip → JSON recovery → shape validation → source cleanup.
///
/// One `analyze` call is one request. Failures are classified by [`AnalysisError`] and never
/// retried here.
#[derive(Clone)]
pub struct AnalysisPipeline {
    model: Arc<dyn AnalysisModel>,
}

impl AnalysisPipeline {
    pub fn new(model: Arc<dyn AnalysisModel>) -> Self {
        Self { model }
    }

    pub fn provider_name(&self) -> &'static str {
        self.model.provider_name()
    }

    pub async fn analyze(&self, tickers: &[String]) -> Result<StockAnalysis, AnalysisError> {
        let t0 = Instant::now();
        let provider = self.model.provider_name();
        tracing::info!(?tickers, provider, "requesting stock analysis");

        let result = self.run(tickers).await;
        let elapsed_ms = t0.elapsed().as_millis();

        match &result {
            Ok(analysis) => tracing::info!(
                ?tickers,
                provider,
                elapsed_ms,
                recommendation = %analysis.recommendation,
                sources = analysis.sources.len(),
                "stock analysis succeeded"
            ),
            Err(err) if err.kind() == AnalysisErrorKind::ParseError => tracing::error!(
                ?tickers,
                provider,
                elapsed_ms,
                kind = err.kind().as_str(),
                error = %err,
                raw_output = err.raw_output().unwrap_or_default(),
                "AI response was not valid JSON"
            ),
            Err(err) => tracing::error!(
                ?tickers,
                provider,
                elapsed_ms,
                kind = err.kind().as_str(),
                error = %err,
                "stock analysis failed"
            ),
        }

        result
    }

    async fn run(&self, tickers: &[String]) -> Result<StockAnalysis, AnalysisError> {
        let prompt = prompt::build_prompt(tickers);
        let raw = self.model.generate_grounded(&prompt).await?;
        tracing::debug!(
            text_len = raw.text.len(),
            citations = raw.citations.len(),
            "model response received"
        );

        let payload = json::parse_payload(&raw.text)?;
        let sources = sources::normalize_sources(&raw.citations);
        payload.validate_and_into_analysis(tickers, sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::CHART_LABELS;
    use crate::llm::{Citation, RawModelResponse};
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays canned answers and records every prompt it receives.
    struct FakeModel {
        answer: Mutex<Option<Result<RawModelResponse, AnalysisError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeModel {
        fn answering(text: &str, citations: Vec<Citation>) -> Arc<Self> {
            Arc::new(Self {
                answer: Mutex::new(Some(Ok(RawModelResponse {
                    text: text.to_string(),
                    citations,
                }))),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: AnalysisError) -> Arc<Self> {
            Arc::new(Self {
                answer: Mutex::new(Some(Err(err))),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl AnalysisModel for FakeModel {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn generate_grounded(&self, prompt: &str) -> Result<RawModelResponse, AnalysisError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(AnalysisError::request_failed("no canned answer left")))
        }
    }

    fn well_formed_answer() -> String {
        let chart: Vec<_> = CHART_LABELS
            .iter()
            .enumerate()
            .map(|(i, label)| json!({"name": label, "GOOGL": 70 + i * 6, "MSFT": 90 - i * 3}))
            .collect();
        let body = json!({
            "recommendation": "GOOGL",
            "recommendationReason": "Alphabet combines search cash flows with cloud momentum.",
            "stocks": [
                {
                    "ticker": "GOOGL",
                    "companyName": "Alphabet Inc.",
                    "peRatio": "23.4",
                    "news": ["n1", "n2", "n3"],
                    "pros": ["p1", "p2", "p3"],
                    "cons": ["c1", "c2", "c3"]
                },
                {
                    "ticker": "MSFT",
                    "companyName": "Microsoft Corporation",
                    "news": ["n1", "n2", "n3"],
                    "pros": ["p1", "p2", "p3"],
                    "cons": ["c1", "c2", "c3"]
                }
            ],
            "chartData": chart,
        });
        format!("Here is the analysis you asked for:\n```json\n{body}\n```\nGood luck!")
    }

    fn tickers() -> Vec<String> {
        vec!["GOOGL".to_string(), "MSFT".to_string()]
    }

    fn cite(uri: &str, title: &str) -> Citation {
        Citation {
            uri: Some(uri.to_string()),
            title: Some(title.to_string()),
        }
    }

    #[tokio::test]
    async fn end_to_end_with_mock_response() {
        let model = FakeModel::answering(
            &well_formed_answer(),
            vec![
                cite("https://x.example", "A"),
                cite("https://y.example", "B"),
                cite("https://x.example", "C"),
                cite("", "dropped"),
            ],
        );
        let pipeline = AnalysisPipeline::new(model.clone());

        let analysis = pipeline.analyze(&tickers()).await.unwrap();

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("GOOGL, MSFT"));
        assert!(prompts[0].contains(r#""GOOGL": 80, "MSFT": 85"#));

        assert_eq!(analysis.recommendation, "GOOGL");
        assert_eq!(analysis.tickers(), ["GOOGL", "MSFT"]);
        let labels: Vec<_> = analysis.chart_data.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(labels, CHART_LABELS);
        assert_eq!(analysis.stocks[0].pe_ratio.as_deref(), Some("23.4"));
        assert_eq!(analysis.stocks[1].pe_ratio, None);

        let uris: Vec<_> = analysis.sources.iter().map(|s| s.uri.as_str()).collect();
        assert_eq!(uris, ["https://x.example", "https://y.example"]);
        assert_eq!(analysis.sources[0].title, "A");
    }

    #[tokio::test]
    async fn request_failure_passes_through() {
        let pipeline = AnalysisPipeline::new(FakeModel::failing(AnalysisError::RequestFailed {
            status: Some(503),
            detail: "overloaded".to_string(),
        }));
        let err = pipeline.analyze(&tickers()).await.unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::RequestFailed);
    }

    #[tokio::test]
    async fn braceless_answer_is_malformed() {
        let pipeline = AnalysisPipeline::new(FakeModel::answering("I cannot help with that.", vec![]));
        let err = pipeline.analyze(&tickers()).await.unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn broken_json_is_a_parse_error() {
        let pipeline = AnalysisPipeline::new(FakeModel::answering(
            "{\"recommendation\": \"GOOGL\", }",
            vec![],
        ));
        let err = pipeline.analyze(&tickers()).await.unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::ParseError);
    }

    #[tokio::test]
    async fn wrong_shape_is_rejected() {
        let answer = well_formed_answer().replace("\"Today\"", "\"Now\"");
        let pipeline = AnalysisPipeline::new(FakeModel::answering(&answer, vec![]));
        let err = pipeline.analyze(&tickers()).await.unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::InvalidShape);
    }
}
