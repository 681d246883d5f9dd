use serde::Serialize;

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to get analysis. The AI may be experiencing high traffic or the response was invalid. Please try again later.";
pub const INVALID_JSON_MESSAGE: &str = "Failed to parse the AI's response. It was not valid JSON.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisErrorKind {
    RequestFailed,
    MalformedResponse,
    ParseError,
    InvalidShape,
}

impl AnalysisErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisErrorKind::RequestFailed => "request_failed",
            AnalysisErrorKind::MalformedResponse => "malformed_response",
            AnalysisErrorKind::ParseError => "parse_error",
            AnalysisErrorKind::InvalidShape => "invalid_shape",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Transport failure, non-2xx status or an error body from the service.
    #[error("AI service request failed: {detail}")]
    RequestFailed {
        status: Option<u16>,
        detail: String,
    },

    #[error("Invalid JSON response: no curly braces found")]
    MalformedResponse { raw_output: String },

    #[error("AI response is not valid JSON: {source}")]
    ParseError {
        #[source]
        source: serde_json::Error,
        raw_output: String,
    },

    #[error("AI response does not match the analysis schema: {detail}")]
    InvalidShape { detail: String },
}

impl AnalysisError {
    pub fn request_failed(detail: impl Into<String>) -> Self {
        AnalysisError::RequestFailed {
            status: None,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> AnalysisErrorKind {
        match self {
            AnalysisError::RequestFailed { .. } => AnalysisErrorKind::RequestFailed,
            AnalysisError::MalformedResponse { .. } => AnalysisErrorKind::MalformedResponse,
            AnalysisError::ParseError { .. } => AnalysisErrorKind::ParseError,
            AnalysisError::InvalidShape { .. } => AnalysisErrorKind::InvalidShape,
        }
    }

    /// Text shown to the user. Only the invalid-JSON case gets its own wording.
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::ParseError { .. } => INVALID_JSON_MESSAGE,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }

    pub fn raw_output(&self) -> Option<&str> {
        match self {
            AnalysisError::MalformedResponse { raw_output }
            | AnalysisError::ParseError { raw_output, .. } => Some(raw_output),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::RequestFailed {
            status: err.status().map(|s| s.as_u16()),
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_has_its_own_message() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AnalysisError::ParseError {
            source,
            raw_output: "{".to_string(),
        };
        assert_eq!(err.kind(), AnalysisErrorKind::ParseError);
        assert_eq!(err.user_message(), INVALID_JSON_MESSAGE);
        assert_eq!(err.raw_output(), Some("{"));
    }

    #[test]
    fn other_kinds_share_the_generic_message() {
        let errs = [
            AnalysisError::request_failed("timeout"),
            AnalysisError::MalformedResponse {
                raw_output: "nope".to_string(),
            },
            AnalysisError::InvalidShape {
                detail: "x".to_string(),
            },
        ];
        for err in &errs {
            assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        }
        assert_eq!(errs[0].kind().as_str(), "request_failed");
        assert_eq!(
            serde_json::to_value(errs[1].kind()).unwrap(),
            serde_json::json!("malformed_response")
        );
    }
}
