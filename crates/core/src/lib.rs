pub mod domain;
pub mod llm;
pub mod pipeline;
pub mod report;
pub mod session;

pub mod config {
    use crate::domain::tickers::DEFAULT_MAX_STOCKS;

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    pub enum ConfigError {
        #[error("{0} is required")]
        Missing(&'static str),

        #[error("{name} is invalid: {value:?}")]
        Invalid { name: &'static str, value: String },

        #[error("failed to build HTTP client: {0}")]
        HttpClient(String),
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub gemini_api_key: Option<String>,
        pub gemini_base_url: Option<String>,
        pub gemini_model: Option<String>,
        pub gemini_timeout_secs: Option<u64>,
        pub max_stocks: usize,
        pub sentry_dsn: Option<String>,
        pub port: Option<u16>,
    }

    impl Settings {
        pub fn from_env() -> Result<Self, ConfigError> {
            Self::from_lookup(|name| std::env::var(name).ok())
        }

        /// Builds settings from an arbitrary variable source so tests do not touch the process env.
        pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where
            F: Fn(&str) -> Option<String>,
        {
            let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

            let gemini_timeout_secs = match var("GEMINI_TIMEOUT_SECS") {
                Some(v) => Some(v.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: "GEMINI_TIMEOUT_SECS",
                    value: v,
                })?),
                None => None,
            };

            let max_stocks = match var("MAX_STOCKS") {
                Some(v) => v
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::Invalid {
                        name: "MAX_STOCKS",
                        value: v,
                    })?
                    .max(2),
                None => DEFAULT_MAX_STOCKS,
            };

            let port = match var("PORT") {
                Some(v) => Some(v.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                    name: "PORT",
                    value: v,
                })?),
                None => None,
            };

            Ok(Self {
                gemini_api_key: var("GEMINI_API_KEY").or_else(|| var("API_KEY")),
                gemini_base_url: var("GEMINI_BASE_URL"),
                gemini_model: var("GEMINI_MODEL"),
                gemini_timeout_secs,
                max_stocks,
                sentry_dsn: var("SENTRY_DSN"),
                port,
            })
        }

        pub fn require_gemini_api_key(&self) -> Result<&str, ConfigError> {
            self.gemini_api_key
                .as_deref()
                .ok_or(ConfigError::Missing("GEMINI_API_KEY"))
        }
    }

}
