use crate::domain::analysis::StockAnalysis;
use crate::domain::tickers::{AddOutcome, AnalysisRequest, TickerSet};
use crate::llm::error::{AnalysisError, AnalysisErrorKind};
use serde::Serialize;

pub const VALIDATION_MESSAGE: &str = "Please add at least two stocks to compare.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "kind", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Requesting,
    Succeeded,
    Failed(AnalysisErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Please add at least two stocks to compare.")]
    Validation,

    #[error("an analysis is already in progress")]
    Busy,
}

/// What a single user sees: the ticker set, the last error message and the last result.
///
/// While a comparison is in flight the session is busy: ticker edits and a second compare are
/// refused, so at most one analysis runs per session.
#[derive(Debug, Clone)]
pub struct Session {
    tickers: TickerSet,
    phase: Phase,
    error: Option<String>,
    analysis: Option<StockAnalysis>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub tickers: Vec<String>,
    pub max_stocks: usize,
    pub can_compare: bool,
    pub phase: Phase,
    pub error: Option<String>,
    pub analysis: Option<StockAnalysis>,
}

impl Session {
    pub fn new(tickers: TickerSet) -> Self {
        Self {
            tickers,
            phase: Phase::Idle,
            error: None,
            analysis: None,
        }
    }

    pub fn tickers(&self) -> &TickerSet {
        &self.tickers
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn analysis(&self) -> Option<&StockAnalysis> {
        self.analysis.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Requesting
    }

    pub fn add_ticker(&mut self, raw: &str) -> Result<AddOutcome, SessionError> {
        self.ensure_idle()?;
        let outcome = self.tickers.add(raw);
        if outcome.is_added() {
            self.error = None;
        }
        Ok(outcome)
    }

    pub fn remove_ticker(&mut self, ticker: &str) -> Result<bool, SessionError> {
        self.ensure_idle()?;
        Ok(self.tickers.remove(ticker))
    }

    /// Validates the compare precondition and moves to `Requesting`.
    ///
    /// On success the previous result and error are cleared and the caller owns the returned
    /// request until it reports back through [`Session::finish`].
    pub fn begin_compare(&mut self) -> Result<AnalysisRequest, SessionError> {
        self.ensure_idle()?;
        if !self.tickers.can_compare() {
            self.error = Some(VALIDATION_MESSAGE.to_string());
            return Err(SessionError::Validation);
        }
        self.error = None;
        self.analysis = None;
        self.phase = Phase::Requesting;
        Ok(self.tickers.snapshot())
    }

    /// Records the outcome of the in-flight comparison. The ticker set is left untouched either way.
    pub fn finish(&mut self, result: Result<StockAnalysis, AnalysisError>) {
        match result {
            Ok(analysis) => {
                self.phase = Phase::Succeeded;
                self.error = None;
                self.analysis = Some(analysis);
            }
            Err(err) => {
                self.phase = Phase::Failed(err.kind());
                self.error = Some(err.user_message().to_string());
                self.analysis = None;
            }
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            tickers: self.tickers.as_slice().to_vec(),
            max_stocks: self.tickers.max_stocks(),
            can_compare: self.tickers.can_compare() && !self.is_busy(),
            phase: self.phase,
            error: self.error.clone(),
            analysis: self.analysis.clone(),
        }
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        Ok(())
    }
}
