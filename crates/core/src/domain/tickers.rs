use serde::Serialize;

pub const DEFAULT_MAX_STOCKS: usize = 4;
pub const MIN_COMPARE: usize = 2;
pub const MAX_TICKER_LEN: usize = 10;

/// Outcome of [`TickerSet::add`]. Only `Added` changes the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(String),
    Duplicate(String),
    AtCapacity,
    Blank,
    TooLong,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerSet {
    max_stocks: usize,
    tickers: Vec<String>,
}

impl TickerSet {
    pub fn new(max_stocks: usize) -> Self {
        Self {
            max_stocks: max_stocks.max(MIN_COMPARE),
            tickers: Vec::with_capacity(max_stocks),
        }
    }

    /// Adds each input in order with the same rules as [`TickerSet::add`].
    pub fn with_tickers<I, S>(max_stocks: usize, raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new(max_stocks);
        for t in raw {
            set.add(t.as_ref());
        }
        set
    }

    pub fn add(&mut self, raw: &str) -> AddOutcome {
        let ticker = normalize(raw);
        if ticker.is_empty() {
            return AddOutcome::Blank;
        }
        if ticker.chars().count() > MAX_TICKER_LEN {
            return AddOutcome::TooLong;
        }
        if self.tickers.contains(&ticker) {
            return AddOutcome::Duplicate(ticker);
        }
        if self.is_full() {
            return AddOutcome::AtCapacity;
        }
        self.tickers.push(ticker.clone());
        AddOutcome::Added(ticker)
    }

    /// Exact match only; `remove("aapl")` does not remove `AAPL`.
    pub fn remove(&mut self, ticker: &str) -> bool {
        let before = self.tickers.len();
        self.tickers.retain(|t| t != ticker);
        self.tickers.len() != before
    }

    pub fn can_compare(&self) -> bool {
        self.tickers.len() >= MIN_COMPARE
    }

    pub fn is_full(&self) -> bool {
        self.tickers.len() >= self.max_stocks
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn max_stocks(&self) -> usize {
        self.max_stocks
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tickers
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.tickers.iter().any(|t| t == ticker)
    }

    /// Snapshot taken at submit time; later edits to the set do not affect it.
    pub fn snapshot(&self) -> AnalysisRequest {
        AnalysisRequest {
            tickers: self.tickers.clone(),
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    tickers: Vec<String>,
}

impl AnalysisRequest {
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }
}
