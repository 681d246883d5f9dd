use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Time labels of the normalized performance chart, oldest first.
pub const CHART_LABELS: [&str; 6] = ["12M Ago", "9M Ago", "6M Ago", "3M Ago", "1M Ago", "Today"];

pub const UNTITLED_SOURCE: &str = "Untitled Source";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAnalysis {
    pub recommendation: String,
    pub recommendation_reason: String,
    pub stocks: Vec<StockData>,
    pub chart_data: Vec<ChartDataPoint>,
    pub sources: Vec<GroundingSource>,
}

impl StockAnalysis {
    pub fn tickers(&self) -> Vec<&str> {
        self.stocks.iter().map(|s| s.ticker.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockData {
    pub ticker: String,
    pub company_name: String,
    pub pe_ratio: Option<String>,
    pub news: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// One chart row: `{"name": "12M Ago", "GOOGL": 80, "MSFT": 85}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub name: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl ChartDataPoint {
    pub fn value(&self, ticker: &str) -> Option<f64> {
        self.values.get(ticker).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}
