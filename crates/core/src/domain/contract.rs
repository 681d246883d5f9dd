use crate::domain::analysis::{
    ChartDataPoint, GroundingSource, StockAnalysis, StockData, CHART_LABELS,
};
use crate::llm::error::AnalysisError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Payload shape the prompt asks the model for. Sources are not part of it; they come from
/// grounding metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmStockAnalysis {
    pub recommendation: String,
    pub recommendation_reason: String,
    pub stocks: Vec<LlmStockData>,
    pub chart_data: Vec<LlmChartPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmStockData {
    pub ticker: String,
    pub company_name: String,
    #[serde(default)]
    pub pe_ratio: Option<Value>,
    pub news: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmChartPoint {
    pub name: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

macro_rules! ensure_shape {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(AnalysisError::InvalidShape { detail: format!($($arg)+) });
        }
    };
}

impl LlmStockAnalysis {
    /// Checks the payload against the requested tickers and assembles the final result.
    /// Stocks are reordered to match `tickers` when the model permuted them.
    pub fn validate_and_into_analysis(
        self,
        tickers: &[String],
        sources: Vec<GroundingSource>,
    ) -> Result<StockAnalysis, AnalysisError> {
        let recommendation = self.recommendation.trim();
        let recommendation = tickers
            .iter()
            .find(|t| t.eq_ignore_ascii_case(recommendation))
            .cloned();
        ensure_shape!(
            recommendation.is_some(),
            "recommendation {:?} is not one of the requested tickers",
            self.recommendation
        );

        let recommendation_reason = self.recommendation_reason.trim().to_string();
        ensure_shape!(
            !recommendation_reason.is_empty(),
            "recommendationReason must be non-empty"
        );

        let stocks = order_stocks(self.stocks, tickers)?;

        ensure_shape!(
            self.chart_data.len() == CHART_LABELS.len(),
            "chartData must contain exactly {} points (got {})",
            CHART_LABELS.len(),
            self.chart_data.len()
        );
        let chart_data = self
            .chart_data
            .into_iter()
            .zip(CHART_LABELS)
            .map(|(point, label)| point.validate_and_into_point(label, tickers))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StockAnalysis {
            recommendation: recommendation.unwrap_or_default(),
            recommendation_reason,
            stocks,
            chart_data,
            sources,
        })
    }
}

fn order_stocks(
    stocks: Vec<LlmStockData>,
    tickers: &[String],
) -> Result<Vec<StockData>, AnalysisError> {
    ensure_shape!(
        stocks.len() == tickers.len(),
        "stocks must contain one entry per requested ticker (expected {}, got {})",
        tickers.len(),
        stocks.len()
    );

    let mut slots: Vec<Option<StockData>> = vec![None; tickers.len()];
    for stock in stocks {
        let got = stock.ticker.trim().to_string();
        let idx = tickers.iter().position(|t| t.eq_ignore_ascii_case(&got));
        let Some(idx) = idx else {
            return Err(AnalysisError::InvalidShape {
                detail: format!("stocks contains unrequested ticker {got:?}"),
            });
        };
        ensure_shape!(slots[idx].is_none(), "stocks lists {got:?} more than once");
        slots[idx] = Some(stock.into_stock_data(&tickers[idx])?);
    }

    Ok(slots.into_iter().flatten().collect())
}

impl LlmStockData {
    fn into_stock_data(self, ticker: &str) -> Result<StockData, AnalysisError> {
        let company_name = self.company_name.trim().to_string();
        ensure_shape!(
            !company_name.is_empty(),
            "companyName must be non-empty for {ticker}"
        );

        let pe_ratio = match self.pe_ratio {
            Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Ok(StockData {
            ticker: ticker.to_string(),
            company_name,
            pe_ratio,
            news: clean_lines(self.news),
            pros: clean_lines(self.pros),
            cons: clean_lines(self.cons),
        })
    }
}

fn clean_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl LlmChartPoint {
    fn validate_and_into_point(
        mut self,
        expected_label: &str,
        tickers: &[String],
    ) -> Result<ChartDataPoint, AnalysisError> {
        ensure_shape!(
            self.name.trim() == expected_label,
            "chartData label mismatch: expected {expected_label:?}, got {:?}",
            self.name
        );

        let mut values = BTreeMap::new();
        for ticker in tickers {
            let key = self
                .values
                .keys()
                .find(|k| k.trim().eq_ignore_ascii_case(ticker))
                .cloned();
            let raw = key.and_then(|k| self.values.remove(&k));
            let Some(raw) = raw else {
                return Err(AnalysisError::InvalidShape {
                    detail: format!("chartData point {expected_label:?} is missing {ticker}"),
                });
            };
            let value = numeric(&raw);
            let Some(value) = value else {
                return Err(AnalysisError::InvalidShape {
                    detail: format!(
                        "chartData point {expected_label:?} has non-numeric value for {ticker}: {raw}"
                    ),
                });
            };
            ensure_shape!(
                (0.0..=100.0).contains(&value),
                "chartData value for {ticker} at {expected_label:?} must be within 0..=100 (got {value})"
            );
            values.insert(ticker.clone(), value);
        }

        Ok(ChartDataPoint {
            name: expected_label.to_string(),
            values,
        })
    }
}

/// The prompt's schema literally says `"number"`, so some models answer with numeric strings.
fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
