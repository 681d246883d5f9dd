use crate::domain::analysis::{ChartDataPoint, StockAnalysis, StockData};
use std::fmt;

const NOT_AVAILABLE: &str = "N/A";

/// Plain-text report with the same sections the web page shows.
pub struct TextReport<'a>(pub &'a StockAnalysis);

pub fn render_text(analysis: &StockAnalysis) -> String {
    TextReport(analysis).to_string()
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = self.0;

        writeln!(f, "== AI Investment Recommendation ==")?;
        writeln!(f, "{}", analysis.recommendation)?;
        writeln!(f, "{}\n", analysis.recommendation_reason)?;

        writeln!(f, "== Normalized Performance (12 Months) ==")?;
        let tickers = analysis.tickers();
        writeln!(f, "{}", ChartTable::new(&tickers, &analysis.chart_data))?;

        for stock in &analysis.stocks {
            writeln!(f, "{}", StockCard(stock))?;
        }

        if !analysis.sources.is_empty() {
            writeln!(f, "== Sources ==")?;
            for source in &analysis.sources {
                let label = if source.title.is_empty() {
                    &source.uri
                } else {
                    &source.title
                };
                writeln!(f, "- {label} <{}>", source.uri)?;
            }
        }

        Ok(())
    }
}

struct StockCard<'a>(&'a StockData);

impl fmt::Display for StockCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stock = self.0;
        writeln!(f, "== {} ({}) ==", stock.company_name, stock.ticker)?;
        writeln!(
            f,
            "P/E Ratio: {}",
            stock.pe_ratio.as_deref().unwrap_or(NOT_AVAILABLE)
        )?;
        for (title, lines) in [
            ("Recent News", &stock.news),
            ("Pros", &stock.pros),
            ("Cons", &stock.cons),
        ] {
            writeln!(f, "{title}:")?;
            for line in lines {
                writeln!(f, "  - {line}")?;
            }
        }
        Ok(())
    }
}

/// Labels as rows, tickers as columns.
pub struct ChartTable<'a> {
    tickers: &'a [&'a str],
    points: &'a [ChartDataPoint],
}

impl<'a> ChartTable<'a> {
    pub fn new(tickers: &'a [&'a str], points: &'a [ChartDataPoint]) -> Self {
        Self { tickers, points }
    }
}

impl fmt::Display for ChartTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .points
            .iter()
            .map(|p| p.name.len())
            .max()
            .unwrap_or(0)
            .max("Period".len());
        let widths: Vec<usize> = self.tickers.iter().map(|t| t.len().max(6)).collect();

        write!(f, "{:<label_width$}", "Period")?;
        for (t, w) in self.tickers.iter().zip(widths.iter().copied()) {
            write!(f, " | {t:>w$}")?;
        }
        writeln!(f)?;

        for point in self.points {
            write!(f, "{:<label_width$}", point.name)?;
            for (t, w) in self.tickers.iter().zip(widths.iter().copied()) {
                match point.value(t) {
                    Some(v) => write!(f, " | {v:>w$.1}")?,
                    None => write!(f, " | {NOT_AVAILABLE:>w$}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{GroundingSource, CHART_LABELS};
    use std::collections::BTreeMap;

    fn analysis() -> StockAnalysis {
        let chart_data = CHART_LABELS
            .iter()
            .map(|label| ChartDataPoint {
                name: label.to_string(),
                values: BTreeMap::from([("GOOGL".to_string(), 80.0), ("MSFT".to_string(), 85.0)]),
            })
            .collect();
        let stock = |ticker: &str, pe: Option<&str>| StockData {
            ticker: ticker.to_string(),
            company_name: format!("{ticker} Inc."),
            pe_ratio: pe.map(str::to_string),
            news: vec!["earnings beat".to_string()],
            pros: vec!["cash rich".to_string()],
            cons: vec!["regulation".to_string()],
        };
        StockAnalysis {
            recommendation: "GOOGL".to_string(),
            recommendation_reason: "Because.".to_string(),
            stocks: vec![stock("GOOGL", Some("23.4")), stock("MSFT", None)],
            chart_data,
            sources: vec![GroundingSource {
                uri: "https://x.example".to_string(),
                title: "X News".to_string(),
            }],
        }
    }

    #[test]
    fn renders_all_sections() {
        let text = render_text(&analysis());
        assert!(text.contains("== AI Investment Recommendation ==\nGOOGL\nBecause."));
        assert!(text.contains("== GOOGL Inc. (GOOGL) ==\nP/E Ratio: 23.4"));
        assert!(text.contains("== MSFT Inc. (MSFT) ==\nP/E Ratio: N/A"));
        assert!(text.contains("Recent News:\n  - earnings beat"));
        assert!(text.contains("- X News <https://x.example>"));
    }

    #[test]
    fn chart_table_has_header_and_one_row_per_label() {
        let a = analysis();
        let tickers = a.tickers();
        let table = ChartTable::new(&tickers, &a.chart_data).to_string();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 1 + CHART_LABELS.len());
        assert!(lines[0].starts_with("Period"));
        assert!(lines[0].contains("GOOGL") && lines[0].contains("MSFT"));
        assert!(lines[1].starts_with("12M Ago"));
        assert!(lines[1].contains("80.0"));
        assert!(lines[6].starts_with("Today"));
    }

    #[test]
    fn no_sources_section_when_empty() {
        let mut a = analysis();
        a.sources.clear();
        assert!(!render_text(&a).contains("== Sources =="));
    }
}
