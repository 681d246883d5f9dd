use crate::domain::analysis::CHART_LABELS;

const SCHEMA: &str = r#"{
  "recommendation": "string",
  "recommendationReason": "string",
  "stocks": [
    {
      "ticker": "string",
      "companyName": "string",
      "news": ["string"],
      "pros": ["string"],
      "cons": ["string"]
    }
  ],
  "chartData": [
    {
      "name": "string",
      "TICKER1": "number",
      "TICKER2": "number"
    }
  ]
}"#;

pub fn build_prompt(tickers: &[String]) -> String {
    let ticker_list = tickers.join(", ");
    let labels = CHART_LABELS
        .iter()
        .map(|l| format!("\"{l}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let example = chart_example(tickers);

    [
        "You are a world-class senior financial analyst providing a detailed investment report.".to_string(),
        format!("Compare the following stocks: {ticker_list}."),
        "Your analysis must be based on the most recent, publicly available information from today.".to_string(),
        String::new(),
        "Structure your entire response as a single, valid JSON object. Do not include any text, explanation, or markdown formatting before or after the JSON object.".to_string(),
        String::new(),
        "The JSON object must have the following structure:".to_string(),
        SCHEMA.to_string(),
        String::new(),
        "Here are the detailed requirements for each field:".to_string(),
        "- \"recommendation\": A string containing only the ticker symbol of the single stock you most strongly recommend for investment.".to_string(),
        "- \"recommendationReason\": A detailed, multi-sentence paragraph explaining why the recommended stock is the best choice compared to the others. Analyze key metrics, market position, and future outlook.".to_string(),
        "- \"stocks\": An array of objects, one for each ticker provided. The order should match the input tickers.".to_string(),
        "    - \"ticker\": The stock ticker symbol (e.g., \"AAPL\").".to_string(),
        "    - \"companyName\": The full name of the company.".to_string(),
        "    - \"news\": An array of at least 3 strings, each summarizing a recent, significant news item about the company.".to_string(),
        "    - \"pros\": An array of at least 3 strings, outlining the key strengths and investment advantages of this stock.".to_string(),
        "    - \"cons\": An array of at least 3 strings, outlining the key weaknesses and investment risks of this stock.".to_string(),
        format!("- \"chartData\": An array of exactly {} objects for a performance line chart.", CHART_LABELS.len()),
        format!("    - Each object represents a point in time. The \"name\" keys must be exactly: {labels}."),
        format!("    - Each object must also contain keys for each ticker, with a hypothetical normalized performance value from 0 to 100. A value of 100 should represent the peak performance for that stock within this 12-month period. For example: {example}."),
    ]
    .join("\n")
}

fn chart_example(tickers: &[String]) -> String {
    let first = tickers.first().map(String::as_str).unwrap_or("TICKER1");
    let second = tickers.get(1).map(String::as_str).unwrap_or("TICKER2");
    format!(
        "{{ \"name\": \"{}\", \"{first}\": 80, \"{second}\": 85 }}",
        CHART_LABELS[0]
    )
}
