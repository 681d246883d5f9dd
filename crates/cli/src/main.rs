use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use versus_core::domain::tickers::{AddOutcome, TickerSet};
use versus_core::llm::gemini::GeminiClient;
use versus_core::llm::prompt::build_prompt;
use versus_core::pipeline::AnalysisPipeline;
use versus_core::report::render_text;
use versus_core::session::VALIDATION_MESSAGE;

#[derive(Debug, Parser)]
#[command(name = "versus_cli", about = "Compare stocks with a grounded AI analysis")]
struct Args {
    /// Ticker symbols to compare, e.g. `googl msft nvda`.
    #[arg(required = true)]
    tickers: Vec<String>,

    /// Print the prompt that would be sent and exit. No API key needed.
    #[arg(long)]
    dry_run: bool,

    /// Print the analysis as JSON instead of a text report.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = versus_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let tickers = collect_tickers(settings.max_stocks, &args.tickers);
    if !tickers.can_compare() {
        anyhow::bail!(VALIDATION_MESSAGE);
    }
    let request = tickers.snapshot();

    if args.dry_run {
        tracing::info!(tickers = ?request.tickers(), dry_run = true, "printing prompt only");
        println!("{}", build_prompt(request.tickers()));
        return Ok(());
    }

    let client = GeminiClient::from_settings(&settings).context("AI client initialization failed")?;
    let pipeline = AnalysisPipeline::new(Arc::new(client));

    match pipeline.analyze(request.tickers()).await {
        Ok(analysis) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print!("{}", render_text(&analysis));
            }
            Ok(())
        }
        Err(err) => {
            let message = err.user_message();
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            Err(err.context(message))
        }
    }
}

fn collect_tickers(max_stocks: usize, raw: &[String]) -> TickerSet {
    let mut set = TickerSet::new(max_stocks);
    for input in raw {
        match set.add(input) {
            AddOutcome::Added(_) => {}
            AddOutcome::Duplicate(t) => tracing::warn!(ticker = %t, "duplicate ticker ignored"),
            AddOutcome::AtCapacity => tracing::warn!(
                input = %input,
                max_stocks = set.max_stocks(),
                "ticker limit reached; ignoring"
            ),
            AddOutcome::Blank => {}
            AddOutcome::TooLong => tracing::warn!(input = %input, "ticker too long; ignoring"),
        }
    }
    set
}

fn init_sentry(settings: &versus_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_tickers_applies_set_rules() {
        let raw: Vec<String> = ["googl", "MSFT", "googl", "nvda", "amzn", "meta"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let set = collect_tickers(4, &raw);
        assert_eq!(set.as_slice(), ["GOOGL", "MSFT", "NVDA", "AMZN"]);
    }

    #[test]
    fn args_parse_flags_and_tickers() {
        let args = Args::try_parse_from(["versus_cli", "googl", "msft", "--json"]).unwrap();
        assert_eq!(args.tickers, ["googl", "msft"]);
        assert!(args.json);
        assert!(!args.dry_run);
    }

    #[test]
    fn args_require_tickers() {
        assert!(Args::try_parse_from(["versus_cli"]).is_err());
    }
}
