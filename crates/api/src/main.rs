use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use versus_core::domain::tickers::TickerSet;
use versus_core::llm::gemini::GeminiClient;
use versus_core::pipeline::AnalysisPipeline;
use versus_core::session::Session;

mod routes;

const DEFAULT_TICKERS: [&str; 2] = ["GOOGL", "MSFT"];
const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = versus_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // No credential, no server.
    let client = match GeminiClient::from_settings(&settings) {
        Ok(client) => client,
        Err(e) => {
            let err = anyhow::Error::new(e).context("AI client initialization failed");
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{err:#}"), "refusing to start");
            return Err(err);
        }
    };
    tracing::info!(model = client.model(), "gemini client ready");

    let pipeline = AnalysisPipeline::new(Arc::new(client));
    let session = Session::new(TickerSet::with_tickers(settings.max_stocks, DEFAULT_TICKERS));
    let app = routes::router(routes::AppState::new(session, pipeline));

    let port = settings.port.unwrap_or(DEFAULT_PORT);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, max_stocks = settings.max_stocks, "api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
