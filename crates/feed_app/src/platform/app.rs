use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use feed_engine::{EngineEvent, FeedEngine, FeedReader, ReqwestFeedFetcher};
use feed_logging::{feed_debug, feed_error, feed_info, feed_warn};

use super::config::{FeedConfig, CONFIG_FILENAME};
use super::logging::{self, LogDestination};
use super::ui;

/// Runs the feed until Ctrl-C. The optional first argument names the config file.
pub async fn run_app() -> anyhow::Result<()> {
    let dotenv_path = dotenvy::dotenv().ok();
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

    let config = FeedConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    logging::initialize(LogDestination::Both, config.log_level()?);
    if let Some(path) = dotenv_path {
        feed_info!("loaded environment from {path:?}");
    }

    let settings = config.engine_settings()?;
    let fetcher = ReqwestFeedFetcher::new(config.backend_url.as_deref(), config.fetch_settings());
    match fetcher.endpoint() {
        Some(endpoint) => feed_info!("polling {endpoint} every {:?}", settings.poll_interval),
        None => feed_warn!("no usable backend url configured; every poll will fail"),
    }

    let mut engine = FeedEngine::start(Arc::new(fetcher), settings);
    let reader = engine.reader();
    print_lines(ui::render::render(&reader.view()));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(err) = result {
                    feed_error!("failed to listen for Ctrl-C: {err}");
                }
                break;
            }
            event = engine.next_event() => match event {
                Some(event) => {
                    log_event(&event);
                    render_if_dirty(&reader);
                }
                None => break,
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}

fn log_event(event: &EngineEvent) {
    match event {
        EngineEvent::CycleCompleted {
            generation,
            outcome,
        } => feed_debug!("cycle {generation} {outcome}"),
        EngineEvent::DeltaCleared { token } => feed_debug!("delta {token} cleared"),
    }
}

fn render_if_dirty(reader: &FeedReader) {
    if let Some(view) = reader.take_dirty_view() {
        print_lines(ui::render::render(&view));
    }
}

fn print_lines(lines: Vec<String>) {
    println!();
    for line in lines {
        println!("{line}");
    }
}
