//! YouTube Transcript Window Server
//!
//! An HTTP service that answers "what was being said around this playback
//! time" for a YouTube video, using the yt-transcript-lib core, plus an
//! optional OpenAI-backed annotation endpoint.

mod config;
mod error;
mod http;
#[cfg(test)]
mod integration;
mod metrics;
mod openai;
mod state;

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, Args, ConfigFile};
use crate::error::Result;
use crate::http::create_router;
use crate::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "yt-transcript-server";

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    let args = Args::parse();
    let file = match &args.config {
        Some(path) => match ConfigFile::from_file(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(
                    "Failed to load config file {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                ConfigFile::default()
            }
        },
        None => ConfigFile::default(),
    };
    let config = AppConfig::from_sources(args, file);
    config.validate()?;
    tracing::info!(
        "Configuration loaded: bind={} youtube_url={} cache_mode={:?} annotation={}",
        config.bind,
        config.youtube_url,
        config.cache.mode,
        if config.openai_api_key.is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );

    let state = Arc::new(AppState::new(config.clone()));

    // Background task: evict expired transcripts every 60 seconds.
    {
        let state_bg = Arc::clone(&state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let removed = state_bg.service.cache().evict_expired();
                if removed > 0 {
                    tracing::info!("Evicted {} expired transcript(s)", removed);
                }
            }
        });
    }

    let app = create_router(state);

    tracing::info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize logging with tracing
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yt_transcript_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
