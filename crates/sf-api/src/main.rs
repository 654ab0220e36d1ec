//! API and worker binary.
//!
//! The queue, push channel, and cancellation registry are in-process
//! constructs with no broker behind them, so the HTTP surface and the
//! worker pool run in the same process and share one instance of each.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sf_api::{create_router, metrics::init_metrics, ApiConfig, AppState};
use sf_collab::local::{
    EvenSplitSubtitleGenerator, FfmpegCompositor, FfprobeMediaProbe, PlaceholderAssetProvider,
    SentenceSegmenter, SilentNarrator,
};
use sf_push::PushChannel;
use sf_queue::PriorityQueue;
use sf_ratelimit::RateLimiter;
use sf_store::{JobStore, StoreConfig};
use sf_worker::{WorkerConfig, WorkerPool};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);
    let env_filter = EnvFilter::from_default_env().add_directive("sf=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry().with(fmt::layer().json()).with(env_filter).init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    info!("starting sf-api");

    let api_config = ApiConfig::from_env();
    let worker_config = WorkerConfig::from_env();
    let max_retries = worker_config.max_retries;

    let store = match JobStore::new(StoreConfig::from_env()) {
        Ok(store) => store,
        Err(e) => {
            error!("failed to create job store: {e}");
            std::process::exit(1);
        }
    };
    let queue = PriorityQueue::from_env();
    let push = PushChannel::new();
    let rate_limiter = RateLimiter::from_env();

    std::fs::create_dir_all(&worker_config.pipeline.work_dir).ok();

    let pool = WorkerPool::new(
        worker_config,
        store.clone(),
        queue.clone(),
        push.clone(),
        Arc::new(SentenceSegmenter::new()),
        Arc::new(SilentNarrator::new("./work/narration")),
        Arc::new(FfprobeMediaProbe::new()),
        Arc::new(PlaceholderAssetProvider::new("./work/assets")),
        Arc::new(FfmpegCompositor::new("./work/compose")),
        Arc::new(EvenSplitSubtitleGenerator::new()),
    );

    let cancellations = pool.cancellations();
    pool.recover_pending().await;
    let background = pool.spawn_background_services();

    let state = AppState::new(api_config.clone(), store, queue, push, rate_limiter, cancellations, max_retries);

    let metrics_enabled = std::env::var("METRICS_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);
    let metrics_handle = if metrics_enabled {
        info!("prometheus metrics enabled at /metrics");
        Some(init_metrics())
    } else {
        None
    };

    let app = create_router(state, metrics_handle);

    let addr: SocketAddr = api_config.bind_addr.parse().expect("invalid bind address");
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind");

    tokio::select! {
        _ = pool.run() => {}
        result = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()) => {
            if let Err(e) = result {
                error!("server error: {e}");
            }
            pool.shutdown();
        }
    }

    for handle in background {
        handle.abort();
    }

    info!("sf-api shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("received shutdown signal");
}
