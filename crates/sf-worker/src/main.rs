//! Worker pool binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sf_collab::local::{
    EvenSplitSubtitleGenerator, FfmpegCompositor, FfprobeMediaProbe, PlaceholderAssetProvider,
    SentenceSegmenter, SilentNarrator,
};
use sf_push::PushChannel;
use sf_queue::PriorityQueue;
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
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    info!("starting sf-worker");

    let config = WorkerConfig::from_env();
    info!(concurrency = config.concurrency, work_dir = ?config.pipeline.work_dir, "worker config loaded");

    let store = match JobStore::new(StoreConfig::from_env()) {
        Ok(store) => store,
        Err(e) => {
            error!("failed to create job store: {e}");
            std::process::exit(1);
        }
    };
    let queue = PriorityQueue::from_env();
    let push = PushChannel::new();

    std::fs::create_dir_all(&config.pipeline.work_dir).ok();

    let pool = WorkerPool::new(
        config,
        store,
        queue,
        push,
        Arc::new(SentenceSegmenter::new()),
        Arc::new(SilentNarrator::new("./work/narration")),
        Arc::new(FfprobeMediaProbe::new()),
        Arc::new(PlaceholderAssetProvider::new("./work/assets")),
        Arc::new(FfmpegCompositor::new("./work/compose")),
        Arc::new(EvenSplitSubtitleGenerator::new()),
    );

    pool.recover_pending().await;
    let background = pool.spawn_background_services();

    let shutdown_handle = tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal");
    });

    tokio::select! {
        _ = pool.run() => {}
        _ = shutdown_handle => {
            pool.shutdown();
        }
    }

    for handle in background {
        handle.abort();
    }

    info!("worker shutdown complete");
}
