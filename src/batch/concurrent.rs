use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::pool::run_pool;
use super::{BatchItem, BatchRun};
use crate::browser;
use crate::config::Config;

/// Processes a batch with a pool of headless-browser workers
///
/// Each item gets its own isolated browser session, so a wedged page or a
/// crashed renderer only costs that one item. Cancelling the token lets
/// in-flight sessions finish and prevents new ones from starting.
pub async fn run_concurrent(
    config: Arc<Config>,
    items: Vec<BatchItem>,
    cancel: CancellationToken,
) -> BatchRun {
    info!(
        "Starting browser batch: {} posts across {} workers",
        items.len(),
        config.batch.max_workers
    );

    let workers = config.batch.max_workers;
    let outcomes = run_pool(items, workers, cancel, move |item| {
        let config = config.clone();
        async move { browser::extract_post(&config, &item.label, &item.url).await }
    })
    .await;

    BatchRun::from_outcomes(outcomes)
}
