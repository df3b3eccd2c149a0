use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use super::{BatchItem, BatchRun};
use crate::extract::{ExtractOutcome, FailureRecord, PostRecord};

/// Processes batch items one at a time with a fixed pause between them
///
/// Items run in input order. The pause is slept before every item except
/// the first, keeping request pacing polite without stretching single-item
/// batches. A failed item becomes a [`FailureRecord`] and the run moves on;
/// nothing short of process death aborts the batch.
pub async fn run_sequential<F, Fut, E>(items: &[BatchItem], delay: Duration, mut op: F) -> BatchRun
where
    F: FnMut(BatchItem) -> Fut,
    Fut: Future<Output = Result<PostRecord, E>>,
    E: Display,
{
    let mut run = BatchRun::default();

    for (index, item) in items.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        info!("[{}/{}] Processing {}", index + 1, items.len(), item.url);
        match op(item.clone()).await {
            Ok(record) => run.push(ExtractOutcome::Success(record)),
            Err(error) => {
                warn!("Extraction failed for {}: {}", item.url, error);
                run.push(ExtractOutcome::Failure(FailureRecord {
                    label: item.label.clone(),
                    source_url: item.url.clone(),
                    error_description: error.to_string(),
                }));
            }
        }
        info!(
            "Progress: {} ok, {} failed",
            run.success_count(),
            run.failure_count()
        );
    }

    run
}
