use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::BatchItem;
use crate::extract::{ExtractOutcome, FailureRecord, PostRecord};

/// Runs `op` over all items with a fixed pool of workers
///
/// The items are loaded into a closed work queue up front and a bounded
/// number of workers pull from it through a shared receiver. Each settled
/// item is published to a completion channel and collected in completion
/// order, which is generally not input order. Cancelling the token stops
/// workers from pulling new work; items already in flight are allowed to
/// finish, so the returned outcomes cover a prefix-by-count of the batch
/// rather than a prefix of the input order.
pub async fn run_pool<F, Fut, E>(
    items: Vec<BatchItem>,
    workers: usize,
    cancel: CancellationToken,
    op: F,
) -> Vec<ExtractOutcome>
where
    F: Fn(BatchItem) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<PostRecord, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let total = items.len();
    let worker_count = workers.max(1).min(total.max(1));

    let (work_tx, work_rx) = mpsc::channel::<BatchItem>(total.max(1));
    for item in items {
        // capacity covers the whole batch, so this never waits
        if work_tx.send(item).await.is_err() {
            break;
        }
    }
    drop(work_tx);
    let work_rx = Arc::new(Mutex::new(work_rx));

    let (done_tx, mut done_rx) = mpsc::channel::<ExtractOutcome>(total.max(1));

    let mut handles = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        let work_rx = work_rx.clone();
        let done_tx = done_tx.clone();
        let cancel = cancel.clone();
        let op = op.clone();

        handles.push(tokio::spawn(async move {
            loop {
                if cancel.is_cancelled() {
                    debug!("Worker {} stopping: batch cancelled", worker_id);
                    break;
                }

                let item = { work_rx.lock().await.recv().await };
                let Some(item) = item else {
                    debug!("Worker {} stopping: queue drained", worker_id);
                    break;
                };

                debug!("Worker {} picked up {}", worker_id, item.url);
                let outcome = match op(item.clone()).await {
                    Ok(record) => ExtractOutcome::Success(record),
                    Err(error) => ExtractOutcome::Failure(FailureRecord {
                        label: item.label,
                        source_url: item.url,
                        error_description: error.to_string(),
                    }),
                };

                if done_tx.send(outcome).await.is_err() {
                    break;
                }
            }
        }));
    }
    drop(done_tx);

    let mut outcomes = Vec::with_capacity(total);
    while let Some(outcome) = done_rx.recv().await {
        info!(
            "[{}/{}] Settled {}",
            outcomes.len() + 1,
            total,
            outcome.label()
        );
        outcomes.push(outcome);
    }

    for handle in handles {
        let _ = handle.await;
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractError, FetchFailure};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn batch(labels: &[&str]) -> Vec<BatchItem> {
        labels
            .iter()
            .map(|label| BatchItem {
                label: label.to_string(),
                url: format!("https://www.instagram.com/p/{}/", label),
            })
            .collect()
    }

    fn record_for(item: &BatchItem) -> PostRecord {
        PostRecord {
            label: item.label.clone(),
            source_url: item.url.clone(),
            caption_text: "text".to_string(),
            author_handle: "author".to_string(),
            like_count: 0,
            published_at: None,
            media_count: 1,
            is_video: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_settles_every_item() {
        let outcomes = run_pool(
            batch(&["A", "B", "C", "D", "E"]),
            2,
            CancellationToken::new(),
            |item| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, ExtractError>(record_for(&item))
            },
        )
        .await;

        assert_eq!(outcomes.len(), 5);
        let mut labels: Vec<_> = outcomes.iter().map(|o| o.label().to_string()).collect();
        labels.sort();
        assert_eq!(labels, ["A", "B", "C", "D", "E"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_collects_in_completion_order() {
        let outcomes = run_pool(
            batch(&["A", "B", "C"]),
            3,
            CancellationToken::new(),
            |item| async move {
                let wait = match item.label.as_str() {
                    "A" => 30,
                    "B" => 10,
                    _ => 20,
                };
                tokio::time::sleep(Duration::from_millis(wait)).await;
                Ok::<_, ExtractError>(record_for(&item))
            },
        )
        .await;

        let order: Vec<_> = outcomes.iter().map(|o| o.label().to_string()).collect();
        assert_eq!(order, ["B", "C", "A"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_respects_worker_bound() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let peak_reader = peak.clone();

        let outcomes = run_pool(
            batch(&["A", "B", "C", "D", "E", "F", "G", "H"]),
            3,
            CancellationToken::new(),
            move |item| {
                let active = active.clone();
                let peak = peak.clone();
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, ExtractError>(record_for(&item))
                }
            },
        )
        .await;

        assert_eq!(outcomes.len(), 8);
        let observed = peak_reader.load(Ordering::SeqCst);
        assert!(observed <= 3, "peak concurrency was {}", observed);
        assert!(observed >= 2, "workers never overlapped");
    }

    #[tokio::test]
    async fn test_pool_isolates_failures() {
        let outcomes = run_pool(
            batch(&["A", "B", "C", "D", "E"]),
            2,
            CancellationToken::new(),
            |item| async move {
                if item.label == "C" {
                    Err(ExtractError::Fetch(FetchFailure::not_found(
                        "Post not found (HTTP 404)",
                    )))
                } else {
                    Ok(record_for(&item))
                }
            },
        )
        .await;

        assert_eq!(outcomes.len(), 5);
        let failures: Vec<_> = outcomes.iter().filter(|o| !o.is_success()).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].label(), "C");
    }

    #[tokio::test]
    async fn test_pool_cancellation_stops_new_work() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let outcomes = run_pool(
            batch(&["A", "B", "C", "D"]),
            1,
            cancel,
            move |item| {
                let trigger = trigger.clone();
                async move {
                    trigger.cancel();
                    Ok::<_, ExtractError>(record_for(&item))
                }
            },
        )
        .await;

        // the in-flight item finishes, nothing new is pulled
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].label(), "A");
    }

    #[tokio::test]
    async fn test_pool_with_more_workers_than_items() {
        let outcomes = run_pool(
            batch(&["A", "B"]),
            8,
            CancellationToken::new(),
            |item| async move { Ok::<_, ExtractError>(record_for(&item)) },
        )
        .await;
        assert_eq!(outcomes.len(), 2);
    }

    #[tokio::test]
    async fn test_pool_with_no_items() {
        let outcomes = run_pool(Vec::new(), 3, CancellationToken::new(), |item| async move {
            Ok::<_, ExtractError>(record_for(&item))
        })
        .await;
        assert!(outcomes.is_empty());
    }
}
