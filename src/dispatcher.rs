//! Bounded-concurrency task dispatch
//!
//! A fixed-size pool of workers drains a shared queue of fetch tasks. Pool
//! size comes from configuration, never from the task count, so a large
//! listing cannot spawn an unbounded number of connections. The dispatcher
//! returns only once every submitted task has reached a terminal state.

use crate::fetcher::DocumentFetcher;
use crate::types::{CompletionReport, FetchOutcome, FetchTask};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Drain `tasks` through a pool of at most `max_workers` workers
///
/// Tasks are fully independent: each writes to a distinct target path, so
/// workers share nothing but the queue itself. Completion order is
/// unconstrained. Every task is accounted for in the returned report.
pub async fn dispatch(
    fetcher: Arc<DocumentFetcher>,
    tasks: Vec<FetchTask>,
    max_workers: usize,
) -> CompletionReport {
    if tasks.is_empty() {
        return CompletionReport::default();
    }

    // tasks is non-empty here, so the clamp bounds are well ordered
    let worker_count = max_workers.clamp(1, tasks.len());
    let queue: Arc<Mutex<VecDeque<FetchTask>>> = Arc::new(Mutex::new(tasks.into()));

    let workers = (0..worker_count).map(|_| {
        let queue = Arc::clone(&queue);
        let fetcher = Arc::clone(&fetcher);

        tokio::spawn(async move {
            let mut local = CompletionReport::default();
            loop {
                let task = {
                    let mut guard = queue.lock().await;
                    guard.pop_front()
                };
                let Some(task) = task else { break };

                match fetcher.fetch(&task).await {
                    Ok(FetchOutcome::Written(_)) => local.written += 1,
                    Ok(FetchOutcome::Skipped { .. }) => local.skipped += 1,
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            path = %task.target_path.display(),
                            "Document task failed"
                        );
                        local.failed += 1;
                    }
                }
            }
            local
        })
    });

    let mut report = CompletionReport::default();
    for handle in futures::future::join_all(workers).await {
        match handle {
            Ok(local) => {
                report.written += local.written;
                report.skipped += local.skipped;
                report.failed += local.failed;
            }
            Err(e) => {
                // A panicked worker loses its local counts; log and move on
                tracing::error!(error = %e, "Worker task panicked");
            }
        }
    }
    report
}
