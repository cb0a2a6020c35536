// src/queue/worker.rs

//! Burst worker: drain all lanes to completion.

use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::context::JobContext;
use crate::pipeline;
use crate::queue::MemoryQueue;

/// Counters for one burst run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BurstStats {
    /// Jobs executed (including failed ones)
    pub executed: usize,
    /// Jobs that returned an error
    pub failed: usize,
}

/// Execute queued jobs until every lane is empty.
///
/// Jobs run concurrently up to the configured limit and are allowed to
/// enqueue follow-up work; the loop keeps draining until nothing is left.
/// A failed job is logged and counted, never retried here; retry policy
/// belongs to the queue transport.
pub async fn run_burst(ctx: &JobContext, queue: &MemoryQueue) -> BurstStats {
    let concurrency = ctx.config.crawler.max_concurrent.max(1);
    let delay = Duration::from_millis(ctx.config.crawler.request_delay_ms);
    let mut stats = BurstStats::default();

    loop {
        let batch = queue.drain_batch(concurrency.saturating_mul(4));
        if batch.is_empty() {
            break;
        }

        let mut results = stream::iter(batch)
            .map(|job| async move {
                let kind = job.kind();
                (kind, pipeline::execute(ctx, job).await)
            })
            .buffer_unordered(concurrency);

        while let Some((kind, result)) = results.next().await {
            stats.executed += 1;
            if let Err(error) = result {
                stats.failed += 1;
                log::error!("{kind} job failed: {error}");
            }
        }

        if delay.as_millis() > 0 && !queue.is_empty() {
            tokio::time::sleep(delay).await;
        }
    }

    stats
}
