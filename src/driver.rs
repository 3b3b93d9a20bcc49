//! Periodic flush driver.
//!
//! Calls [`DocumentBatcher::flush`] on a fixed interval so documents do not sit
//! in the buffer indefinitely when input is slow. On shutdown the driver runs a
//! final flush and waits for it to settle.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::batcher::DocumentBatcher;
use crate::error_handling::BatchError;
use crate::store::BulkStore;

/// Starts the flush timer task.
///
/// Every `period` the task flushes the batcher if it has pending documents.
/// It does not wait for those flushes to settle; the next flush simply queues
/// behind the previous one. When `cancel` fires, the task performs a final
/// flush, waits for it to settle and returns the number of timer-driven
/// flushes it issued.
pub fn start_flush_timer<S: BulkStore>(
    batcher: Arc<DocumentBatcher<S>>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<Result<usize, BatchError>> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        let mut flushes = 0usize;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("Flush timer stopping, flushing remaining documents...");
                    let report = batcher.flush_and_wait().await?;
                    if report.total_documents() > 0 {
                        log::info!(
                            "Final flush wrote {} of {} documents",
                            report.inserted(),
                            report.total_documents()
                        );
                    }
                    log::info!("Flush timer shutdown complete");
                    return Ok::<usize, BatchError>(flushes);
                }
                _ = ticker.tick() => {
                    if batcher.pending_len() > 0 {
                        log::debug!("Periodic flush of {} documents", batcher.pending_len());
                        // Settlement is tracked by the batcher's flush lock
                        drop(batcher.flush().await);
                        flushes += 1;
                    }
                }
            }
        }
    })
}
