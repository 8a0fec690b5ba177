// src/crawl/pool.rs
// =============================================================================
// Starts the worker pool and supervises it.
//
// run_pool() spawns `workers` identical workers. Each one gets its own clone
// of the work stream receiver and a sender for each of the two output
// streams. A supervisor task
// then waits for every worker to finish and only afterwards drops the last
// senders, which closes both output streams.
//
// Closing in exactly one place, after every producer has stopped, means:
// - no worker can ever send on a closed stream
// - when the consumer sees "closed" it really is the end of the data
// =============================================================================

use super::records::{FailureRecord, ResultRecord};
use super::worker::Worker;
use crate::error::CrawlError;
use crate::source::CrawlSource;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const DEFAULT_WORKERS: usize = 50;
const DEFAULT_OUTPUT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// How many workers run at once
    pub workers: usize,
    /// Capacity of the result stream and of the failure stream
    pub output_capacity: usize,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
        }
    }
}

// What the supervisor saw once the pool wound down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolReport {
    pub workers_started: usize,
    pub workers_finished: usize,
    pub workers_panicked: usize,
}

impl PoolReport {
    // Every started worker has signalled completion one way or another
    pub fn all_accounted_for(&self) -> bool {
        self.workers_finished + self.workers_panicked == self.workers_started
    }
}

pub struct PoolHandle {
    /// Downloaded recipes; closes after the last worker exits
    pub results: mpsc::Receiver<ResultRecord>,
    /// Per-page and per-recipe failures; closes after the last worker exits
    pub failures: mpsc::Receiver<FailureRecord>,
    /// Resolves once every worker is done and both streams are closed
    pub supervisor: JoinHandle<PoolReport>,
}

pub fn run_pool<S: CrawlSource>(
    source: Arc<S>,
    token: CancellationToken,
    work: flume::Receiver<u32>,
    options: PoolOptions,
) -> Result<PoolHandle, CrawlError> {
    if options.workers == 0 {
        return Err(CrawlError::Config(
            "worker pool needs at least one worker".to_string(),
        ));
    }
    if options.output_capacity == 0 {
        return Err(CrawlError::Config(
            "output stream capacity must be at least 1".to_string(),
        ));
    }

    let (result_tx, results) = mpsc::channel(options.output_capacity);
    let (failure_tx, failures) = mpsc::channel(options.output_capacity);

    let mut workers = JoinSet::new();
    for id in 0..options.workers {
        let worker = Worker {
            id,
            source: Arc::clone(&source),
            token: token.clone(),
            work: work.clone(),
            results: result_tx.clone(),
            failures: failure_tx.clone(),
        };
        workers.spawn(worker.run());
    }

    info!(workers = options.workers, "worker pool started");

    let supervisor = tokio::spawn(async move {
        let mut report = PoolReport {
            workers_started: options.workers,
            ..PoolReport::default()
        };

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(()) => report.workers_finished += 1,
                Err(e) => {
                    report.workers_panicked += 1;
                    error!(error = %e, "worker task failed");
                }
            }
        }

        debug_assert!(report.all_accounted_for());

        // These are the last senders; dropping them closes both streams
        drop(result_tx);
        drop(failure_tx);

        debug!(?report, "worker pool drained, output streams closed");
        report
    });

    Ok(PoolHandle {
        results,
        failures,
        supervisor,
    })
}
