// src/crawl/consumer.rs
// =============================================================================
// The receiving end of the pipeline.
//
// drain() reads from the result stream and the failure stream at the same
// time, handing each record to a callback as soon as it arrives. Each stream
// has its own "still open" flag: once a stream reports closed, its select!
// branch is switched off so we never poll it again. The loop ends when both
// flags are down.
// =============================================================================

use super::records::{FailureRecord, ResultRecord};
use tokio::sync::mpsc;
use tracing::debug;

// How many records came out of each stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub results: usize,
    pub failures: usize,
}

pub async fn drain<R, F>(
    mut results: mpsc::Receiver<ResultRecord>,
    mut failures: mpsc::Receiver<FailureRecord>,
    mut on_result: R,
    mut on_failure: F,
) -> DrainSummary
where
    R: FnMut(ResultRecord),
    F: FnMut(FailureRecord),
{
    let mut summary = DrainSummary::default();
    let mut results_open = true;
    let mut failures_open = true;

    while results_open || failures_open {
        tokio::select! {
            result = results.recv(), if results_open => match result {
                Some(record) => {
                    summary.results += 1;
                    on_result(record);
                }
                None => {
                    debug!("result stream closed");
                    results_open = false;
                }
            },
            failure = failures.recv(), if failures_open => match failure {
                Some(record) => {
                    summary.failures += 1;
                    on_failure(record);
                }
                None => {
                    debug!("failure stream closed");
                    failures_open = false;
                }
            },
        }
    }

    summary
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does `, if results_open` mean inside select!?
//    - It is a precondition: when false, that branch is not polled at all
//    - A closed mpsc receiver returns None forever, so without the flag the
//      loop would spin on it
//
// 2. Why FnMut for the callbacks?
//    - The callbacks are called many times and may change what they capture
//      (pushing into a Vec, bumping a counter)
//    - FnMut is the trait for closures that mutate their captured state
// -----------------------------------------------------------------------------
