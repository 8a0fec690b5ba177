// src/crawl/work_source.rs
// =============================================================================
// The producer side of the pipeline.
//
// A single task walks 1..=count and pushes each page index onto a bounded
// flume channel. Every worker reads from its own clone of the receiver. When
// the producer runs out, or when cancellation fires, it drops the sender,
// which is what tells the workers there is nothing more to come.
//
// The channel capacity is the only buffering: once it is full, the producer
// waits for a worker to take something (natural backpressure).
// =============================================================================

use crate::error::CrawlError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// Spawns the producer
//
// Returns the receiving end of the work stream and a handle that resolves to
// the number of indices actually published.
pub fn spawn_work_source(
    count: u32,
    capacity: usize,
    token: CancellationToken,
) -> Result<(flume::Receiver<u32>, JoinHandle<u32>), CrawlError> {
    if capacity == 0 {
        return Err(CrawlError::Config(
            "work queue capacity must be at least 1".to_string(),
        ));
    }

    let (tx, rx) = flume::bounded(capacity);

    let handle = tokio::spawn(async move {
        let mut published = 0;

        for page in 1..=count {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(published, remaining = count - published, "work source cancelled");
                    break;
                }
                sent = tx.send_async(page) => {
                    if sent.is_err() {
                        // Every worker is gone; nobody will read the rest
                        break;
                    }
                    published += 1;
                }
            }
        }

        debug!(published, "work source exhausted, closing work stream");
        published
    });

    Ok((rx, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emits_every_index_once_then_closes() {
        let token = CancellationToken::new();
        let (rx, handle) = spawn_work_source(25, 4, token).unwrap();

        let mut seen = Vec::new();
        while let Ok(page) = rx.recv_async().await {
            seen.push(page);
        }

        assert_eq!(seen, (1..=25).collect::<Vec<_>>());
        assert_eq!(handle.await.unwrap(), 25);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cloned_receivers_split_the_indices() {
        let token = CancellationToken::new();
        let (rx, handle) = spawn_work_source(200, 2, token).unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let rx = rx.clone();
                tokio::spawn(async move {
                    let mut taken = Vec::new();
                    while let Ok(page) = rx.recv_async().await {
                        taken.push(page);
                    }
                    taken
                })
            })
            .collect();
        drop(rx);

        let mut seen = Vec::new();
        for reader in readers {
            seen.extend(reader.await.unwrap());
        }
        seen.sort_unstable();

        assert_eq!(seen, (1..=200).collect::<Vec<_>>());
        assert_eq!(handle.await.unwrap(), 200);
    }

    #[tokio::test]
    async fn test_zero_count_closes_immediately() {
        let token = CancellationToken::new();
        let (rx, handle) = spawn_work_source(0, 1, token).unwrap();

        assert!(rx.recv_async().await.is_err());
        assert_eq!(handle.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_still_closes_stream() {
        let token = CancellationToken::new();
        let (rx, handle) = spawn_work_source(1_000, 1, token.clone()).unwrap();

        // Take a couple, then stop reading and cancel while the producer is
        // parked on a full channel.
        assert_eq!(rx.recv_async().await, Ok(1));
        assert_eq!(rx.recv_async().await, Ok(2));
        token.cancel();

        let published = handle.await.unwrap();
        assert!(published < 1_000);

        let mut drained = 0;
        while rx.recv_async().await.is_ok() {
            drained += 1;
        }
        assert!(drained <= 1);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let token = CancellationToken::new();
        assert!(matches!(
            spawn_work_source(3, 0, token),
            Err(CrawlError::Config(_))
        ));
    }
}
