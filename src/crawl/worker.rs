// src/crawl/worker.rs
// =============================================================================
// One member of the worker pool.
//
// A worker loops:
// 1. Wait for the next page index, or for cancellation (cancellation wins)
// 2. Fetch the listing page and resolve its recipe links one by one
// 3. Download every recipe in the order the links appear on the page
// 4. Send each recipe to the result stream, each problem to the failure stream
//
// Every place a worker can wait (next index, network, full output stream)
// also watches the cancellation token, so a cancelled crawl unwinds promptly.
//
// Failures are local: a broken page or recipe produces one FailureRecord and
// the worker moves on. Failures that only happened because we were told to
// stop are dropped, never reported.
// =============================================================================

use super::records::{FailureRecord, ResultRecord, Stage};
use crate::error::CrawlError;
use crate::source::{CrawlSource, ResourceBody};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

pub(crate) struct Worker<S> {
    pub id: usize,
    pub source: Arc<S>,
    pub token: CancellationToken,
    /// This worker's own handle on the shared work stream
    pub work: flume::Receiver<u32>,
    pub results: mpsc::Sender<ResultRecord>,
    pub failures: mpsc::Sender<FailureRecord>,
}

impl<S: CrawlSource> Worker<S> {
    pub async fn run(self) {
        debug!(worker = self.id, "worker started");

        loop {
            let next = tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    debug!(worker = self.id, "worker cancelled");
                    break;
                }
                next = self.work.recv_async() => next,
            };

            let Ok(page) = next else {
                debug!(worker = self.id, "work stream exhausted");
                break;
            };

            if self.process_page(page).await.is_break() {
                break;
            }
        }

        debug!(worker = self.id, "worker stopped");
    }

    // Resolves one page index to recipes and downloads them in discovery order
    async fn process_page(&self, page: u32) -> ControlFlow<()> {
        let fetched = match self.until_cancelled(self.source.fetch_page(page)).await {
            Ok(fetched) => fetched,
            Err(error) => {
                return self
                    .report(FailureRecord::for_page(Stage::PageFetch, page, error))
                    .await
            }
        };

        let targets = self.source.extract_links(&fetched);
        debug!(worker = self.id, page, targets = targets.len(), "resolved listing page");

        for target in targets {
            // Nothing new is dispatched once cancellation has fired
            if self.token.is_cancelled() {
                return ControlFlow::Break(());
            }

            // A link that cannot be resolved costs only itself
            let step = match target {
                Ok(url) => self.download(page, url).await,
                Err(error) => {
                    self.report(FailureRecord::for_page(Stage::LinkDiscovery, page, error))
                        .await
                }
            };
            if step.is_break() {
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    async fn download(&self, page: u32, url: Url) -> ControlFlow<()> {
        let fetched = self.until_cancelled(self.source.fetch_resource(&url)).await;
        let body = match fetched {
            Ok(body) => body,
            Err(error) => {
                return self
                    .report(FailureRecord::for_resource(Stage::ResourceFetch, page, url, error))
                    .await
            }
        };

        // The body is dropped on every path out of here, releasing the connection
        let read = self.until_cancelled(read_body(body)).await;
        let payload = match read {
            Ok(payload) => payload,
            Err(error) => {
                return self
                    .report(FailureRecord::for_resource(Stage::ResourceRead, page, url, error))
                    .await
            }
        };

        debug!(worker = self.id, page, %url, bytes = payload.len(), "downloaded recipe");
        self.emit(&self.results, ResultRecord { page, url, payload })
            .await
    }

    // Runs `operation` unless cancellation fires first
    async fn until_cancelled<T, F>(&self, operation: F) -> Result<T, CrawlError>
    where
        F: Future<Output = Result<T, CrawlError>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(CrawlError::Cancelled),
            result = operation => result,
        }
    }

    // Sends a failure downstream, unless it is a side effect of cancellation.
    // The token is checked here rather than the error value: an aborted
    // request can surface as a transport error.
    async fn report(&self, failure: FailureRecord) -> ControlFlow<()> {
        if failure.error.is_cancellation() || self.token.is_cancelled() {
            debug!(
                worker = self.id,
                page = failure.page,
                stage = %failure.stage,
                "suppressing failure after cancellation"
            );
            return ControlFlow::Break(());
        }

        debug!(
            worker = self.id,
            page = failure.page,
            stage = %failure.stage,
            error = %failure.error,
            "crawl step failed"
        );
        self.emit(&self.failures, failure).await
    }

    // Blocking send onto a bounded stream; a full stream slows the worker down
    async fn emit<T>(&self, stream: &mpsc::Sender<T>, record: T) -> ControlFlow<()> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => ControlFlow::Break(()),
            sent = stream.send(record) => match sent {
                Ok(()) => ControlFlow::Continue(()),
                Err(_) => {
                    debug!(worker = self.id, "output stream receiver dropped");
                    ControlFlow::Break(())
                }
            },
        }
    }
}

// Reads a recipe body to the end
async fn read_body(mut body: ResourceBody) -> Result<Bytes, CrawlError> {
    let mut payload = BytesMut::new();

    while let Some(chunk) = body.next().await {
        payload.extend_from_slice(&chunk?);
    }

    Ok(payload.freeze())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does tokio::select! do?
//    - Waits on several futures at once and runs the branch of whichever
//      finishes first; the other futures are dropped (cancelled)
//    - `biased;` makes it check branches top to bottom instead of randomly,
//      so the cancellation branch always wins a tie
//
// 2. What is ControlFlow?
//    - A std enum with Continue and Break, made for "keep going or stop"
//    - Every step here returns one, and the loop in run() stops on Break
//
// 3. Why is the work stream a flume channel and not tokio's mpsc?
//    - An mpsc Receiver has a single owner, but every worker needs to read
//      from the same work stream
//    - A flume Receiver can be cloned; each clone competes for items and
//      every index goes to exactly one of them
//    - Nobody has to lock the receiver to wait on it, so idle workers all
//      wait on the stream itself
//
// 4. What is BytesMut / Bytes?
//    - BytesMut is a growable buffer, freeze() turns it into an immutable,
//      cheaply clonable Bytes without copying
// -----------------------------------------------------------------------------
