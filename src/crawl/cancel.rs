// src/crawl/cancel.rs
// =============================================================================
// Things that pull the plug on a crawl.
//
// - spawn_deadline: cancels the token once a fixed amount of time has passed
// - spawn_interrupt_handler: cancels the token on Ctrl-C
//
// Both only ever call token.cancel(), which never blocks and may be called
// any number of times. Both also step aside quietly when someone else
// cancels first.
// =============================================================================

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// Cancels `token` after `after` has elapsed
//
// The handle resolves to true if the deadline is what fired the token.
pub fn spawn_deadline(token: CancellationToken, after: Duration) -> JoinHandle<bool> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => false,
            _ = tokio::time::sleep(after) => {
                info!(?after, "deadline reached, telling everyone to clean up");
                token.cancel();
                true
            }
        }
    })
}

// Cancels `token` when the process receives an interrupt
pub fn spawn_interrupt_handler(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    warn!("interrupt received, cancelling crawl");
                    token.cancel();
                }
                Err(e) => warn!(error = %e, "cannot listen for interrupts"),
            },
        }
    })
}
