// src/crawl/mod.rs
// =============================================================================
// This module is the crawl pipeline.
//
//   pager        -> how many listing pages are there?
//   work_source  -> 1..=N onto a bounded work stream
//   pool/worker  -> K workers: page -> recipe links -> recipe downloads
//   consumer     -> drain the result and failure streams until both close
//   cancel       -> deadline and Ctrl-C, both firing one shared token
//
// Everything is wired together by main.rs; each piece only knows about the
// channels it reads from or writes to, plus the cancellation token.
// =============================================================================

mod cancel;
mod consumer;
mod pager;
mod pool;
mod records;
mod work_source;
mod worker;

// Re-export the pieces main.rs wires together
pub use cancel::{spawn_deadline, spawn_interrupt_handler};
pub use consumer::drain;
pub use pager::discover_page_count;
pub use pool::{run_pool, PoolOptions, PoolReport};
pub use records::{FailureRecord, ResultRecord, Stage};
pub use work_source::spawn_work_source;
