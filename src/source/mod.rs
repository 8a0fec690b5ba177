// src/source/mod.rs
// =============================================================================
// This module is everything the crawl pipeline needs from the outside world.
//
// Submodules:
// - layout: where listing pages and recipe files live, which selectors to use
// - html: pure functions that pull links and page numbers out of HTML
// - http: the reqwest-backed implementation of CrawlSource
//
// The pipeline never talks to reqwest directly. It only sees the CrawlSource
// trait, which keeps the worker pool testable with an in-memory fake.
// =============================================================================

mod html;
mod http;
mod layout;

pub use http::HttpSource;
pub use layout::SiteLayout;

use crate::error::CrawlError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use url::Url;

// A downloaded listing page, ready for link extraction
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page index this document was fetched for
    pub index: u32,
    /// The URL the page was fetched from
    pub url: Url,
    /// Raw HTML body
    pub html: String,
}

// The body of a recipe download, delivered chunk by chunk.
// Dropping it releases the underlying connection.
pub type ResourceBody = BoxStream<'static, Result<Bytes, CrawlError>>;

// The collaborator contract consumed by the crawl pipeline
#[async_trait]
pub trait CrawlSource: Send + Sync + 'static {
    /// Fetch listing page `page` (1-based)
    async fn fetch_page(&self, page: u32) -> Result<Page, CrawlError>;

    /// Resolve the download targets linked from a listing page, in document order.
    /// Each link resolves on its own, so one bad href does not hide the rest.
    fn extract_links(&self, page: &Page) -> Vec<Result<Url, CrawlError>>;

    /// Read the total page count from the pagination block, 0 when there is none
    fn read_page_count(&self, page: &Page) -> Result<u32, CrawlError>;

    /// Start downloading one recipe; the caller owns the returned body
    async fn fetch_resource(&self, url: &Url) -> Result<ResourceBody, CrawlError>;
}
