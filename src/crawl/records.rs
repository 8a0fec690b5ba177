// src/crawl/records.rs
// =============================================================================
// The two kinds of values that come out of the worker pool.
//
// - ResultRecord: one recipe that downloaded completely
// - FailureRecord: one page or recipe that could not be processed, tagged
//   with the stage that failed
// =============================================================================

use crate::error::CrawlError;
use bytes::Bytes;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use url::Url;

// Where in a worker's loop a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Downloading the listing page
    PageFetch,
    /// Turning the listing page into recipe URLs
    LinkDiscovery,
    /// Starting the recipe download
    ResourceFetch,
    /// Reading the recipe body to the end
    ResourceRead,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::PageFetch => "page fetch",
            Stage::LinkDiscovery => "link discovery",
            Stage::ResourceFetch => "resource fetch",
            Stage::ResourceRead => "resource read",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct ResultRecord {
    /// Listing page the recipe was found on
    pub page: u32,
    /// Where the payload was downloaded from
    pub url: Url,
    /// The complete recipe body
    pub payload: Bytes,
}

impl ResultRecord {
    // The payload as text; recipes are XML, invalid UTF-8 is replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub stage: Stage,
    pub page: u32,
    /// Set for resource stages, None for page stages
    pub url: Option<Url>,
    pub error: CrawlError,
}

impl FailureRecord {
    pub fn for_page(stage: Stage, page: u32, error: CrawlError) -> Self {
        Self {
            stage,
            page,
            url: None,
            error,
        }
    }

    pub fn for_resource(stage: Stage, page: u32, url: Url, error: CrawlError) -> Self {
        Self {
            stage,
            page,
            url: Some(url),
            error,
        }
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => write!(f, "page {} ({}) {}: {}", self.page, self.stage, url, self.error),
            None => write!(f, "page {} ({}): {}", self.page, self.stage, self.error),
        }
    }
}
