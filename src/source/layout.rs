// src/source/layout.rs
// =============================================================================
// Describes the shape of the crawled site.
//
// A listing page lives at   {base}/recipes?page={n}&sort=rank
// A recipe is linked by     <a class="recipe-link" href="/recipes/slug">
// Its payload lives at      {base}/recipes/slug.xml
// The pager marks the end   <a>12</a> <a class="next_page">Next</a>
//
// Everything is overridable so the same pipeline can point at a mirror or a
// local test server.
// =============================================================================

use crate::error::CrawlError;
use url::Url;

const DEFAULT_LISTING_PATH: &str = "/recipes?page={page}&sort=rank";
const DEFAULT_LINK_SELECTOR: &str = "a.recipe-link";
const DEFAULT_PAGER_SELECTOR: &str = "a.next_page";
const DEFAULT_RESOURCE_SUFFIX: &str = ".xml";

#[derive(Debug, Clone)]
pub struct SiteLayout {
    /// Scheme and host every relative link is resolved against
    pub base_url: Url,
    /// Listing path template; `{page}` is replaced with the page index
    pub listing_path: String,
    /// CSS selector matching recipe anchors on a listing page
    pub link_selector: String,
    /// CSS selector matching the "next page" anchor in the pager
    pub pager_selector: String,
    /// Appended to each recipe href to get the downloadable file
    pub resource_suffix: String,
}

impl SiteLayout {
    // Builds the default layout for a site rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self, CrawlError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CrawlError::Config(format!("invalid base URL '{}': {}", base_url, e)))?;

        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(CrawlError::Config(format!(
                "base URL must be http or https: {}",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            listing_path: DEFAULT_LISTING_PATH.to_string(),
            link_selector: DEFAULT_LINK_SELECTOR.to_string(),
            pager_selector: DEFAULT_PAGER_SELECTOR.to_string(),
            resource_suffix: DEFAULT_RESOURCE_SUFFIX.to_string(),
        })
    }

    // URL of listing page `page`
    pub fn page_url(&self, page: u32) -> Result<Url, CrawlError> {
        let path = self.listing_path.replace("{page}", &page.to_string());
        self.base_url
            .join(&path)
            .map_err(|e| CrawlError::Parse(format!("cannot build URL for page {}: {}", page, e)))
    }

    // URL of the downloadable file behind a recipe href
    pub fn resource_url(&self, href: &str) -> Result<Url, CrawlError> {
        let href = href.trim();
        if href.is_empty() {
            return Err(CrawlError::Parse("recipe link has an empty href".to_string()));
        }

        let mut url = self
            .base_url
            .join(href)
            .map_err(|e| CrawlError::Parse(format!("cannot resolve recipe link '{}': {}", href, e)))?;

        // The suffix belongs to the path, ahead of any query or fragment
        let path = format!("{}{}", url.path(), self.resource_suffix);
        url.set_path(&path);
        Ok(url)
    }
}
