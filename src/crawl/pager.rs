// src/crawl/pager.rs
// =============================================================================
// Finds out how much work there is before the pool starts.
//
// One probe request for page 1, then the pager is read:
//   ... <a>41</a> <a>42</a> <a class="next_page">Next</a>
// gives 42 pages. No pager at all gives 0, which callers treat as "nothing to
// crawl".
// =============================================================================

use crate::error::CrawlError;
use crate::source::CrawlSource;
use tracing::info;

pub async fn discover_page_count<S>(source: &S) -> Result<u32, CrawlError>
where
    S: CrawlSource + ?Sized,
{
    let first = source.fetch_page(1).await?;
    let count = source.read_page_count(&first)?;

    info!(count, url = %first.url, "discovered page count");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{HttpSource, SiteLayout};
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve_first_page(body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recipes"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    fn source_for(server: &MockServer) -> HttpSource {
        let layout = SiteLayout::new(&server.uri()).unwrap();
        HttpSource::new(layout, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_counts_pages_from_pager() {
        let server =
            serve_first_page(r#"<div><a>1</a> <a>17</a> <a class="next_page">Next</a></div>"#)
                .await;
        assert_eq!(discover_page_count(&source_for(&server)).await.unwrap(), 17);
    }

    #[tokio::test]
    async fn test_no_pager_means_no_work() {
        let server = serve_first_page("<p>no recipes yet</p>").await;
        assert_eq!(discover_page_count(&source_for(&server)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_garbled_label_is_format_error() {
        let server = serve_first_page(r#"<div><a>many</a><a class="next_page">Next</a></div>"#).await;
        assert!(matches!(
            discover_page_count(&source_for(&server)).await,
            Err(CrawlError::Format(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_site_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        assert!(matches!(
            discover_page_count(&source_for(&server)).await,
            Err(CrawlError::Transport(_))
        ));
    }
}
