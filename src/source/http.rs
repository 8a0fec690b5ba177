// src/source/http.rs
// =============================================================================
// The real CrawlSource: fetches listing pages and recipe files over HTTP.
//
// Key functionality:
// - One shared reqwest Client (connection pooling across all workers)
// - Non-success status codes are reported as transport errors
// - Recipe bodies are handed back as a stream of chunks, never buffered here
//
// No retries here: a failed download becomes a FailureRecord and the crawl
// moves on.
// =============================================================================

use super::html::{extract_recipe_links, parse_selector, read_page_count};
use super::{CrawlSource, Page, ResourceBody, SiteLayout};
use crate::error::CrawlError;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use scraper::Selector;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub struct HttpSource {
    client: Client,
    layout: SiteLayout,
    link_selector: Selector,
    pager_selector: Selector,
}

impl HttpSource {
    // Creates a source for `layout`, with a per-request `timeout`
    //
    // Selectors are compiled once here so a typo fails fast instead of
    // turning every page into a failure record.
    pub fn new(layout: SiteLayout, timeout: Duration) -> Result<Self, CrawlError> {
        let link_selector = parse_selector(&layout.link_selector)?;
        let pager_selector = parse_selector(&layout.pager_selector)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CrawlError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            layout,
            link_selector,
            pager_selector,
        })
    }

    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    // Sends a GET and rejects anything that is not a 2xx
    async fn get(&self, url: &Url) -> Result<reqwest::Response, CrawlError> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(CrawlError::Transport(format!(
                "HTTP {} for {}",
                response.status().as_u16(),
                url
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl CrawlSource for HttpSource {
    async fn fetch_page(&self, page: u32) -> Result<Page, CrawlError> {
        let url = self.layout.page_url(page)?;
        debug!(page, %url, "fetching listing page");

        let html = self.get(&url).await?.text().await?;

        Ok(Page {
            index: page,
            url,
            html,
        })
    }

    fn extract_links(&self, page: &Page) -> Vec<Result<Url, CrawlError>> {
        extract_recipe_links(&page.html, &self.link_selector)
            .iter()
            .map(|href| {
                let resolved = self.layout.resource_url(href);
                if let Err(error) = &resolved {
                    warn!(page = page.index, href = %href, %error, "skipping unresolvable recipe link");
                }
                resolved
            })
            .collect()
    }

    fn read_page_count(&self, page: &Page) -> Result<u32, CrawlError> {
        read_page_count(&page.html, &self.pager_selector)
    }

    async fn fetch_resource(&self, url: &Url) -> Result<ResourceBody, CrawlError> {
        debug!(%url, "fetching recipe");

        let response = self.get(url).await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(CrawlError::from))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LISTING: &str = r#"
        <a class="recipe-link" href="/recipes/pale-ale">Pale Ale</a>
        <a class="recipe-link" href="/recipes/stout">Stout</a>
        <span><a>1</a> <a>3</a> <a class="next_page">Next</a></span>
    "#;

    fn source_for(server: &MockServer) -> HttpSource {
        let layout = SiteLayout::new(&server.uri()).unwrap();
        HttpSource::new(layout, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_and_extract_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recipes"))
            .and(query_param("page", "2"))
            .and(query_param("sort", "rank"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
            .mount(&server)
            .await;

        let source = source_for(&server);
        let page = source.fetch_page(2).await.unwrap();
        assert_eq!(page.index, 2);

        let links: Vec<Url> = source
            .extract_links(&page)
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();
        let expected: Vec<String> = vec![
            format!("{}/recipes/pale-ale.xml", server.uri()),
            format!("{}/recipes/stout.xml", server.uri()),
        ];
        let links: Vec<String> = links.iter().map(|u| u.to_string()).collect();
        assert_eq!(links, expected);
        assert_eq!(source.read_page_count(&page).unwrap(), 3);
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recipes"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = source_for(&server);
        match source.fetch_page(1).await {
            Err(CrawlError::Transport(message)) => assert!(message.contains("503")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_resource_streams_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recipes/stout.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<RECIPES/>"))
            .mount(&server)
            .await;

        let source = source_for(&server);
        let url = Url::parse(&format!("{}/recipes/stout.xml", server.uri())).unwrap();
        let chunks: Vec<bytes::Bytes> = source
            .fetch_resource(&url)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.concat(), b"<RECIPES/>".to_vec());
    }

    #[tokio::test]
    async fn test_missing_resource_is_transport_error() {
        let server = MockServer::start().await;
        let source = source_for(&server);
        let url = Url::parse(&format!("{}/recipes/gone.xml", server.uri())).unwrap();
        assert!(matches!(
            source.fetch_resource(&url).await,
            Err(CrawlError::Transport(_))
        ));
    }

    #[test]
    fn test_bad_href_does_not_hide_good_links() {
        let source =
            HttpSource::new(SiteLayout::new("https://recipes.example").unwrap(), Duration::from_secs(1))
                .unwrap();
        let page = Page {
            index: 4,
            url: Url::parse("https://recipes.example/recipes?page=4&sort=rank").unwrap(),
            html: r#"
                <a class="recipe-link" href="/recipes/good">Good</a>
                <a class="recipe-link" href="">Broken</a>
                <a class="recipe-link" href="/recipes/also-good">Also good</a>
            "#
            .to_string(),
        };

        let targets = source.extract_links(&page);

        assert_eq!(targets.len(), 3);
        assert_eq!(
            targets[0].as_ref().unwrap().as_str(),
            "https://recipes.example/recipes/good.xml"
        );
        assert!(matches!(targets[1], Err(CrawlError::Parse(_))));
        assert_eq!(
            targets[2].as_ref().unwrap().as_str(),
            "https://recipes.example/recipes/also-good.xml"
        );
    }

    #[test]
    fn test_bad_selector_rejected_at_construction() {
        let mut layout = SiteLayout::new("https://recipes.example").unwrap();
        layout.link_selector = "a[[".to_string();
        assert!(matches!(
            HttpSource::new(layout, Duration::from_secs(1)),
            Err(CrawlError::Config(_))
        ));
    }
}
