// src/source/html.rs
// =============================================================================
// This module reads listing pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Two things are read from a listing page:
// - the href of every recipe anchor, in document order
// - the last page number, which sits right before the "next page" anchor
//
// Both functions are pure: no I/O, no state. Note that scraper's Html is not
// Send, so it must never be held across an .await; keeping these functions
// synchronous guarantees that.
// =============================================================================

use crate::error::CrawlError;
use scraper::{ElementRef, Html, Selector};

// Compiles a CSS selector, reporting bad selectors as configuration errors
pub fn parse_selector(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector)
        .map_err(|e| CrawlError::Config(format!("invalid CSS selector '{}': {:?}", selector, e)))
}

// Extracts the href of every element matching `link_selector`
//
// Anchors without an href are skipped.
//
// Example:
//   html = "<a class='recipe-link' href='/recipes/stout'>Stout</a>"
//   result = ["/recipes/stout"]
pub fn extract_recipe_links(html: &str, link_selector: &Selector) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(link_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}

// Reads the page count out of the pager
//
// The pager looks like:
//   <a href="?page=11">11</a> <a href="?page=12">12</a> <a class="next_page">Next</a>
// and the count is the label of the element just before the marker.
//
// Returns 0 when there is no marker at all (a single page, or no pager).
pub fn read_page_count(html: &str, pager_selector: &Selector) -> Result<u32, CrawlError> {
    let document = Html::parse_document(html);

    let Some(marker) = document.select(pager_selector).next() else {
        return Ok(0);
    };

    // Skip whitespace text nodes between the anchors
    let label_element = marker
        .prev_siblings()
        .find_map(ElementRef::wrap)
        .ok_or_else(|| {
            CrawlError::Format("next page marker has no preceding page label".to_string())
        })?;

    let label: String = label_element.text().collect();
    let label = label.trim();

    label
        .parse::<u32>()
        .map_err(|_| CrawlError::Format(format!("page label '{}' is not a number", label)))
}
