//! Page retrieval and the two user-facing flows.
//!
//! - [`fetcher`]: the [`fetcher::PageFetcher`] trait and its WebDriver-backed implementation
//! - [`contact`]: one page in, [`leadlens_extract::StructuredPageData`] out
//! - [`search`]: location search across listing engines
//! - [`summarize`]: the `query_web_scraper` tool and the model-driven contact summary
//! - [`sink`]: raw HTML dumps, saved listings, and the console report
//!
//! The flow functions own the fetcher they are given and always close it
//! before returning, whether the flow succeeded or not.

pub mod contact;
pub mod fetcher;
pub mod search;
pub mod sink;
pub mod summarize;

#[cfg(test)]
pub(crate) mod testing;

use fetcher::PageFetcher;
use leadlens_common::Result;
use leadlens_llm::traits::LlmClient;
use search::{LocationSearch, SearchReport};
use std::path::Path;
use summarize::{summarize_contact_page, ContactSummary};

async fn close_quietly<F: PageFetcher + ?Sized>(fetcher: &mut F) {
    if let Err(err) = fetcher.close().await {
        tracing::warn!(target: "browser.fetch", error = %err, "failed to close browser session");
    }
}

/// Contact flow: the model scrapes `url` through the tool and summarises it.
pub async fn run_contact_flow<F>(
    client: &dyn LlmClient,
    mut fetcher: F,
    url: &str,
    html_path: &Path,
) -> Result<ContactSummary>
where
    F: PageFetcher,
{
    let result = summarize_contact_page(client, &mut fetcher, url, html_path).await;
    close_quietly(&mut fetcher).await;
    result
}

/// Location flow: render every engine's results page for `location`.
pub async fn run_location_flow<F>(
    search: &LocationSearch,
    mut fetcher: F,
    location: &str,
) -> SearchReport
where
    F: PageFetcher,
{
    let report = search.run(&mut fetcher, location).await;
    close_quietly(&mut fetcher).await;
    report
}
