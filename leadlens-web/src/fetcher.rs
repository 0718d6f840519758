use async_trait::async_trait;
use leadlens_common::{LeadlensError, Result};
use leadlens_drivers::browser::driver::{BrowserOptions, LeadlensDriver};
use std::time::Duration;

/// What a fetch waits for before capturing the DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    /// Wait for network idle first, bounded by this timeout.
    pub network_idle_timeout: Option<Duration>,
    /// Pause after load, before scrolling.
    pub settle: Duration,
    pub scroll_cycles: u32,
    /// Pause after each scroll to the bottom.
    pub scroll_pause: Duration,
}

impl RenderPlan {
    /// Navigate and capture right away.
    pub fn immediate() -> Self {
        Self {
            network_idle_timeout: None,
            settle: Duration::ZERO,
            scroll_cycles: 0,
            scroll_pause: Duration::ZERO,
        }
    }

    /// Network idle, a 2 s settle, then three scroll + 1 s pause cycles so
    /// lazily loaded results make it into the DOM.
    pub fn lazy_scroll() -> Self {
        Self {
            network_idle_timeout: Some(Duration::from_secs(30)),
            settle: Duration::from_secs(2),
            scroll_cycles: 3,
            scroll_pause: Duration::from_secs(1),
        }
    }
}

impl Default for RenderPlan {
    fn default() -> Self {
        Self::immediate()
    }
}

/// A page still loading when the idle bound runs out cannot be trusted to
/// hold its lazily loaded results.
fn require_idle(idle: bool, url: &str, timeout: Duration) -> Result<()> {
    if idle {
        Ok(())
    } else {
        Err(LeadlensError::Timeout {
            url: url.to_string(),
            after: timeout,
        })
    }
}

/// Anything that can turn a URL into rendered HTML.
#[async_trait]
pub trait PageFetcher: Send {
    /// Navigate to `url`, follow `plan`, and return the serialized DOM.
    async fn fetch_rendered_html(&mut self, url: &str, plan: &RenderPlan) -> Result<String>;

    /// Release whatever the fetcher holds. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}

/// [`PageFetcher`] backed by one WebDriver session, opened on first use.
pub struct BrowserFetcher {
    options: BrowserOptions,
    driver: Option<LeadlensDriver>,
}

impl BrowserFetcher {
    pub fn new(options: BrowserOptions) -> Self {
        Self {
            options,
            driver: None,
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch_rendered_html(&mut self, url: &str, plan: &RenderPlan) -> Result<String> {
        let driver = match self.driver.take() {
            Some(driver) => driver,
            None => LeadlensDriver::launch(&self.options).await?,
        };
        let driver = self.driver.insert(driver);

        tracing::info!(target: "browser.fetch", %url, "fetching page");
        let page = driver.goto(url).await?;

        if let Some(timeout) = plan.network_idle_timeout {
            let idle = page.wait_for_network_idle(timeout).await?;
            require_idle(idle, url, timeout)?;
        }
        page.pause(plan.settle).await;
        for _ in 0..plan.scroll_cycles {
            page.scroll_to_bottom().await?;
            page.pause(plan.scroll_pause).await;
        }

        let html = page.get_content().await?;
        tracing::debug!(target: "browser.fetch", %url, bytes = html.len(), "captured page");
        Ok(html)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(driver) = self.driver.take() {
            driver.close().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_scroll_matches_listing_pages() {
        let plan = RenderPlan::lazy_scroll();
        assert!(plan.network_idle_timeout.is_some());
        assert_eq!(plan.settle, Duration::from_secs(2));
        assert_eq!(plan.scroll_cycles, 3);
        assert_eq!(plan.scroll_pause, Duration::from_secs(1));
    }

    #[test]
    fn pages_that_never_go_idle_time_out() {
        let bound = Duration::from_secs(30);
        assert!(require_idle(true, "https://maguey.com", bound).is_ok());
        match require_idle(false, "https://maguey.com", bound) {
            Err(LeadlensError::Timeout { url, after }) => {
                assert_eq!(url, "https://maguey.com");
                assert_eq!(after, bound);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn closing_an_unused_fetcher_is_a_no_op() {
        let mut fetcher = BrowserFetcher::new(BrowserOptions::default());
        fetcher.close().await.unwrap();
        fetcher.close().await.unwrap();
    }
}
