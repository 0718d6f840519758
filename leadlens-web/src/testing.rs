//! In-memory [`PageFetcher`] for unit tests.

use crate::fetcher::{PageFetcher, RenderPlan};
use async_trait::async_trait;
use leadlens_common::{LeadlensError, Result};
use std::collections::HashMap;

#[derive(Default)]
pub(crate) struct FakeFetcher {
    pages: HashMap<String, String>,
    requests: Vec<(String, RenderPlan)>,
    stalled: Vec<String>,
}

impl FakeFetcher {
    pub(crate) fn with_page(url: &str, html: &str) -> Self {
        Self::default().page(url, html)
    }

    pub(crate) fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// `url` renders but never goes network-idle.
    pub(crate) fn stalled(mut self, url: &str) -> Self {
        self.stalled.push(url.to_string());
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.iter().map(|(url, _)| url.clone()).collect()
    }

    pub(crate) fn plans(&self) -> Vec<RenderPlan> {
        self.requests.iter().map(|(_, plan)| plan.clone()).collect()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_rendered_html(&mut self, url: &str, plan: &RenderPlan) -> Result<String> {
        self.requests.push((url.to_string(), plan.clone()));
        let stalled = self.stalled.iter().any(|u| u == url);
        if let (true, Some(after)) = (stalled, plan.network_idle_timeout) {
            return Err(LeadlensError::Timeout {
                url: url.to_string(),
                after,
            });
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| LeadlensError::Fetch(anyhow::anyhow!("navigation to {url} failed")))
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
