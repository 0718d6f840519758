//! Location search across the configured listing engines.

use crate::fetcher::{PageFetcher, RenderPlan};
use leadlens_common::Result;
use leadlens_extract::{
    dedupe_businesses, parse_listings, parse_listings_with, BusinessRecord, CompiledSelectorSet,
    ListingSource, SelectorSet,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder replaced by the encoded location in a URL template.
pub const LOCATION_PLACEHOLDER: &str = "{location}";

/// `"Winston Salem, NC"` becomes `"Winston+Salem,+NC"`. Nothing else is escaped.
pub fn encode_location(location: &str) -> String {
    location.replace(' ', "+")
}

/// One results page to render per search, and how to parse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEngine {
    pub source: ListingSource,
    pub url_template: String,
}

impl SearchEngine {
    pub fn yelp() -> Self {
        Self {
            source: ListingSource::Yelp,
            url_template: "https://www.yelp.com/search?find_desc=Liquor+Stores&find_loc={location}"
                .into(),
        }
    }

    pub fn google() -> Self {
        Self {
            source: ListingSource::Google,
            url_template: "https://www.google.com/search?q=liquor+stores+in+{location}".into(),
        }
    }

    pub fn url_for(&self, location: &str) -> String {
        self.url_template
            .replace(LOCATION_PLACEHOLDER, &encode_location(location))
    }
}

/// Yelp first, then Google.
pub fn default_engines() -> Vec<SearchEngine> {
    vec![SearchEngine::yelp(), SearchEngine::google()]
}

/// An engine whose page could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    pub source: ListingSource,
    pub url: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct SearchReport {
    /// Listings in engine order, then document order.
    pub businesses: Vec<BusinessRecord>,
    pub failures: Vec<EngineFailure>,
}

/// Renders each engine's results page and parses its listings.
pub struct LocationSearch {
    engines: Vec<SearchEngine>,
    plan: RenderPlan,
    overrides: HashMap<ListingSource, CompiledSelectorSet>,
    dedupe: bool,
}

impl Default for LocationSearch {
    fn default() -> Self {
        Self::new(default_engines())
    }
}

impl LocationSearch {
    pub fn new(engines: Vec<SearchEngine>) -> Self {
        Self {
            engines,
            plan: RenderPlan::lazy_scroll(),
            overrides: HashMap::new(),
            dedupe: false,
        }
    }

    pub fn with_plan(mut self, plan: RenderPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Replace the built-in selector set for `source`.
    pub fn with_selectors(mut self, source: ListingSource, set: &SelectorSet) -> Result<Self> {
        self.overrides.insert(source, set.compile()?);
        Ok(self)
    }

    /// Drop repeated businesses after all engines ran.
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn engines(&self) -> &[SearchEngine] {
        &self.engines
    }

    pub fn dedupes(&self) -> bool {
        self.dedupe
    }

    fn parse(&self, html: &str, source: ListingSource) -> Vec<BusinessRecord> {
        match self.overrides.get(&source) {
            Some(set) => parse_listings_with(html, source, set),
            None => parse_listings(html, source),
        }
    }

    /// One fetch per engine, in order. A failing engine is logged, recorded
    /// in the report, and skipped.
    pub async fn run<F>(&self, fetcher: &mut F, location: &str) -> SearchReport
    where
        F: PageFetcher + ?Sized,
    {
        let mut report = SearchReport::default();
        for engine in &self.engines {
            let url = engine.url_for(location);
            match fetcher.fetch_rendered_html(&url, &self.plan).await {
                Ok(html) => {
                    let found = self.parse(&html, engine.source);
                    tracing::info!(
                        target: "search.location",
                        source = %engine.source,
                        %url,
                        found = found.len(),
                        "parsed listings"
                    );
                    report.businesses.extend(found);
                }
                Err(err) => {
                    tracing::warn!(
                        target: "search.location",
                        source = %engine.source,
                        %url,
                        error = %err,
                        "engine failed; skipping"
                    );
                    report.failures.push(EngineFailure {
                        source: engine.source,
                        url,
                        error: err.to_string(),
                    });
                }
            }
        }

        if self.dedupe {
            report.businesses = dedupe_businesses(report.businesses);
        }
        report
    }
}
