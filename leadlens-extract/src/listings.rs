//! Business-listing extraction from search result pages.

use crate::selectors::{CompiledSelectorSet, SelectorSet};
use crate::types::{BusinessRecord, ListingSource};
use scraper::Html;
use std::sync::LazyLock;

static YELP: LazyLock<CompiledSelectorSet> = LazyLock::new(|| {
    SelectorSet::yelp()
        .compile()
        .expect("built-in Yelp selectors compile")
});
static GOOGLE: LazyLock<CompiledSelectorSet> = LazyLock::new(|| {
    SelectorSet::google()
        .compile()
        .expect("built-in Google selectors compile")
});

/// Parse listings with the built-in selector set for `source`.
pub fn parse_listings(html: &str, source: ListingSource) -> Vec<BusinessRecord> {
    let selectors: &CompiledSelectorSet = match source {
        ListingSource::Yelp => &YELP,
        ListingSource::Google => &GOOGLE,
    };
    parse_listings_with(html, source, selectors)
}

/// Parse listings with an explicit selector set.
///
/// Every listing container is handled on its own; one without a name is
/// dropped, while a missing address or phone just stays unset.
pub fn parse_listings_with(
    html: &str,
    source: ListingSource,
    selectors: &CompiledSelectorSet,
) -> Vec<BusinessRecord> {
    let document = Html::parse_document(html);
    let candidates: Vec<_> = document.select(&selectors.listing).collect();

    let records: Vec<BusinessRecord> = candidates
        .iter()
        .filter_map(|listing| {
            let name = selectors.name.resolve(*listing)?;
            Some(BusinessRecord {
                name,
                address: selectors.address.resolve(*listing),
                phone: selectors.phone.resolve(*listing),
                website: None,
                source,
            })
        })
        .collect();

    tracing::debug!(
        target: "extract.listings",
        %source,
        candidates = candidates.len(),
        kept = records.len(),
        "listing extraction finished"
    );
    records
}
