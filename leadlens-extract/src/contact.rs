//! Single-page contact extraction.

use crate::text::joined_text;
use crate::types::{ContactRecord, SocialPlatform};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Class token carried by footer social links.
pub const SOCIAL_LINK_CLASS: &str = "link-foot-social";

static SOCIAL_ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| static_selector(&format!("a.{SOCIAL_LINK_CLASS}")));
static TEL_ANCHORS: LazyLock<Selector> = LazyLock::new(|| static_selector(r#"a[href*="tel:"]"#));
static MAILTO_ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| static_selector(r#"a[href*="mailto:"]"#));

/// Content containers in priority order: the first kind present wins.
static CONTENT_CONTAINERS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    [
        static_selector("main"),
        static_selector("article"),
        static_selector("div.content, div.main"),
    ]
});

fn static_selector(css: &str) -> Selector {
    Selector::parse(css).expect("built-in contact selector is valid CSS")
}

/// Extract contact facts from a rendered page.
///
/// Phone and email follow a last-wins scan: when several `tel:` or `mailto:`
/// anchors exist, the one latest in document order is kept.
pub fn extract_contact_info(html: &str) -> ContactRecord {
    let document = Html::parse_document(html);
    let mut record = ContactRecord::default();

    for anchor in document.select(&SOCIAL_ANCHORS) {
        let href = anchor.value().attr("href").unwrap_or_default();
        if let Some(platform) = SocialPlatform::classify(href) {
            record.social_media.insert(platform, href.to_string());
        }
    }

    record.phone = last_link_target(&document, &TEL_ANCHORS, "tel:");
    record.email = last_link_target(&document, &MAILTO_ANCHORS, "mailto:");
    record.company_info = content_container(&document).map(|main| joined_text(main, " "));

    tracing::debug!(
        target: "extract.contact",
        socials = record.social_media.len(),
        has_phone = record.phone.is_some(),
        has_email = record.email.is_some(),
        has_company_info = record.company_info.is_some(),
        "contact extraction finished"
    );
    record
}

/// Value of the last matching anchor with every `scheme` occurrence removed.
/// Anchors that are nothing but the scheme are ignored.
fn last_link_target(document: &Html, anchors: &Selector, scheme: &str) -> Option<String> {
    document
        .select(anchors)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(|href| href.replace(scheme, ""))
        .filter(|target| !target.is_empty())
        .last()
}

fn content_container(document: &Html) -> Option<ElementRef<'_>> {
    CONTENT_CONTAINERS
        .iter()
        .find_map(|selector| document.select(selector).next())
}
