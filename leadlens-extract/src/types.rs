use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Social platforms recognised in footer links, in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Instagram,
    Linkedin,
    Facebook,
}

impl SocialPlatform {
    /// Checked in this order; the first platform whose marker appears wins.
    pub const PRIORITY: [SocialPlatform; 3] = [Self::Instagram, Self::Linkedin, Self::Facebook];

    /// Substring looked for in an anchor's `href`.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Linkedin => "linkedin",
            Self::Facebook => "facebook",
        }
    }

    /// Classify a footer link. `None` means the link is not a known platform.
    ///
    /// ```
    /// use leadlens_extract::SocialPlatform;
    ///
    /// let href = "https://instagram.com/share?via=facebook";
    /// assert_eq!(SocialPlatform::classify(href), Some(SocialPlatform::Instagram));
    /// assert_eq!(SocialPlatform::classify("https://x.com/acme"), None);
    /// ```
    pub fn classify(href: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|platform| href.contains(platform.marker()))
    }
}

/// Contact facts pulled from a single page.
///
/// `company_info` is omitted from the serialised form when no content
/// container was found, which is different from an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub social_media: BTreeMap<SocialPlatform, String>,
    /// Reserved; extraction never fills it.
    pub links: Vec<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_info: Option<String>,
}

/// Search engine a listing was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingSource {
    #[serde(alias = "yelp")]
    Yelp,
    #[serde(alias = "google")]
    Google,
}

impl fmt::Display for ListingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yelp => f.write_str("Yelp"),
            Self::Google => f.write_str("Google"),
        }
    }
}

/// One business found on a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Neither built-in parser fills this; the key is kept for consumers.
    pub website: Option<String>,
    pub source: ListingSource,
}

impl BusinessRecord {
    pub fn new(name: impl Into<String>, source: ListingSource) -> Self {
        Self {
            name: name.into(),
            address: None,
            phone: None,
            website: None,
            source,
        }
    }
}

/// What the scraper tool hands back to the model for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredPageData {
    pub url: String,
    pub raw_html: String,
    pub contact_info: ContactRecord,
    /// Every email-shaped string in the document, first-seen order.
    #[serde(default)]
    pub harvested_emails: Vec<String>,
}
