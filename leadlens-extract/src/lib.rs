//! Contact and business-listing extraction over rendered HTML.
//!
//! Everything in this crate is a pure function of the input document: no
//! network, no browser, no filesystem. Absent elements leave fields unset and
//! malformed markup is handled by the tolerant HTML5 parser, so the
//! extractors never fail.
//!
//! - [`contact::extract_contact_info`]: footer socials, `tel:`/`mailto:` anchors, main text
//! - [`listings::parse_listings`]: per-source business listings driven by a [`selectors::SelectorSet`]
//! - [`emails::harvest_emails`]: every email-shaped string in the raw document
//! - [`dedupe::dedupe_businesses`]: optional duplicate suppression over concatenated results
//!
//! ```rust
//! use leadlens_extract::{extract_contact_info, SocialPlatform};
//!
//! let html = r#"
//!     <a class="link-foot-social" href="https://linkedin.com/x"></a>
//!     <a href="mailto:a@b.com">a</a>
//!     <a href="mailto:c@d.com">c</a>
//!     <main>Hello World</main>
//! "#;
//! let record = extract_contact_info(html);
//! assert_eq!(
//!     record.social_media.get(&SocialPlatform::Linkedin).map(String::as_str),
//!     Some("https://linkedin.com/x")
//! );
//! assert_eq!(record.email.as_deref(), Some("c@d.com"));
//! assert_eq!(record.phone, None);
//! assert_eq!(record.company_info.as_deref(), Some("Hello World"));
//! ```

pub mod contact;
pub mod dedupe;
pub mod emails;
pub mod listings;
pub mod selectors;
pub mod text;
pub mod types;

pub use contact::extract_contact_info;
pub use dedupe::dedupe_businesses;
pub use emails::harvest_emails;
pub use listings::{parse_listings, parse_listings_with};
pub use selectors::{CompiledSelectorSet, FieldRule, SelectorSet};
pub use types::{BusinessRecord, ContactRecord, ListingSource, SocialPlatform, StructuredPageData};
