//! Declarative selector sets for search-result listings.
//!
//! Site markup changes often, so the class names and patterns live in data
//! rather than in the parsing code. A [`SelectorSet`] can be loaded from
//! configuration and compiled once into a [`CompiledSelectorSet`].

use crate::text::{descendants, first_descendant, joined_text, sole_string, text_nodes};
use crate::types::ListingSource;
use leadlens_common::{LeadlensError, Result};
use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

/// US-style phone number as printed on listing pages.
pub const PHONE_PATTERN: &str = r"\(\d{3}\) \d{3}-\d{4}";
/// Loose address heuristic: a digit somewhere before a letter.
pub const LOOSE_ADDRESS_PATTERN: &str = r"[0-9].*[A-Za-z].*";

/// How one listing field is located inside a listing container.
///
/// ```
/// use leadlens_extract::FieldRule;
///
/// let rule: FieldRule = serde_json::from_str(
///     r#"{ "match": "element_text", "selector": "p", "pattern": "\\d{3}" }"#,
/// ).unwrap();
/// assert!(matches!(rule, FieldRule::ElementText { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum FieldRule {
    /// First descendant matching `selector`; its trimmed text.
    Element { selector: String },
    /// First descendant matching `selector` whose sole string matches `pattern`.
    ElementText { selector: String, pattern: String },
    /// First descendant text node matching `pattern`, trimmed.
    AnyText { pattern: String },
}

/// Listing container selector plus one rule per extracted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    pub listing: String,
    pub name: FieldRule,
    pub address: FieldRule,
    pub phone: FieldRule,
}

impl SelectorSet {
    pub fn yelp() -> Self {
        Self {
            listing: "div.businessName__09f24__EYSZE, div.container__09f24__fZQnf".into(),
            name: FieldRule::Element {
                selector: "a.css-1m051bw, a.businessName__09f24__EYSZE".into(),
            },
            address: FieldRule::Element {
                selector: "address".into(),
            },
            phone: FieldRule::ElementText {
                selector: "p".into(),
                pattern: PHONE_PATTERN.into(),
            },
        }
    }

    pub fn google() -> Self {
        Self {
            listing: "div.VkpGBb".into(),
            name: FieldRule::Element {
                selector: r#"div[role="heading"]"#.into(),
            },
            address: FieldRule::ElementText {
                selector: "div".into(),
                pattern: LOOSE_ADDRESS_PATTERN.into(),
            },
            phone: FieldRule::AnyText {
                pattern: PHONE_PATTERN.into(),
            },
        }
    }

    /// Built-in set for a source.
    pub fn builtin(source: ListingSource) -> Self {
        match source {
            ListingSource::Yelp => Self::yelp(),
            ListingSource::Google => Self::google(),
        }
    }

    /// Parse every selector and pattern up front.
    pub fn compile(&self) -> Result<CompiledSelectorSet> {
        Ok(CompiledSelectorSet {
            listing: parse_css(&self.listing)?,
            name: CompiledRule::compile(&self.name)?,
            address: CompiledRule::compile(&self.address)?,
            phone: CompiledRule::compile(&self.phone)?,
        })
    }
}

/// A [`SelectorSet`] ready to run against documents.
#[derive(Debug, Clone)]
pub struct CompiledSelectorSet {
    pub(crate) listing: Selector,
    pub(crate) name: CompiledRule,
    pub(crate) address: CompiledRule,
    pub(crate) phone: CompiledRule,
}

#[derive(Debug, Clone)]
pub(crate) enum CompiledRule {
    Element(Selector),
    ElementText(Selector, Regex),
    AnyText(Regex),
}

impl CompiledRule {
    fn compile(rule: &FieldRule) -> Result<Self> {
        Ok(match rule {
            FieldRule::Element { selector } => Self::Element(parse_css(selector)?),
            FieldRule::ElementText { selector, pattern } => {
                Self::ElementText(parse_css(selector)?, parse_pattern(pattern)?)
            }
            FieldRule::AnyText { pattern } => Self::AnyText(parse_pattern(pattern)?),
        })
    }

    /// Resolve the field inside `listing`. Empty text counts as absent.
    pub(crate) fn resolve(&self, listing: ElementRef<'_>) -> Option<String> {
        let value = match self {
            Self::Element(selector) => {
                first_descendant(listing, selector).map(|el| joined_text(el, ""))
            }
            Self::ElementText(selector, pattern) => descendants(listing, selector)
                .find(|el| sole_string(*el).is_some_and(|s| pattern.is_match(s)))
                .map(|el| joined_text(el, "")),
            Self::AnyText(pattern) => text_nodes(listing)
                .find(|text| pattern.is_match(text))
                .map(|text| text.trim().to_string()),
        };
        value.filter(|text| !text.is_empty())
    }
}

fn parse_css(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| LeadlensError::Selector(format!("`{css}`: {e}")))
}

fn parse_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| LeadlensError::Selector(format!("`{pattern}`: {e}")))
}
