//! Driver layer for browser automation.
//!
//! This crate wraps a WebDriver session so the orchestration layer can ask
//! for "the rendered HTML of this URL" without touching protocol details.
//!
//! - [`browser::driver::LeadlensDriver`]: WebDriver client wrapper and session launch
//! - [`browser::page::LeadlensPage`]: navigation, scrolling, idle waits, capture
//! - [`browser::behavioral::BehavioralEngine`]: human-like pauses
//! - [`browser::stealth`]: stealth profiles, launch arguments and JS evasions
//! - [`browser::fingerprint`]: user agent / viewport profiles
pub mod browser;
