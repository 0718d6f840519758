use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,6}").expect("email pattern compiles")
});

/// Every email-shaped string in the raw document, unique, in first-seen order.
///
/// This scans markup and scripts alike, so it also finds addresses that are
/// never rendered as `mailto:` links.
pub fn harvest_emails(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    EMAIL
        .find_iter(html)
        .map(|m| m.as_str())
        .filter(|email| seen.insert(*email))
        .map(str::to_string)
        .collect()
}
