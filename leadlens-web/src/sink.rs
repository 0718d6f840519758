//! Files and console text produced by the flows.

use leadlens_common::Result;
use leadlens_extract::BusinessRecord;
use std::fmt::Write as _;
use std::path::Path;

pub const DEFAULT_HTML_PATH: &str = "scraped_content.html";
pub const DEFAULT_LISTINGS_PATH: &str = "spirits_locations.json";

/// Overwrite `path` with `html` as UTF-8.
pub fn write_raw_html(path: &Path, html: &str) -> Result<()> {
    std::fs::write(path, html)?;
    tracing::debug!(target: "search.sink", path = %path.display(), bytes = html.len(), "wrote raw html");
    Ok(())
}

/// Pretty JSON array, two-space indent, non-ASCII written verbatim.
pub fn save_results(path: &Path, businesses: &[BusinessRecord]) -> Result<()> {
    let mut json = serde_json::to_string_pretty(businesses)?;
    json.push('\n');
    std::fs::write(path, json)?;
    tracing::info!(target: "search.sink", path = %path.display(), count = businesses.len(), "saved listings");
    Ok(())
}

pub fn load_results(path: &Path) -> Result<Vec<BusinessRecord>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Console listing: a count line, then one block per business with unset
/// fields left out.
pub fn render_listing_report(businesses: &[BusinessRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Found {} businesses:", businesses.len());
    for business in businesses {
        let _ = writeln!(out);
        let _ = writeln!(out, "Name: {}", business.name);
        if let Some(address) = &business.address {
            let _ = writeln!(out, "Address: {address}");
        }
        if let Some(phone) = &business.phone {
            let _ = writeln!(out, "Phone: {phone}");
        }
        if let Some(website) = &business.website {
            let _ = writeln!(out, "Website: {website}");
        }
        let _ = writeln!(out, "Source: {}", business.source);
    }
    out
}
