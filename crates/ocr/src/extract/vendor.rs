use tallyslip_core::VendorCatalog;

use super::date::is_date_line;
use super::{first_match, Matcher};
use crate::types::{ExtractedVendor, RawText};

/// Lines from the top of the receipt searched for the business name.
pub const HEADER_LINES: usize = 10;

/// First header line containing a catalog pattern. Lines are tried top to
/// bottom, and within a line patterns are tried in catalog order.
pub struct CatalogMatcher<'a> {
    pub catalog: &'a VendorCatalog,
}

impl Matcher for CatalogMatcher<'_> {
    type Output = ExtractedVendor;

    fn find(&self, text: &RawText) -> Option<ExtractedVendor> {
        text.text_lines().take(HEADER_LINES).find_map(|line| {
            let name = line.trim();
            let entry = self.catalog.find_match_normalized(&name.to_uppercase())?;
            tracing::debug!(line = name, pattern = %entry.pattern, category = %entry.category, "catalog vendor");
            Some(ExtractedVendor::Catalog { name: name.to_string(), entry: entry.clone() })
        })
    }
}

/// First header line that reads like a name: it has letters and is not
/// just a date.
pub struct FirstNameLine;

impl Matcher for FirstNameLine {
    type Output = ExtractedVendor;

    fn find(&self, text: &RawText) -> Option<ExtractedVendor> {
        let name = text
            .text_lines()
            .take(HEADER_LINES)
            .map(str::trim)
            .find(|l| l.chars().any(char::is_alphabetic) && !is_date_line(l))?;
        tracing::debug!(line = name, "vendor not in catalog; using first name line");
        Some(ExtractedVendor::FirstLineFallback { name: name.to_string() })
    }
}

/// Identify the vendor from the header region.
pub fn extract_vendor(text: &RawText, catalog: &VendorCatalog) -> ExtractedVendor {
    let matchers: [&dyn Matcher<Output = ExtractedVendor>; 2] =
        [&CatalogMatcher { catalog }, &FirstNameLine];
    first_match(&matchers, text).unwrap_or(ExtractedVendor::Unknown)
}
