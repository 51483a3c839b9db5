use tallyslip_core::OTHER_CATEGORY;

use crate::types::ExtractedVendor;

/// Expense category for an identified vendor: the catalog binding when the
/// vendor came from the catalog, otherwise [`OTHER_CATEGORY`].
pub fn classify(vendor: &ExtractedVendor) -> &str {
    match vendor {
        ExtractedVendor::Catalog { entry, .. } => &entry.category,
        ExtractedVendor::FirstLineFallback { .. } | ExtractedVendor::Unknown => OTHER_CATEGORY,
    }
}
