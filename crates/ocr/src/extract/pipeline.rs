use std::sync::Arc;

use tallyslip_core::VendorCatalog;
use thiserror::Error;

use super::{classify, extract_amount, extract_date, extract_vendor};
use crate::types::{ParsedReceipt, RawText, ReceiptExtraction};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Nothing to parse: OCR text has no lines")]
    EmptyInput,
}

/// Turns OCR text into a [`ParsedReceipt`] against a shared, read-only catalog.
///
/// Cloning is cheap and every clone reads the same catalog, so one extractor
/// can serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct Extractor {
    catalog: Arc<VendorCatalog>,
}

impl Extractor {
    pub fn new(catalog: Arc<VendorCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &VendorCatalog {
        &self.catalog
    }

    /// Extract the expense record. Missing fields are `None`; only text with
    /// zero lines is an error.
    pub fn extract(&self, text: &RawText) -> Result<ParsedReceipt, ExtractError> {
        self.extract_details(text).map(|x| x.receipt)
    }

    /// Like [`extract`](Self::extract), keeping the per-field results.
    #[tracing::instrument(skip_all, fields(lines = text.len()))]
    pub fn extract_details(&self, text: &RawText) -> Result<ReceiptExtraction, ExtractError> {
        if text.is_empty() {
            return Err(ExtractError::EmptyInput);
        }
        if let Some(confidence) = text.mean_confidence() {
            tracing::debug!(confidence, "mean OCR line confidence");
        }

        let vendor = extract_vendor(text, &self.catalog);
        let category = classify(&vendor).to_string();
        let amount = extract_amount(text);
        let date = extract_date(text);

        let receipt = ParsedReceipt {
            vendor: vendor.name().map(str::to_string),
            category,
            total: amount.map(|a| a.value),
            date: date.map(|d| d.date),
        };

        tracing::debug!(
            vendor = receipt.vendor.as_deref().unwrap_or("-"),
            category = %receipt.category,
            total = ?receipt.total,
            date = ?receipt.date,
            "receipt extracted"
        );

        Ok(ReceiptExtraction { receipt, amount, date, vendor })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Arc::new(VendorCatalog::builtin()))
    }
}
