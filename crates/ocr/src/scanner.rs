use thiserror::Error;

use crate::extract::{ExtractError, Extractor};
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::{ParsedReceipt, RawText};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// The result of a single receipt scan.
#[derive(Debug)]
pub struct ScanResult {
    /// Raw OCR output.
    pub ocr_text: RawText,
    /// Structured fields extracted from the OCR text.
    pub receipt: ParsedReceipt,
}

/// Orchestrates: OCR → extract.
pub struct ReceiptScanner<R: OcrBackend> {
    recognizer: R,
    extractor: Extractor,
}

impl<R: OcrBackend> ReceiptScanner<R> {
    pub fn new(recognizer: R, extractor: Extractor) -> Self {
        Self { recognizer, extractor }
    }

    /// Recognize an image (camera capture or file read) and extract its fields.
    pub fn scan(&self, image_bytes: &[u8]) -> Result<ScanResult, ScanError> {
        let ocr_text = self.recognizer.recognize(image_bytes)?;
        tracing::debug!(lines = ocr_text.len(), "OCR complete");
        let receipt = self.extractor.extract(&ocr_text)?;
        Ok(ScanResult { ocr_text, receipt })
    }
}
