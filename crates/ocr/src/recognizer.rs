use thiserror::Error;

use crate::types::RawText;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Could not read receipt image: {0}")]
    ImageDecode(String),
    #[error("OCR engine failed: {0}")]
    Engine(String),
}

/// Anything that can turn a receipt photo into ordered lines of text.
///
/// The extraction engine never calls this itself; [`ReceiptScanner`](crate::ReceiptScanner)
/// wires a backend in front of it.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<RawText, OcrError>;
}

/// Hands back the same recognized text for every image.
pub struct MockRecognizer {
    text: RawText,
}

impl MockRecognizer {
    pub fn new(text: impl Into<RawText>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<RawText, OcrError> {
        Ok(self.text.clone())
    }
}

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use crate::types::{OcrLine, RawText};
    use leptess::LepTess;

    /// Local Tesseract. Every line is tagged with the page's mean word
    /// confidence, since the engine reports it per page.
    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<RawText, OcrError> {
            let mut engine = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            engine
                .set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let page = engine.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            let confidence = engine.mean_text_conf() as f32 / 100.0;
            tracing::debug!(confidence, "tesseract page recognized");

            Ok(RawText::from_lines(
                page.lines().map(|l| OcrLine::with_confidence(l, confidence)).collect(),
            ))
        }
    }
}
