pub mod extract;
pub mod recognizer;
pub mod scanner;
pub mod types;

pub use extract::{ExtractError, Extractor};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use scanner::{ReceiptScanner, ScanError, ScanResult};
pub use types::{
    AmountSource, DateFormat, ExtractedAmount, ExtractedDate, ExtractedVendor, OcrLine,
    ParsedReceipt, RawText, ReceiptExtraction, VendorSource,
};
