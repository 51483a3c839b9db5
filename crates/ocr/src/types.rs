use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tallyslip_core::{CatalogEntry, Money};

/// One recognized line, top-to-bottom order, with the engine's confidence if
/// the OCR backend reports one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl OcrLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), confidence: None }
    }

    pub fn with_confidence(text: impl Into<String>, confidence: f32) -> Self {
        Self { text: text.into(), confidence: Some(confidence.clamp(0.0, 1.0)) }
    }
}

/// OCR output: ordered lines, possibly blank or noisy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawText {
    lines: Vec<OcrLine>,
}

impl RawText {
    /// Split a recognized text blob on line breaks (`\n` or `\r\n`).
    pub fn from_text(text: &str) -> Self {
        Self { lines: text.lines().map(OcrLine::new).collect() }
    }

    pub fn from_lines(lines: Vec<OcrLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[OcrLine] {
        &self.lines
    }

    pub fn text_lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|l| l.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The whole text, lines joined with `\n`.
    pub fn joined(&self) -> String {
        self.text_lines().collect::<Vec<_>>().join("\n")
    }

    /// Mean confidence over the lines that carry one.
    pub fn mean_confidence(&self) -> Option<f32> {
        let (sum, n) = self
            .lines
            .iter()
            .filter_map(|l| l.confidence)
            .fold((0.0f32, 0usize), |(s, n), c| (s + c, n + 1));
        (n > 0).then(|| sum / n as f32)
    }
}

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmountSource {
    /// Found on a line carrying a "total" label.
    Labeled,
    /// Largest amount anywhere in the text.
    FallbackMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedAmount {
    pub value: Money,
    pub source: AmountSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateFormat {
    /// `MM/DD/YYYY`, `M/D/YY`, or the same with hyphens.
    MonthDayYear,
    /// `YYYY-MM-DD`.
    IsoYearMonthDay,
    /// `March 15, 2024`, `Mar 15 2024`.
    MonthNameDayYear,
}

impl std::fmt::Display for DateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateFormat::MonthDayYear => write!(f, "month-day-year"),
            DateFormat::IsoYearMonthDay => write!(f, "iso-year-month-day"),
            DateFormat::MonthNameDayYear => write!(f, "month-name-day-year"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDate {
    pub date: NaiveDate,
    pub matched_format: DateFormat,
}

impl ExtractedDate {
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VendorSource {
    Catalog,
    FirstLineFallback,
    Unknown,
}

/// Where the vendor name came from, carrying the catalog binding when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum ExtractedVendor {
    Catalog { name: String, entry: CatalogEntry },
    FirstLineFallback { name: String },
    Unknown,
}

impl ExtractedVendor {
    pub fn name(&self) -> Option<&str> {
        match self {
            ExtractedVendor::Catalog { name, .. } | ExtractedVendor::FirstLineFallback { name } => {
                Some(name.as_str())
            }
            ExtractedVendor::Unknown => None,
        }
    }

    pub fn source(&self) -> VendorSource {
        match self {
            ExtractedVendor::Catalog { .. } => VendorSource::Catalog,
            ExtractedVendor::FirstLineFallback { .. } => VendorSource::FirstLineFallback,
            ExtractedVendor::Unknown => VendorSource::Unknown,
        }
    }
}

/// The structured expense record handed back to the caller.
///
/// `category` is always set. Any other field may be `None`, which tells the
/// caller to ask the user for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    pub vendor: Option<String>,
    pub category: String,
    pub total: Option<Money>,
    pub date: Option<NaiveDate>,
}

/// A [`ParsedReceipt`] together with the per-field results that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptExtraction {
    pub receipt: ParsedReceipt,
    pub amount: Option<ExtractedAmount>,
    pub date: Option<ExtractedDate>,
    pub vendor: ExtractedVendor,
}
