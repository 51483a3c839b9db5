use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Category reported for any receipt whose vendor is not in the catalog.
pub const OTHER_CATEGORY: &str = "Other";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Catalog entry {index} has an empty pattern")]
    EmptyPattern { index: usize },
    #[error("Catalog entry {index} ('{pattern}') has an empty category")]
    EmptyCategory { index: usize, pattern: String },
}

/// One vendor alias and the expense category it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub pattern: String,
    pub category: String,
}

impl CatalogEntry {
    pub fn new(pattern: impl Into<String>, category: impl Into<String>) -> Self {
        Self { pattern: pattern.into(), category: category.into() }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    vendor: Vec<CatalogEntry>,
}

/// Entry paired with its uppercased needle, computed once at load.
#[derive(Debug, Clone)]
struct CompiledEntry {
    entry: CatalogEntry,
    needle: String,
}

/// Ordered, immutable vendor → category table. Earlier entries win.
#[derive(Debug, Clone)]
pub struct VendorCatalog {
    entries: Vec<CompiledEntry>,
}

const DEFAULT_ENTRIES: &[(&str, &str)] = &[
    ("mcdonald", "Fast Food"),
    ("burger king", "Fast Food"),
    ("wendy", "Fast Food"),
    ("taco bell", "Fast Food"),
    ("chick-fil-a", "Fast Food"),
    ("subway", "Fast Food"),
    ("chipotle", "Fast Food"),
    ("shell", "Gas"),
    ("exxon", "Gas"),
    ("chevron", "Gas"),
    ("bp", "Gas"),
    ("mobil", "Gas"),
    ("speedway", "Gas"),
    ("target", "Retail"),
    ("walmart", "Retail"),
    ("costco", "Retail"),
    ("amazon", "Retail"),
    ("best buy", "Retail"),
    ("kroger", "Groceries"),
    ("whole foods", "Groceries"),
    ("trader joe", "Groceries"),
    ("safeway", "Groceries"),
    ("aldi", "Groceries"),
    ("publix", "Groceries"),
    ("starbucks", "Coffee"),
    ("dunkin", "Coffee"),
    ("peet", "Coffee"),
    ("cvs", "Pharmacy"),
    ("walgreens", "Pharmacy"),
    ("rite aid", "Pharmacy"),
];

impl VendorCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let needle = entry.pattern.trim().to_uppercase();
                if needle.is_empty() {
                    return Err(CatalogError::EmptyPattern { index });
                }
                if entry.category.trim().is_empty() {
                    return Err(CatalogError::EmptyCategory { index, pattern: entry.pattern });
                }
                Ok(CompiledEntry { entry, needle })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// The built-in table used when no catalog file is configured.
    pub fn builtin() -> Self {
        let entries = DEFAULT_ENTRIES
            .iter()
            .map(|(pattern, category)| CompiledEntry {
                entry: CatalogEntry::new(*pattern, *category),
                needle: pattern.to_uppercase(),
            })
            .collect();
        Self { entries }
    }

    /// Parse a catalog from TOML (`[[vendor]]` tables, in priority order).
    pub fn from_toml(toml_content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(toml_content)?;
        Self::new(file.vendor)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), entries = catalog.len(), "vendor catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().map(|c| &c.entry)
    }

    /// First entry, in catalog order, whose pattern occurs in `text`
    /// (case-insensitive substring).
    pub fn find_match(&self, text: &str) -> Option<&CatalogEntry> {
        let haystack = text.to_uppercase();
        self.find_match_normalized(&haystack)
    }

    /// Like [`find_match`](Self::find_match) for text already uppercased.
    pub fn find_match_normalized(&self, upper: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|c| upper.contains(&c.needle))
            .map(|c| &c.entry)
    }

    /// Category bound to `vendor` by the catalog, or [`OTHER_CATEGORY`].
    pub fn category_for(&self, vendor: &str) -> &str {
        self.find_match(vendor).map_or(OTHER_CATEGORY, |e| e.category.as_str())
    }
}

impl Default for VendorCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
