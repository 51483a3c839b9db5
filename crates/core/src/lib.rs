pub mod catalog;
pub mod money;

pub use catalog::{CatalogEntry, CatalogError, VendorCatalog, OTHER_CATEGORY};
pub use money::{AmountParseError, Money};
