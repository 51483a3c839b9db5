use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use tallyslip_core::VendorCatalog;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Server settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// TOML vendor catalog; the built-in table is used when unset.
    pub catalog_path: Option<PathBuf>,
    pub body_limit: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_str = get("TALLYSLIP_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_str
            .parse()
            .with_context(|| format!("TALLYSLIP_BIND is not a socket address: '{bind_str}'"))?;

        let catalog_path = get("TALLYSLIP_CATALOG")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let body_limit = match get("TALLYSLIP_BODY_LIMIT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("TALLYSLIP_BODY_LIMIT is not a byte count: '{v}'"))?,
            None => DEFAULT_BODY_LIMIT,
        };

        Ok(Self { bind, catalog_path, body_limit })
    }

    pub fn load_catalog(&self) -> Result<VendorCatalog> {
        match &self.catalog_path {
            Some(path) => VendorCatalog::load(path)
                .with_context(|| format!("loading vendor catalog from {}", path.display())),
            None => {
                let catalog = VendorCatalog::builtin();
                tracing::info!(entries = catalog.len(), "using built-in vendor catalog");
                Ok(catalog)
            }
        }
    }
}
