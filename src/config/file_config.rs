use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub input_dir: Option<String>,
    pub output_dir: Option<String>,
    pub storefront_url: Option<String>,
    pub fetch_timeout_sec: Option<u64>,

    // Feature configs
    pub reconciliation: Option<ReconciliationConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Set to false to skip storefront fetches entirely; rows that stay
    /// incomplete are then dropped by the usual no-title rule.
    pub enabled: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
