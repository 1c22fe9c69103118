mod file_config;

pub use file_config::{FileConfig, ReconciliationConfig};

use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_STOREFRONT_URL: &str = "https://store.steampowered.com/app";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub storefront_url: Option<String>,
    pub fetch_timeout_sec: u64,
    pub no_fetch: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub storefront_url: String,
    pub fetch_timeout_sec: u64,
    pub fetch_enabled: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let input_dir = file
            .input_dir
            .map(PathBuf::from)
            .or_else(|| cli.input_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("input_dir must be specified via --input-dir or in config file")
            })?;

        if !input_dir.exists() {
            bail!("Input directory does not exist: {:?}", input_dir);
        }
        if !input_dir.is_dir() {
            bail!("input_dir is not a directory: {:?}", input_dir);
        }

        let output_dir = file
            .output_dir
            .map(PathBuf::from)
            .or_else(|| cli.output_dir.clone())
            .unwrap_or_else(|| input_dir.join("aggregates"));

        let storefront_url = file
            .storefront_url
            .or_else(|| cli.storefront_url.clone())
            .unwrap_or_else(|| DEFAULT_STOREFRONT_URL.to_string());

        let fetch_timeout_sec = file.fetch_timeout_sec.unwrap_or(cli.fetch_timeout_sec);

        let reconciliation = file.reconciliation.unwrap_or_default();
        let fetch_enabled = reconciliation.enabled.unwrap_or(!cli.no_fetch);

        Ok(Self {
            input_dir,
            output_dir,
            storefront_url,
            fetch_timeout_sec,
            fetch_enabled,
        })
    }

    pub fn interactions_path(&self) -> PathBuf {
        self.input_dir.join("users_items.csv")
    }

    pub fn reviews_path(&self) -> PathBuf {
        self.input_dir.join("users_reviews.csv")
    }

    pub fn sentiment_path(&self) -> PathBuf {
        self.input_dir.join("users_sentiment.csv")
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.input_dir.join("steam_games.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_temp_input_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = make_temp_input_dir();
        let cli = CliConfig {
            input_dir: Some(temp_dir.path().to_path_buf()),
            output_dir: Some(PathBuf::from("/out")),
            storefront_url: Some("http://scraper:3002/app".to_string()),
            fetch_timeout_sec: 60,
            no_fetch: false,
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.input_dir, temp_dir.path());
        assert_eq!(config.output_dir, PathBuf::from("/out"));
        assert_eq!(config.storefront_url, "http://scraper:3002/app");
        assert_eq!(config.fetch_timeout_sec, 60);
        assert!(config.fetch_enabled);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = make_temp_input_dir();
        let cli = CliConfig {
            input_dir: Some(PathBuf::from("/should/be/overridden")),
            output_dir: Some(PathBuf::from("/cli/out")),
            fetch_timeout_sec: 30,
            ..Default::default()
        };

        let file_config = FileConfig {
            input_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            output_dir: Some("/toml/out".to_string()),
            fetch_timeout_sec: Some(90),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        assert_eq!(config.input_dir, temp_dir.path());
        assert_eq!(config.output_dir, PathBuf::from("/toml/out"));
        assert_eq!(config.fetch_timeout_sec, 90);
    }

    #[test]
    fn test_resolve_missing_input_dir_error() {
        let cli = CliConfig::default();
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("input_dir must be specified"));
    }

    #[test]
    fn test_resolve_nonexistent_input_dir_error() {
        let cli = CliConfig {
            input_dir: Some(PathBuf::from("/nonexistent/path/that/should/not/exist")),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_defaults() {
        let temp_dir = make_temp_input_dir();
        let cli = CliConfig {
            input_dir: Some(temp_dir.path().to_path_buf()),
            fetch_timeout_sec: 30,
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.output_dir, temp_dir.path().join("aggregates"));
        assert_eq!(config.storefront_url, DEFAULT_STOREFRONT_URL);
        assert!(config.fetch_enabled);
    }

    #[test]
    fn test_no_fetch_flag_disables_reconciliation_fetches() {
        let temp_dir = make_temp_input_dir();
        let cli = CliConfig {
            input_dir: Some(temp_dir.path().to_path_buf()),
            no_fetch: true,
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();
        assert!(!config.fetch_enabled);
    }

    #[test]
    fn test_toml_reconciliation_section_wins_over_flag() {
        let temp_dir = make_temp_input_dir();
        let cli = CliConfig {
            input_dir: Some(temp_dir.path().to_path_buf()),
            no_fetch: true,
            ..Default::default()
        };
        let file_config = FileConfig {
            reconciliation: Some(ReconciliationConfig {
                enabled: Some(true),
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();
        assert!(config.fetch_enabled);
    }

    #[test]
    fn test_input_path_helpers() {
        let temp_dir = make_temp_input_dir();
        let cli = CliConfig {
            input_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(
            config.interactions_path(),
            temp_dir.path().join("users_items.csv")
        );
        assert_eq!(config.catalog_path(), temp_dir.path().join("steam_games.csv"));
    }
}
