use anyhow::{Context, Result};
use clap::Parser;
use gamelens_pipeline::config::{AppConfig, CliConfig, FileConfig};
use gamelens_pipeline::reconcile::{HttpStorefrontFetcher, NullStorefrontFetcher, StorefrontFetcher};
use gamelens_pipeline::{pipeline, ArtifactPaths};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI flags.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the cleaned input CSV tables.
    #[clap(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory where artifacts are written. Defaults to
    /// <input_dir>/aggregates.
    #[clap(long)]
    pub output_dir: Option<PathBuf>,

    /// Base URL of the storefront used to fill missing catalog fields.
    #[clap(long)]
    pub storefront_url: Option<String>,

    /// Timeout in seconds for storefront requests.
    #[clap(long, default_value_t = 30)]
    pub fetch_timeout_sec: u64,

    /// Skip storefront fetches entirely; incomplete catalog rows without
    /// a title are dropped.
    #[clap(long)]
    pub no_fetch: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    info!(
        "gamelens-pipeline {}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;

    let cli_config = CliConfig {
        input_dir: cli_args.input_dir,
        output_dir: cli_args.output_dir,
        storefront_url: cli_args.storefront_url,
        fetch_timeout_sec: cli_args.fetch_timeout_sec,
        no_fetch: cli_args.no_fetch,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", config.output_dir))?;

    let fetcher: Box<dyn StorefrontFetcher> = if config.fetch_enabled {
        info!("Storefront configured at {}", config.storefront_url);
        Box::new(HttpStorefrontFetcher::new(config.fetch_timeout_sec)?)
    } else {
        info!("Storefront fetches disabled");
        Box::new(NullStorefrontFetcher)
    };

    let inputs = pipeline::load_inputs(&config)?;
    let outputs = pipeline::run(inputs, fetcher.as_ref(), &config.storefront_url)?;

    let paths = ArtifactPaths::new(&config.output_dir);
    pipeline::write_artifacts(&outputs, &paths)?;

    info!("Batch run complete, artifacts in {:?}", config.output_dir);
    Ok(())
}
