//! Command handlers for the `locus` binary

pub mod check_delete;
pub mod search;
pub mod suggest;
pub mod tree;

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use locus::application::{EngineOptions, LocationEngine};
use locus::config::{Config, ConfigWarning};
use locus::domain::ports::LocationDataSource;
use locus::infrastructure::{InMemorySource, RestConfig, RestSource};

use crate::cli::Cli;

/// Explicit `--config` first, then the regular lookup hierarchy
pub fn load_config(cli: &Cli) -> Result<(Config, Vec<ConfigWarning>)> {
    let (mut config, warnings) = match &cli.config {
        Some(path) => {
            let (config, warnings) = Config::load_with_warnings(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            (config.with_env_overrides()?, warnings)
        }
        None => {
            let cwd = std::env::current_dir().ok();
            Config::load_or_default(cwd.as_deref())?
        }
    };

    if let Some(url) = &cli.api_url {
        config.api.base_url = Some(url.clone());
    }
    Ok((config, warnings))
}

/// Build the engine over a snapshot file or the configured REST backend
pub fn open_engine(cli: &Cli, config: &Config) -> Result<LocationEngine> {
    let source: Arc<dyn LocationDataSource> = match &cli.snapshot {
        Some(path) => Arc::new(
            InMemorySource::from_file(path)
                .with_context(|| format!("reading snapshot {}", path.display()))?,
        ),
        None => match RestConfig::from_api(&config.api) {
            Some(rest) => Arc::new(RestSource::new(rest)?),
            None => bail!("no data source: pass --snapshot <FILE> or set api.base_url"),
        },
    };

    Ok(LocationEngine::with_options(
        source,
        EngineOptions::from_config(config),
    ))
}
