//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LocusError, LocusResult};

use super::env::{apply_overrides, closest};
use super::types::{Config, ConfigWarning};

/// File name looked up in the project directory
pub const PROJECT_CONFIG_FILE: &str = "locus.toml";

/// Load configuration and collect non-fatal warnings (e.g. unknown keys)
pub fn load_with_warnings(path: &Path) -> LocusResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| LocusError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load from project config, user config, or defaults, then apply env overrides
///
/// A config file that exists but fails to parse is an error; a missing one
/// falls through to the next level.
pub fn load_or_default(project_root: Option<&Path>) -> LocusResult<(Config, Vec<ConfigWarning>)> {
    let candidates = project_root
        .map(|root| root.join(PROJECT_CONFIG_FILE))
        .into_iter()
        .chain(user_config_path());

    for path in candidates {
        if path.exists() {
            debug!(path = %path.display(), "loading config");
            let (config, warnings) = load_with_warnings(&path)?;
            return Ok((with_env_overrides(config)?, warnings));
        }
    }

    Ok((with_env_overrides(Config::default())?, Vec::new()))
}

/// `<config dir>/locus/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("locus").join("config.toml"))
}

/// Apply environment variable overrides (LOCUS_* prefix)
pub fn with_env_overrides(config: Config) -> LocusResult<Config> {
    apply_overrides(config, |name| std::env::var(name).ok())
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "api",
        "base_url",
        "token",
        "timeout_secs",
        "tree",
        "include_inactive",
        "max_depth",
        "expansion",
        "default_mode",
        "auto_expand_roots",
        "matcher",
        "organization_id",
        "cache_candidates",
        "output",
        "verbosity",
        "unicode",
    ];

    closest(unknown, CANDIDATES).map(str::to_string)
}
