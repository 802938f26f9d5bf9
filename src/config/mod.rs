//! Configuration module for Locus
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (LOCUS_*)
//! 3. Project config (./locus.toml)
//! 4. User config (<config dir>/locus/config.toml)
//! 5. Built-in defaults (lowest priority)

mod env;
mod loader;
mod types;

pub use loader::{user_config_path, PROJECT_CONFIG_FILE};
pub use types::{
    ApiConfig, Config, ConfigWarning, ExpansionConfig, MatcherConfig, OutputConfig, TreeConfig,
    Verbosity,
};
