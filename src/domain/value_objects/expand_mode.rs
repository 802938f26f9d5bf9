//! Expansion mode for lazy subtree loading

use serde::{Deserialize, Serialize};

/// How far an expansion request loads the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpandMode {
    /// Load the node's direct children only
    #[default]
    Shallow,
    /// Load every descendant transitively
    Full,
}

impl std::str::FromStr for ExpandMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shallow" => Ok(ExpandMode::Shallow),
            "full" => Ok(ExpandMode::Full),
            other => Err(format!("unknown expand mode '{}'", other)),
        }
    }
}
