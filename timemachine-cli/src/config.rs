use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Optional user settings read from TOML.
///
/// All fields are optional. Explicit command-line flags always win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Directory of record documents, used instead of the bundled catalogue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Where `--report` without a path writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,
    /// Record shown when `--exploit` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_exploit: Option<String>,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config '{}'", path.display()))
    }

    /// Load the default config file, or defaults when it does not exist.
    pub fn load_default() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

fn config_path() -> PathBuf {
    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("timemachine").join("config.toml")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".timemachine").join("config.toml")
    }
}
