use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tether_util::errors::{TetherError, TetherResult};

/// Global user configuration loaded from `~/.tether/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Resolver settings from `[resolver]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Execution environments the host supports. Empty disables the check.
    #[serde(default, rename = "execution-environments")]
    pub execution_environments: Vec<String>,

    #[serde(default)]
    pub platform: PlatformConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Host platform used to select native libraries, from `[resolver.platform]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_os")]
    pub os: String,
    #[serde(default = "default_arch")]
    pub arch: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            os: default_os(),
            arch: default_arch(),
        }
    }
}

fn default_os() -> String {
    std::env::consts::OS.to_string()
}

fn default_arch() -> String {
    std::env::consts::ARCH.to_string()
}

/// Search heuristics from `[resolver.search]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Rotate the candidates of a conflicting import before falling back
    /// to the odometer increment.
    #[serde(default = "default_rotation")]
    pub rotation: bool,
    /// Give up after this many consistency attempts. `0` or absent means
    /// no limit.
    #[serde(default, rename = "max-attempts")]
    pub max_attempts: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rotation: default_rotation(),
            max_attempts: None,
        }
    }
}

fn default_rotation() -> bool {
    true
}

impl SearchConfig {
    pub fn attempt_limit(&self) -> Option<usize> {
        self.max_attempts.filter(|&n| n > 0)
    }
}

impl GlobalConfig {
    /// Load the global configuration from `~/.tether/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> TetherResult<Self> {
        let path = Self::default_path();
        if path.is_file() {
            Self::from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load a configuration file that must exist.
    pub fn from_path(path: &Path) -> TetherResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TetherError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> TetherResult<Self> {
        toml::from_str(content).map_err(|e| {
            TetherError::Config {
                message: format!("Failed to parse config: {e}"),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the tether data directory (`~/.tether/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".tether")
}
