//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "PAYFIX_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "payfix.db";

/// Default HTTP port (the desk client's default API base points here)
pub const DEFAULT_PORT: u16 = 5000;

/// Default bearer token lifetime
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 900;

/// Default dashboard window in days
pub const DEFAULT_DASHBOARD_DAYS: i64 = 30;

/// Service configuration
///
/// Every key is optional in the TOML file; missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Folder holding payfix.db (resolved separately when absent)
    pub root_folder: Option<PathBuf>,
    pub bind_address: String,
    pub port: u16,
    /// Require a bearer token on data routes
    pub require_auth: bool,
    pub token_ttl_seconds: i64,
    /// Token signing secret; generated and stored in the database when absent
    pub token_secret: Option<String>,
    pub dashboard_default_days: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            require_auth: true,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            token_secret: None,
            dashboard_default_days: DEFAULT_DASHBOARD_DAYS,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from an explicit file, or the platform config file
    ///
    /// A missing file yields defaults; a malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        match path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(&p)?;
                let config = Self::from_toml(&content)
                    .map_err(|e| Error::Config(format!("{}: {}", p.display(), e)))?;
                tracing::info!("Loaded configuration from {}", p.display());
                Ok(config)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.token_ttl_seconds <= 0 {
            return Err(Error::Config(
                "token_ttl_seconds must be positive".to_string(),
            ));
        }
        if !(1..=365).contains(&self.dashboard_default_days) {
            return Err(Error::Config(
                "dashboard_default_days must be between 1 and 365".to_string(),
            ));
        }
        Ok(())
    }
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. `root_folder` from the TOML config file
/// 4. OS-dependent default
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &ServiceConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Database path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Platform config file location, if one exists
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("payfix").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/payfix/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/payfix (or /var/lib/payfix for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("payfix"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/payfix"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("payfix"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/payfix"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("payfix"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\payfix"))
    } else {
        PathBuf::from("./payfix_data")
    }
}
