//! Loader for the `services.yml` service list.
//!
//! The file is a YAML sequence of entries, each naming one service to watch:
//!
//! ```yaml
//! - name: web
//!   dir: /home/me/src/web
//!   host: localhost
//!   port: 8080
//! - name: mongodb
//!   port: 27017
//! ```
//!
//! Entries keep their file order; that order is the dashboard row order.
//! An empty list is valid and yields a header-only dashboard.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::types::service::ServiceDescriptor;

/// Compiled-in config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "services.yml";

const DEFAULT_HOST: &str = "localhost";


/// Errors that abort startup. Nothing is monitored when loading fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path} not found: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse service list: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("service #{index}: name is empty")]
    EmptyName { index: usize },

    #[error("service `{0}` is defined more than once")]
    DuplicateName(String),

    #[error("service `{name}`: port {port} is out of range 1-65535")]
    InvalidPort { name: String, port: i64 },
}


/// One entry as written in the file.
#[derive(Debug, Deserialize)]
struct RawService {
    name: String,
    #[serde(default)]
    dir: Option<String>,
    #[serde(default)]
    host: Option<String>,
    port: i64,
}


/// Timing knobs shared by every watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Pause between two probes of the same service.
    pub interval: Duration,
    /// Upper bound on one health probe, name resolution included.
    pub probe_timeout: Duration,
}


impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            interval: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(1),
        }
    }
}


/// Load the ordered service list from a YAML file.
pub fn load(path: &Path) -> Result<Vec<ServiceDescriptor>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content)
}


/// Parse and validate a service list from a YAML string.
pub fn parse(content: &str) -> Result<Vec<ServiceDescriptor>, ConfigError> {
    let raw: Option<Vec<RawService>> = serde_yaml::from_str(content)?;
    let raw = raw.unwrap_or_default();

    let mut seen = HashSet::new();
    let mut services = Vec::with_capacity(raw.len());
    for (index, entry) in raw.into_iter().enumerate() {
        let name = entry.name.trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::EmptyName { index });
        }
        if !seen.insert(name.clone()) {
            return Err(ConfigError::DuplicateName(name));
        }
        let port = u16::try_from(entry.port)
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| ConfigError::InvalidPort {
                name: name.clone(),
                port: entry.port,
            })?;
        let host = entry
            .host
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let directory = entry
            .dir
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);

        services.push(ServiceDescriptor {
            name,
            directory,
            host,
            port,
        });
    }
    Ok(services)
}
