//! Gateway configuration: TOML router profiles with env overrides.
//!
//! ```toml
//! [engine]
//! authorized_list = "authorized"
//! pending_list = "pending"
//!
//! [routers.edge-1]
//! host = "192.0.2.1"
//! user = "api"
//! password = "s3cret"
//! port = 8728
//! api_type = "legacy"
//! ```
//!
//! Environment variables override file values with the `ROSGATE_` prefix
//! and `__` as the nesting separator, e.g.
//! `ROSGATE_ROUTERS__EDGE-1__PASSWORD`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;

use rosgate_core::{DeviceRecord, EngineConfig, StaticDirectory};

use crate::error::CliError;

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Named router profiles, keyed by router id.
    #[serde(default)]
    pub routers: HashMap<String, DeviceRecord>,

    /// Address-list names used by the automation engine.
    #[serde(default)]
    pub engine: EngineSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub authorized_list: String,
    pub pending_list: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        let defaults = EngineConfig::default();
        Self {
            authorized_list: defaults.authorized_list,
            pending_list: defaults.pending_list,
        }
    }
}

/// Default config path: `<platform config dir>/rosgate/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rosgate").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from the given path (or the default location),
/// layered under `ROSGATE_*` environment overrides. A missing file is
/// not an error -- env-only configuration is valid.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, CliError> {
    let mut figment = Figment::new();

    let path = explicit.map(Path::to_path_buf).or_else(config_path);
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }

    let config = figment
        .merge(Env::prefixed("ROSGATE_").split("__"))
        .extract()?;
    Ok(config)
}

impl Config {
    /// Build the router directory from the configured profiles.
    pub fn directory(&self) -> StaticDirectory {
        let mut directory = StaticDirectory::default();
        for (id, record) in &self.routers {
            let mut record = record.clone();
            record.id = id.clone();
            directory.insert(record);
        }
        directory
    }

    /// Engine knobs for the automation paths.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            authorized_list: self.engine.authorized_list.clone(),
            pending_list: self.engine.pending_list.clone(),
        }
    }
}
