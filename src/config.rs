use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::grid::Cell;
use crate::pathfinding::MAX_EXPANSIONS;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridConfig {
    /// Grid file (.npy, .json, .txt or .csv). The demo layout is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_include_grid")]
    pub include_grid: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// One agent to spawn at startup; cells are `[row, col]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AgentConfig {
    pub start: [i32; 2],
    pub goal: [i32; 2],
}

impl AgentConfig {
    pub fn start(&self) -> Cell {
        Cell::new(self.start[0], self.start[1])
    }

    pub fn goal(&self) -> Cell {
        Cell::new(self.goal[0], self.goal[1])
    }
}

// Default values
fn default_max_expansions() -> usize { MAX_EXPANSIONS }
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8585 }
fn default_include_grid() -> bool { true }
fn default_log_filter() -> String { "info".to_string() }
fn default_agents() -> Vec<AgentConfig> {
    vec![AgentConfig { start: [5, 3], goal: [15, 25] }]
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_expansions: default_max_expansions(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            include_grid: default_include_grid(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            search: SearchConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            agents: default_agents(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Resolve an attempt to load `config.toml`: defaults when the file is
    /// missing or broken, with the reason logged
    pub fn or_default(loaded: Result<Self, ConfigError>) -> Self {
        match loaded {
            Ok(config) => {
                info!("loaded configuration from {}", CONFIG_FILE);
                config
            }
            Err(ConfigError::Io { .. }) => {
                info!("no {} found, using default configuration", CONFIG_FILE);
                Config::default()
            }
            Err(e) => {
                warn!("{}; using default configuration", e);
                Config::default()
            }
        }
    }

    /// `host:port` for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
