//! Configuration management for pdscviz
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (pdscviz.toml)
//! - Environment variables (PDSCVIZ__*)
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Example config file (pdscviz.toml):
//! ```toml
//! [scan]
//! dir = "./schemas"
//! extension = "pdsc"
//! skip_prefixes = ["target/", ".git/"]
//!
//! [render]
//! out = "/tmp/pdsc.dot"
//! trim_prefix = "com.example."
//! graph_attrs = "ranksep=3"
//! exclude = "AuditStamp"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::graph::LoadConfig;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VizConfig {
    /// Where and what to scan
    #[serde(default)]
    pub scan: ScanConfig,

    /// Output settings
    #[serde(default)]
    pub render: RenderConfig,
}

/// Scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory to scan for schema files
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Schema file extension
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Relative path prefixes to skip
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,
}

/// Render configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Output file, `-` for stdout
    #[serde(default = "default_out")]
    pub out: PathBuf,

    /// Prefix removed from each type name
    #[serde(default)]
    pub trim_prefix: String,

    /// Extra GraphViz graph attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_attrs: Option<String>,

    /// Pattern for edges to leave out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

// Default value functions
fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    "pdsc".to_string()
}

fn default_skip_prefixes() -> Vec<String> {
    LoadConfig::default().skip_prefixes
}

fn default_out() -> PathBuf {
    PathBuf::from("/tmp/pdsc.dot")
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            extension: default_extension(),
            skip_prefixes: default_skip_prefixes(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            out: default_out(),
            trim_prefix: String::new(),
            graph_attrs: None,
            exclude: None,
        }
    }
}

impl VizConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["pdscviz.toml", ".pdscviz.toml", "config/pdscviz.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "pdsc", "pdscviz") {
            let xdg_config = config_dir.config_dir().join("pdscviz.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // PDSCVIZ__RENDER__TRIM_PREFIX=com.example.
        builder = builder.add_source(
            Environment::with_prefix("PDSCVIZ")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("scan.skip_prefixes")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Loader settings for the scan section
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            extension: self.scan.extension.clone(),
            skip_prefixes: self.scan.skip_prefixes.clone(),
        }
    }

    /// Compiled exclusion pattern, if any
    pub fn exclude_regex(&self) -> crate::Result<Option<Regex>> {
        let Some(pattern) = self.render.exclude.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        Ok(Some(Regex::new(pattern)?))
    }

    /// Whether output goes to stdout
    pub fn writes_stdout(&self) -> bool {
        self.render.out.as_os_str() == "-"
    }
}
