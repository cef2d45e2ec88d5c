// Service configuration loaded from YAML

use crate::id::IdPolicy;
use axum::http::HeaderValue;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What `PUT /{collection}/{id}` does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PutMode {
    /// Full replacement of every mutable field
    #[default]
    Replace,
    /// Same merge semantics as PATCH
    Merge,
}

impl std::fmt::Display for PutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PutMode::Replace => write!(f, "replace"),
            PutMode::Merge => write!(f, "merge"),
        }
    }
}

/// Per-resource settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResourceConfig {
    pub id_policy: IdPolicy,
    pub put: PutMode,
    /// Wrap list responses as `{"<collection>": [...]}` instead of a bare array
    pub envelope: bool,
}

impl ResourceConfig {
    pub fn new(id_policy: IdPolicy, put: PutMode) -> Self {
        Self {
            id_policy,
            put,
            envelope: false,
        }
    }

    pub fn with_envelope(mut self, envelope: bool) -> Self {
        self.envelope = envelope;
        self
    }
}

/// Keys a config file may set for one resource; absent keys keep that
/// resource's built-in default
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ResourceOverrides {
    id_policy: Option<IdPolicy>,
    put: Option<PutMode>,
    envelope: Option<bool>,
}

impl ResourceOverrides {
    fn apply(self, base: ResourceConfig) -> ResourceConfig {
        ResourceConfig {
            id_policy: self.id_policy.unwrap_or(base.id_policy),
            put: self.put.unwrap_or(base.put),
            envelope: self.envelope.unwrap_or(base.envelope),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ResourcesOverrides {
    blogposts: ResourceOverrides,
    fruits: ResourceOverrides,
    tasks: ResourceOverrides,
}

impl From<ResourcesOverrides> for ResourcesConfig {
    fn from(overrides: ResourcesOverrides) -> Self {
        let defaults = ResourcesConfig::default();
        Self {
            blogposts: overrides.blogposts.apply(defaults.blogposts),
            fruits: overrides.fruits.apply(defaults.fruits),
            tasks: overrides.tasks.apply(defaults.tasks),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ResourcesOverrides")]
pub struct ResourcesConfig {
    pub blogposts: ResourceConfig,
    pub fruits: ResourceConfig,
    pub tasks: ResourceConfig,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            blogposts: ResourceConfig::new(IdPolicy::Sequential, PutMode::Replace),
            fruits: ResourceConfig::new(IdPolicy::Sequential, PutMode::Replace).with_envelope(true),
            tasks: ResourceConfig::new(IdPolicy::Random, PutMode::Merge),
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Socket address the HTTP server listens on
    pub bind: String,
    /// One of trace, debug, info, warn, error
    pub log_level: String,
    /// Browser origins allowed to call the API; empty disables CORS
    pub cors_origins: Vec<String>,
    pub resources: ResourcesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            log_level: "info".to_string(),
            cors_origins: Vec::new(),
            resources: ResourcesConfig::default(),
        }
    }
}

impl Config {
    /// Default config file location: `<config dir>/resource-store/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("resource-store").join("config.yaml"))
    }

    /// Pick the file to load: an explicit path as given, otherwise the
    /// default location if it exists
    pub fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
        match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.exists()),
        }
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// if present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(path) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        config.log_level()?;
        config.cors_origins()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| eyre!("Invalid log level: {}", self.log_level))
    }

    /// Parse `cors_origins` into header values
    pub fn cors_origins(&self) -> Result<Vec<HeaderValue>> {
        self.cors_origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin).map_err(|_| eyre!("Invalid CORS origin: {:?}", origin)))
            .collect()
    }
}
