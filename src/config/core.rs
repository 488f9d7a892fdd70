use anyhow::{Context, Result, bail, ensure};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pool::{DEFAULT_PROCESSES, PoolConfig};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Merged pagepool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PagepoolConfig {
    pub pool: PoolSection,
    pub range: RangeSection,
    pub output: OutputSection,
}

/// Worker pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSection {
    /// Number of worker threads
    pub processes: usize,
    /// Suppress per-page progress lines
    pub quiet_progress: bool,
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            processes: DEFAULT_PROCESSES,
            quiet_progress: false,
        }
    }
}

/// Index range handed out by the cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeSection {
    /// First index claimed
    pub start: u64,
    /// Exclusive upper bound
    pub limit: u64,
    /// Prefix the claimed index is appended to
    pub url_prefix: String,
}

impl Default for RangeSection {
    fn default() -> Self {
        Self {
            start: 0,
            limit: 10,
            url_prefix: "https://www.google.ca/search?q=".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputSection {
    /// Directory receiving one file per page
    pub directory: Option<PathBuf>,
}

/// Highest-priority layer, built from command line flags
///
/// Unset fields are skipped when serialized so they never mask lower layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    pub pool: PoolOverrides,
    pub range: RangeOverrides,
    pub output: OutputOverrides,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PoolOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet_progress: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RangeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl PagepoolConfig {
    pub fn load() -> Result<Self> {
        Self::load_with(None, None)
    }

    /// Load the layered configuration
    ///
    /// Order (later wins): embedded defaults, user config, repository config,
    /// `PAGEPOOL_` environment variables, `overrides`. A custom config file
    /// replaces both the user and the repository layer and must exist.
    pub fn load_with(custom_config: Option<&str>, overrides: Option<&ConfigOverrides>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");
        let figment = Self::figment(custom_config, overrides)?;
        let config: Self = figment
            .extract()
            .context("Failed to parse pagepool configuration")?;
        tracing::debug!(
            processes = config.pool.processes,
            start = config.range.start,
            limit = config.range.limit,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn figment(custom_config: Option<&str>, overrides: Option<&ConfigOverrides>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom_config {
            let path = Path::new(custom_path);
            if !path.exists() {
                bail!("Configuration file not found: {}", custom_path);
            }
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        } else {
            let user = Self::user_config_base_path();
            figment = figment
                // User config - support multiple formats
                .merge(Toml::file(format!("{user}.toml")))
                .merge(Json::file(format!("{user}.json")))
                .merge(Yaml::file(format!("{user}.yaml")))
                // Repository config - support multiple formats
                .merge(Toml::file("pagepool.toml"))
                .merge(Json::file("pagepool.json"))
                .merge(Yaml::file("pagepool.yaml"));
        }

        // Environment variables, e.g. PAGEPOOL_POOL__PROCESSES=4
        figment = figment.merge(Env::prefixed("PAGEPOOL_").split("__"));

        if let Some(overrides) = overrides {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            figment = figment.merge(Serialized::defaults(overrides));
        }

        Ok(figment)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.pool.processes >= 1,
            "pool.processes must be at least 1 (got {})",
            self.pool.processes
        );
        ensure!(
            self.range.start <= self.range.limit,
            "range.start ({}) must not exceed range.limit ({})",
            self.range.start,
            self.range.limit
        );
        Ok(())
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            processes: self.pool.processes,
        }
    }

    fn user_config_base_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{}/.config/pagepool/config", home),
            Err(_) => "~/.config/pagepool/config".to_string(),
        }
    }
}
