//! Engine configuration using Figment
//!
//! Sources in precedence order (later sources override earlier ones):
//! 1. Default values
//! 2. An optional configuration file (TOML, YAML or JSON by extension)
//! 3. Environment variables prefixed with `FORUM_CATEGORIES_`

use crate::ancestry::AncestryStrategy;
use crate::error::{CategoryError, Result};
use crate::toggle::IconSet;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "FORUM_CATEGORIES_";

/// How long a commit waits for the store lock by default
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2_000;

/// Settings fixed once by the composition root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How ancestor chains are looked up
    pub ancestry: AncestryStrategy,
    /// Icon family for row toggles
    pub icon_set: IconSet,
    /// Reject reorders that do not carry a version for every touched group
    pub require_group_versions: bool,
    /// How long a commit waits for the store lock
    pub lock_timeout_ms: u64,
    /// Append committed reorders to the activity log
    pub activity_log: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ancestry: AncestryStrategy::default(),
            icon_set: IconSet::default(),
            require_group_versions: false,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            activity_log: true,
        }
    }
}

impl EngineConfig {
    /// Load defaults, then `file` if given, then the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file)
            .extract()
            .map_err(|e| CategoryError::config(e.to_string()))?;

        debug!(?config, "loaded engine configuration");
        Ok(config)
    }

    /// Build the layered figment without extracting it
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = file {
            trace!("Loading config file: {}", path.display());
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }
}
