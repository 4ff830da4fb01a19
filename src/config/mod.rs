//! Configuration loading and management

use crate::core::card::Card;
use crate::core::collation::Locale;
use crate::core::deck::Deck;
use crate::filter::{FilterDefinition, FilterRegistry};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Address the HTTP server binds to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Page sizes used by list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Limit used when a request gives none
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper bound for requested limits
    #[serde(default = "max_limit")]
    pub max_limit: usize,
}

fn default_limit() -> usize {
    20
}

fn max_limit() -> usize {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: max_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Messages buffered per slow subscriber before it lags
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    64
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Where committed state is persisted
///
/// A missing path keeps that state in memory only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub settings_path: Option<PathBuf>,

    #[serde(default)]
    pub decks_path: Option<PathBuf>,
}

/// Extra filter definitions merged over the built-in registries
///
/// A definition whose key matches a built-in filter replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiltersConfig {
    #[serde(default)]
    pub cards: Vec<FilterDefinition>,

    #[serde(default)]
    pub decks: Vec<FilterDefinition>,
}

/// Complete configuration of a deckbuild server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Locale used when neither the request nor the settings name one
    #[serde(default)]
    pub locale: Locale,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub filters: FiltersConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration for testing
    ///
    /// Everything lives in memory.
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Check values that deserialize fine but cannot be served
    pub fn validate(&self) -> Result<()> {
        let pagination = &self.pagination;
        if pagination.max_limit == 0 {
            bail!("pagination.max_limit must be at least 1");
        }
        if pagination.default_limit == 0 || pagination.default_limit > pagination.max_limit {
            bail!(
                "pagination.default_limit must be between 1 and {}",
                pagination.max_limit
            );
        }
        if self.sync.capacity == 0 {
            bail!("sync.capacity must be at least 1");
        }
        self.card_registry()?;
        self.deck_registry()?;
        Ok(())
    }

    /// Built-in card filters with the configured extras merged in
    pub fn card_registry(&self) -> Result<FilterRegistry> {
        let mut registry = FilterRegistry::cards();
        registry
            .extend(self.filters.cards.iter().cloned())
            .context("invalid card filter definition")?;
        registry
            .check_fields::<Card>()
            .context("invalid card filter definition")?;
        Ok(registry)
    }

    /// Built-in deck filters with the configured extras merged in
    pub fn deck_registry(&self) -> Result<FilterRegistry> {
        let mut registry = FilterRegistry::decks();
        registry
            .extend(self.filters.decks.iter().cloned())
            .context("invalid deck filter definition")?;
        registry
            .check_fields::<Deck>()
            .context("invalid deck filter definition")?;
        Ok(registry)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
