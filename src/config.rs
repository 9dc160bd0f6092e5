use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::Capability;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub listings: ListingsSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub features: FeatureSettings,
    #[serde(default)]
    pub usage: UsageSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub market: MarketSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Listings provider (RentCast-compatible API).
#[derive(Debug, Clone, Deserialize)]
pub struct ListingsSettings {
    #[serde(default = "default_listings_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_listing_limit")]
    pub max_results: usize,
}

impl Default for ListingsSettings {
    fn default() -> Self {
        Self {
            base_url: default_listings_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            max_results: default_listing_limit(),
        }
    }
}

fn default_listings_url() -> String { "https://api.rentcast.io/v1".to_string() }
fn default_timeout_secs() -> u64 { 10 }
fn default_listing_limit() -> usize { 100 }

/// Remote query interpreter. Disabled unless an API key is configured.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: String::new(),
            model: default_llm_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_llm_endpoint() -> String { "https://api.openai.com/v1".to_string() }
fn default_llm_model() -> String { "gpt-4o-mini".to_string() }
fn default_max_tokens() -> u32 { 150 }
fn default_temperature() -> f32 { 0.1 }

/// Per-capability toggles.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureSettings {
    #[serde(default = "default_true")]
    pub natural_language_search: bool,
    #[serde(default = "default_true")]
    pub recommendations: bool,
    #[serde(default = "default_true")]
    pub market_intelligence: bool,
    #[serde(default = "default_true")]
    pub investment_analysis: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            natural_language_search: true,
            recommendations: true,
            market_intelligence: true,
            investment_analysis: true,
        }
    }
}

impl FeatureSettings {
    /// The set of capabilities enabled by this configuration.
    pub fn enabled(&self) -> std::collections::HashSet<Capability> {
        let mut set = std::collections::HashSet::new();
        if self.natural_language_search {
            set.insert(Capability::NaturalLanguageSearch);
        }
        if self.recommendations {
            set.insert(Capability::Recommendations);
        }
        if self.market_intelligence {
            set.insert(Capability::MarketIntelligence);
        }
        if self.investment_analysis {
            set.insert(Capability::InvestmentAnalysis);
        }
        set
    }
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct UsageSettings {
    #[serde(default = "default_true")]
    pub tracking: bool,
    #[serde(default = "default_monthly_limit")]
    pub monthly_cost_limit: f64,
}

impl Default for UsageSettings {
    fn default() -> Self {
        Self {
            tracking: true,
            monthly_cost_limit: default_monthly_limit(),
        }
    }
}

fn default_monthly_limit() -> f64 { 25.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String { "data".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct MarketSettings {
    #[serde(default = "default_market_cache_size")]
    pub cache_size: u64,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            cache_size: default_market_cache_size(),
        }
    }
}

fn default_market_cache_size() -> u64 { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with HOMESCOUT_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local config file for development overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g. HOMESCOUT_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("HOMESCOUT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("HOMESCOUT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply well-known environment variables for secrets so they never need
/// to live in a config file. RENTCAST_API_KEY and OPENAI_API_KEY are
/// checked before their HOMESCOUT_ equivalents.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let listings_key = env::var("RENTCAST_API_KEY")
        .or_else(|_| env::var("HOMESCOUT_LISTINGS__API_KEY"))
        .ok();
    let llm_key = env::var("OPENAI_API_KEY")
        .or_else(|_| env::var("HOMESCOUT_LLM__API_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(key) = listings_key {
        builder = builder.set_override("listings.api_key", key)?;
    }
    if let Some(key) = llm_key {
        builder = builder.set_override("llm.api_key", key)?;
    }

    builder.build()
}
