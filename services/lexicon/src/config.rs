//! services/lexicon/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::str::FromStr;
use std::time::Duration;

use lexicon_core::ExhaustionPolicy;
use tracing::Level;

use crate::adapters::translation::TranslationApi;

pub const DEFAULT_DICTIONARY_API_BASE: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub dictionary_api_base: String,
    /// Tried in order; the first non-empty translation wins.
    pub translation_apis: Vec<TranslationApi>,
    pub translation_source_lang: String,
    pub translation_target_lang: String,
    pub http_timeout: Duration,
    pub bulk_request_delay: Duration,
    pub membership_cache_ttl: Duration,
    pub membership_cache_capacity: usize,
    pub exhaustion_policy: ExhaustionPolicy,
    pub rng_seed: Option<u64>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Database ---
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5u32)?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- External providers ---
        let dictionary_api_base = lookup("DICTIONARY_API_BASE")
            .unwrap_or_else(|| DEFAULT_DICTIONARY_API_BASE.to_string());

        let translation_apis = lookup("TRANSLATION_PROVIDERS")
            .unwrap_or_else(|| "google,mymemory".to_string())
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                name.parse::<TranslationApi>().map_err(|e| {
                    ConfigError::InvalidValue("TRANSLATION_PROVIDERS".to_string(), e)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let translation_source_lang =
            lookup("TRANSLATION_SOURCE_LANG").unwrap_or_else(|| "en".to_string());
        let translation_target_lang =
            lookup("TRANSLATION_TARGET_LANG").unwrap_or_else(|| "vi".to_string());

        let http_timeout = Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30u64)?);
        let bulk_request_delay =
            Duration::from_millis(parse_or(&lookup, "BULK_REQUEST_DELAY_MS", 1000u64)?);

        // --- Selection and caching ---
        let membership_cache_ttl =
            Duration::from_secs(parse_or(&lookup, "MEMBERSHIP_CACHE_TTL_SECS", 300u64)?);
        let membership_cache_capacity =
            parse_or(&lookup, "MEMBERSHIP_CACHE_CAPACITY", 1024usize)?;
        let exhaustion_policy =
            parse_or(&lookup, "EXHAUSTION_POLICY", ExhaustionPolicy::default())?;

        let rng_seed = lookup("RNG_SEED")
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidValue("RNG_SEED".to_string(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            database_url,
            database_max_connections,
            log_level,
            dictionary_api_base,
            translation_apis,
            translation_source_lang,
            translation_target_lang,
            http_timeout,
            bulk_request_delay,
            membership_cache_ttl,
            membership_cache_capacity,
            exhaustion_policy,
            rng_seed,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
