//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_DATA_DIR` - Directory holding the persisted cart (default: .gm-cart)
//! - `CART_STORAGE_KEY` - Key the cart is stored under (default: @GoMarketplace:cart)
//! - `CART_DECREMENT_POLICY` - `unbounded` or `remove-at-zero` (default: unbounded)
//! - `CART_MALFORMED_PAYLOAD` - `discard` or `fail` (default: discard)

use std::path::PathBuf;

use go_marketplace_cart::{CartOptions, DEFAULT_STORAGE_KEY, DecrementPolicy, MalformedPayload};
use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".gm-cart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory for the file-backed cart storage
    pub data_dir: PathBuf,
    /// Options for the cart store
    pub options: CartOptions,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a policy variable holds an unknown value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = PathBuf::from(get_or_default(&lookup, "CART_DATA_DIR", DEFAULT_DATA_DIR));
        let storage_key = get_or_default(&lookup, "CART_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        let decrement_policy = get_or_default(&lookup, "CART_DECREMENT_POLICY", "unbounded")
            .parse::<DecrementPolicy>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CART_DECREMENT_POLICY".to_string(), e.to_string())
            })?;
        let malformed_payload = get_or_default(&lookup, "CART_MALFORMED_PAYLOAD", "discard")
            .parse::<MalformedPayload>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CART_MALFORMED_PAYLOAD".to_string(), e.to_string())
            })?;

        Ok(Self {
            data_dir,
            options: CartOptions {
                storage_key,
                decrement_policy,
                malformed_payload,
            },
        })
    }
}

/// Get a variable with a default value. Empty values count as unset.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
