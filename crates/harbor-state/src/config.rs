//! # POS Configuration
//!
//! Store, session and logging settings.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HARBOR_STORE_NAME, HARBOR_CURRENCY_SYMBOL, HARBOR_CASHIER_ID,      │
//! │     HARBOR_SESSION_USER, HARBOR_LOG                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/harbor-pos/harbor.toml (Linux)                           │
//! │     ~/Library/Application Support/com.harbor.pos/harbor.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Harbor Mart"
//! currency_code = "BWP"
//! currency_symbol = "P"
//! currency_decimals = 2
//!
//! [session]
//! cashier_id = "cashier-1"
//! user_name = "Admin"
//! system_user = "System"
//!
//! [logging]
//! filter = "info,harbor=debug"
//! ```

use std::path::PathBuf;

use harbor_core::Money;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

/// Most decimal places a currency may be configured with.
pub const MAX_CURRENCY_DECIMALS: u32 = 4;

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// ISO 4217 code, informational.
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    /// Shown before amounts, e.g. `P 22.00`.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u32,
}

fn default_store_name() -> String {
    "Harbor POS".to_string()
}

fn default_currency_code() -> String {
    "BWP".to_string()
}

fn default_currency_symbol() -> String {
    "P".to_string()
}

fn default_currency_decimals() -> u32 {
    2
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            name: default_store_name(),
            currency_code: default_currency_code(),
            currency_symbol: default_currency_symbol(),
            currency_decimals: default_currency_decimals(),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Who is at the till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cashier id stamped on shifts and sales.
    #[serde(default = "default_cashier_id")]
    pub cashier_id: String,

    /// Name recorded on manual cashflow entries and stock adjustments.
    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Name recorded on automatic entries (sale cash-in).
    #[serde(default = "default_system_user")]
    pub system_user: String,
}

fn default_cashier_id() -> String {
    "cashier-1".to_string()
}

fn default_user_name() -> String {
    "Admin".to_string()
}

fn default_system_user() -> String {
    "System".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            cashier_id: default_cashier_id(),
            user_name: default_user_name(),
            system_user: default_system_user(),
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` still wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

pub(crate) fn default_log_filter() -> String {
    "info,harbor=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete POS configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PosConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (harbor.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading POS config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load POS config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "POS config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.session.cashier_id.trim().is_empty() {
            return Err(ConfigError::Invalid("session.cashier_id must not be empty".into()));
        }

        if self.store.currency_decimals > MAX_CURRENCY_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "store.currency_decimals must be at most {}, got {}",
                MAX_CURRENCY_DECIMALS, self.store.currency_decimals
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var("HARBOR_STORE_NAME") {
            self.store.name = name;
        }

        if let Ok(symbol) = std::env::var("HARBOR_CURRENCY_SYMBOL") {
            self.store.currency_symbol = symbol;
        }

        if let Ok(id) = std::env::var("HARBOR_CASHIER_ID") {
            debug!(cashier_id = %id, "Overriding cashier id from environment");
            self.session.cashier_id = id;
        }

        if let Ok(user) = std::env::var("HARBOR_SESSION_USER") {
            self.session.user_name = user;
        }

        if let Ok(filter) = std::env::var("HARBOR_LOG") {
            self.logging.filter = filter;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "harbor", "pos")
            .map(|dirs| dirs.config_dir().join("harbor.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Renders an amount with the store's symbol and precision.
    ///
    /// ```rust
    /// use harbor_core::Money;
    /// use harbor_state::PosConfig;
    ///
    /// let config = PosConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(2200)), "P 22.00");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let decimals = self.store.currency_decimals.min(MAX_CURRENCY_DECIMALS);
        let mut shown = amount
            .amount()
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
        shown.rescale(decimals);
        format!("{} {}", self.store.currency_symbol, shown)
    }

    pub fn cashier_id(&self) -> &str {
        &self.session.cashier_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PosConfig::default();
        assert_eq!(config.store.currency_symbol, "P");
        assert_eq!(config.session.system_user, "System");
        assert_eq!(config.logging.filter, "info,harbor=debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = PosConfig::default();

        config.session.cashier_id = "  ".to_string();
        assert!(config.validate().is_err());

        config.session.cashier_id = "c-7".to_string();
        config.store.currency_decimals = 5;
        assert!(config.validate().is_err());

        config.store.currency_decimals = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PosConfig = toml::from_str(
            r#"
            [store]
            name = "Harbor Mart Gaborone"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Harbor Mart Gaborone");
        assert_eq!(config.store.currency_decimals, 2);
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&PosConfig::default()).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[session]"));
        assert!(toml_str.contains("[logging]"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("harbor-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("harbor.toml");

        let mut config = PosConfig::default();
        config.store.name = "Riverside".to_string();
        config.save(Some(path.clone())).unwrap();

        let loaded: PosConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.store.name, "Riverside");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_format_currency() {
        let mut config = PosConfig::default();
        assert_eq!(config.format_currency(Money::from_cents(2200)), "P 22.00");
        assert_eq!(config.format_currency(Money::from_cents(-500)), "P -5.00");

        config.store.currency_decimals = 0;
        config.store.currency_symbol = "¥".to_string();
        assert_eq!(config.format_currency(Money::from_cents(12350)), "¥ 124");
    }
}
