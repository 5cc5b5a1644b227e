//! # Store Configuration
//!
//! Per-store settings: name, currency, database location and the tax
//! profile new phones start with.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     TALLY_STORE_NAME, TALLY_CURRENCY_CODE, TALLY_CURRENCY_SYMBOL,       │
//! │     TALLY_DB_PATH, TALLY_DEFAULT_TAX_RATE, TALLY_PRICES_INCLUDE_TAX     │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/tally-pos/tally.toml (Linux)                              │
//! │     ~/Library/Application Support/com.tally.pos/tally.toml (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Downtown Phones"
//!
//! [currency]
//! code = "USD"
//! symbol = "$"
//!
//! [database]
//! path = "/var/lib/tally/tally.db"
//!
//! [tax]
//! default_rate = 1000        # basis points (10%)
//! prices_include_tax = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::pool::DbConfig;
use tally_core::format::DEFAULT_CURRENCY_SYMBOL;
use tally_core::money::BPS_SCALE;
use tally_core::{TaxConfig, TaxRate};

const CONFIG_FILE_NAME: &str = "tally.toml";
const DATABASE_FILE_NAME: &str = "tally.db";

// =============================================================================
// Sections
// =============================================================================

/// Store identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_store_name() -> String {
    "Tally Store".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
        }
    }
}

/// Currency used on receipts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// ISO 4217 code, e.g. `USD`.
    #[serde(default = "default_currency_code")]
    pub code: String,

    /// Printed before amounts.
    #[serde(default = "default_currency_symbol")]
    pub symbol: String,
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            code: default_currency_code(),
            symbol: default_currency_symbol(),
        }
    }
}

/// Database location. `None` means the platform data directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Tax profile applied to newly added phones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxDefaults {
    /// Basis points.
    #[serde(default)]
    pub default_rate: TaxRate,

    #[serde(default)]
    pub prices_include_tax: bool,
}

// =============================================================================
// Store Config
// =============================================================================

/// Complete store configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub currency: CurrencySettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub tax: TaxDefaults,
}

impl StoreConfig {
    /// Loads configuration: defaults, then the TOML file (if present), then
    /// `TALLY_*` environment variables, then validation.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
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

    /// Loads configuration, falling back to defaults on any error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load store config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "Store config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store name must not be empty".into()));
        }

        let code = &self.currency.code;
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Invalid(format!(
                "currency code must be three uppercase letters, got: '{}'",
                code
            )));
        }

        if self.currency.symbol.is_empty() {
            return Err(ConfigError::Invalid("currency symbol must not be empty".into()));
        }

        if self.tax.default_rate.bps() as i128 > BPS_SCALE {
            return Err(ConfigError::Invalid(format!(
                "default tax rate must be at most 100%, got {}%",
                self.tax.default_rate
            )));
        }

        Ok(())
    }

    /// Applies `TALLY_*` environment variables.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    ///
    /// `TALLY_DEFAULT_TAX_RATE` is a percentage (`7.5`), not basis points.
    /// Unparseable values are ignored with a warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("TALLY_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(code) = lookup("TALLY_CURRENCY_CODE") {
            debug!(code = %code, "Overriding currency code from environment");
            self.currency.code = code.to_uppercase();
        }

        if let Some(symbol) = lookup("TALLY_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }

        if let Some(path) = lookup("TALLY_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(rate) = lookup("TALLY_DEFAULT_TAX_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) => self.tax.default_rate = TaxRate::from_percentage(pct),
                Err(_) => warn!(rate = %rate, "Ignoring unparseable TALLY_DEFAULT_TAX_RATE"),
            }
        }

        if let Some(flag) = lookup("TALLY_PRICES_INCLUDE_TAX") {
            match flag.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => self.tax.prices_include_tax = true,
                "0" | "false" | "no" => self.tax.prices_include_tax = false,
                _ => warn!(flag = %flag, "Ignoring unparseable TALLY_PRICES_INCLUDE_TAX"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Resolved database file path.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database.path {
            return path.clone();
        }
        directories::ProjectDirs::from("com", "tally", "pos")
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
    }

    /// Database configuration for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path())
    }

    /// Tax configuration for a newly added phone.
    pub fn default_tax_config(&self) -> TaxConfig {
        TaxConfig {
            tax_rate: self.tax.default_rate,
            is_tax_inclusive: self.tax.prices_include_tax,
            is_tax_exempt: false,
        }
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency.symbol
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
