//! Configuration module
//!
//! Rating settings are read from a TOML file
//! (`~/.config/tariff-rating/config.toml` by default):
//!
//! ```toml
//! [rating]
//! rounding = "half_up"
//! default_minor_units = 2
//! parallel_compare = false
//!
//! [rating.minor_units]
//! JPY = 0
//!
//! [[rating.conversions]]
//! from = "therm"
//! to = "kWh"
//! factor = "29.3071"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::UnitConversion;
use crate::support::errors::ConfigError;

/// Largest scale `rust_decimal` can represent
const MAX_MINOR_UNITS: u32 = 28;

/// How the final amounts are rounded to the currency's minor unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// 0.125 → 0.13
    HalfUp,
    /// 0.125 → 0.12, 0.135 → 0.14
    HalfEven,
}

impl Default for RoundingMode {
    fn default() -> Self {
        Self::HalfUp
    }
}

impl RoundingMode {
    pub fn strategy(&self) -> RoundingStrategy {
        match self {
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Settings of the rating engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub rounding: RoundingMode,
    /// Minor-unit digits for currencies without an override
    pub default_minor_units: u32,
    /// Per-currency overrides, keyed by ISO 4217 code
    pub minor_units: BTreeMap<String, u32>,
    /// Declared conversions between units with no built-in factor
    pub conversions: Vec<UnitConversion>,
    /// Rate tariffs on the blocking pool instead of one after another
    pub parallel_compare: bool,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            rounding: RoundingMode::default(),
            default_minor_units: 2,
            minor_units: BTreeMap::new(),
            conversions: Vec::new(),
            parallel_compare: false,
        }
    }
}

impl RatingConfig {
    pub fn minor_units_for(&self, currency: &str) -> u32 {
        self.minor_units
            .get(currency)
            .copied()
            .unwrap_or(self.default_minor_units)
    }

    /// Round an unrounded amount to the minor unit of `currency`.
    pub fn round(&self, amount: Decimal, currency: &str) -> Decimal {
        amount.round_dp_with_strategy(self.minor_units_for(currency), self.rounding.strategy())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_minor_units > MAX_MINOR_UNITS {
            return Err(ConfigError::Invalid(format!(
                "default_minor_units must be at most {MAX_MINOR_UNITS}, got {}",
                self.default_minor_units
            )));
        }
        if let Some((code, digits)) = self.minor_units.iter().find(|(_, d)| **d > MAX_MINOR_UNITS) {
            return Err(ConfigError::Invalid(format!(
                "minor_units for {code} must be at most {MAX_MINOR_UNITS}, got {digits}"
            )));
        }
        if let Some(c) = self.conversions.iter().find(|c| c.factor <= Decimal::ZERO) {
            return Err(ConfigError::Invalid(format!(
                "conversion {} -> {} needs a positive factor, got {}",
                c.from, c.to, c.factor
            )));
        }
        Ok(())
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub rating: RatingConfig,
}

impl AppConfig {
    /// Read and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.rating.validate()?;
        Ok(config)
    }
}

/// `<config dir>/tariff-rating/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("tariff-rating").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EnergyUnit;
    use std::io::Write;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn defaults_round_half_up_to_cents() {
        let config = RatingConfig::default();
        assert_eq!(config.round(dec("0.125"), "EUR"), dec("0.13"));
        assert_eq!(config.round(dec("0.1666666"), "EUR"), dec("0.17"));
        assert!(!config.parallel_compare);
    }

    #[test]
    fn half_even_and_currency_overrides() {
        let mut config = RatingConfig {
            rounding: RoundingMode::HalfEven,
            ..RatingConfig::default()
        };
        config.minor_units.insert("JPY".into(), 0);
        assert_eq!(config.round(dec("0.125"), "EUR"), dec("0.12"));
        assert_eq!(config.round(dec("0.135"), "EUR"), dec("0.14"));
        assert_eq!(config.round(dec("152.5"), "JPY"), dec("152"));
    }

    #[test]
    fn parses_toml_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [rating]
            rounding = "half_even"
            parallel_compare = true

            [rating.minor_units]
            JPY = 0

            [[rating.conversions]]
            from = "therm"
            to = "kWh"
            factor = "29.3071"
            "#,
        )
        .unwrap();

        assert_eq!(config.rating.rounding, RoundingMode::HalfEven);
        assert_eq!(config.rating.default_minor_units, 2);
        assert_eq!(config.rating.minor_units_for("JPY"), 0);
        assert!(config.rating.parallel_compare);
        assert_eq!(config.rating.conversions[0].from, EnergyUnit::Therm);
        assert_eq!(config.rating.conversions[0].factor, dec("29.3071"));
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn rejects_non_positive_conversion_factor() {
        let err = AppConfig::from_toml_str(
            r#"
            [[rating.conversions]]
            from = "therm"
            to = "kWh"
            factor = "0"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rating]\ndefault_minor_units = 3").unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.rating.default_minor_units, 3);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            AppConfig::load(&missing).unwrap_err(),
            ConfigError::Io { .. }
        ));
    }

    #[test]
    fn default_path_ends_with_config_toml() {
        assert!(default_config_path().ends_with("config.toml"));
    }
}
