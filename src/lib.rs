//! # Tariff Rating
//!
//! Rates metered energy consumption against tariffs and ranks tariffs by
//! cost for a billing period.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Validated usage profiles, tariff definitions and cost results
//! - **application**: Rating engine, time-of-use splitting, proration and comparison
//! - **config**: TOML configuration for rounding, minor units and unit conversions
//! - **support**: Error types and calendar arithmetic
//!
//! ## Usage
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use tariff_rating::domain::{
//!     validate_and_build_profile, validate_and_build_tariff, EnergyUnit, RawInterval,
//!     RawTariff, RawUsageProfile,
//! };
//!
//! let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let start = day.and_hms_opt(0, 0, 0).unwrap();
//! let profile = validate_and_build_profile(RawUsageProfile::new(
//!     EnergyUnit::Kwh,
//!     vec![RawInterval {
//!         start,
//!         end: day.and_hms_opt(1, 0, 0).unwrap(),
//!         quantity: Decimal::new(2, 0),
//!     }],
//! ))?;
//! let tariff = validate_and_build_tariff(RawTariff::flat("basic", "EUR", Decimal::new(20, 2)))?;
//!
//! let end = start + chrono::TimeDelta::days(1);
//! let ranking = tariff_rating::compare(&profile, &[tariff], start, end)?;
//! println!("{}", ranking.entries()[0].format_total());
//! # Ok::<(), tariff_rating::TariffError>(())
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod support;

pub use application::{compare, rate, RatingEngine};
pub use config::{default_config_path, AppConfig, RatingConfig, RoundingMode};
pub use domain::{
    validate_and_build_profile, validate_and_build_tariff, ComparisonResult, CostBreakdown,
    TariffDefinition, UsageProfile,
};
pub use support::errors::{
    ComparisonError, ConfigError, RatingError, TariffError, ValidationError,
};
