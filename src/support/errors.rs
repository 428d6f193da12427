//! Error types for validation, rating and comparison.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{EnergyUnit, PricingKind};

// ── Construction ───────────────────────────────────────────────

/// Raised while building a usage profile or a tariff definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Interval {index}: end {end} is not after start {start}")]
    NonPositiveDuration {
        index: usize,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Interval {index}: negative quantity {quantity}")]
    NegativeQuantity { index: usize, quantity: Decimal },

    #[error("Interval starting {second} overlaps interval {first_start}..{first_end}")]
    OverlappingIntervals {
        first_start: NaiveDateTime,
        first_end: NaiveDateTime,
        second: NaiveDateTime,
    },

    #[error("Granularity must be at least one minute")]
    InvalidGranularity,

    #[error("Interval {start}..{end} is not aligned to the {granularity_minutes}-minute grid")]
    Misaligned {
        start: NaiveDateTime,
        end: NaiveDateTime,
        granularity_minutes: u32,
    },

    #[error("Tariff identifier must not be empty")]
    EmptyIdentifier,

    #[error("Currency code must not be empty")]
    EmptyCurrency,

    #[error("{field} must not be negative (got {value})")]
    NegativeAmount { field: String, value: Decimal },

    #[error("Pricing kind {kind} requires {expected} and no other pricing structure")]
    PricingMismatch {
        kind: PricingKind,
        expected: &'static str,
    },

    #[error("Rate bands: {0}")]
    BandPartition(String),

    #[error("Tiers: {0}")]
    TierLayout(String),
}

/// Result type for construction
pub type ValidationResult<T> = Result<T, ValidationError>;

// ── Rating ─────────────────────────────────────────────────────

/// Raised when one tariff cannot be rated against one profile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error("Usage measured in {profile} cannot be priced per {tariff} without a declared conversion")]
    IncompatibleUnits {
        profile: EnergyUnit,
        tariff: EnergyUnit,
    },

    #[error("Rating period end {end} is not after start {start}")]
    InvalidPeriod {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Consumption of {total} exceeds the highest tier ceiling {ceiling}")]
    TierCeilingExceeded { total: Decimal, ceiling: Decimal },
}

/// Result type for rating
pub type RatingResult<T> = Result<T, RatingError>;

// ── Comparison ─────────────────────────────────────────────────

/// Raised by the comparator. Failures of single tariffs carry the tariff identifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComparisonError {
    #[error("No tariffs to compare")]
    NoTariffs,

    #[error("Tariff '{tariff_id}' could not be rated: {source}")]
    Rating {
        tariff_id: String,
        #[source]
        source: RatingError,
    },

    #[error("Tariff '{tariff_id}' is invalid: {source}")]
    InvalidTariff {
        tariff_id: String,
        #[source]
        source: ValidationError,
    },

    #[error("Tariff '{tariff_id}' is priced in {found}, expected {expected}")]
    MixedCurrencies {
        tariff_id: String,
        expected: String,
        found: String,
    },

    #[error("Rating worker failed: {0}")]
    Worker(String),
}

impl ComparisonError {
    /// Identifier of the tariff that caused the failure, when there is one.
    pub fn tariff_id(&self) -> Option<&str> {
        match self {
            Self::Rating { tariff_id, .. }
            | Self::InvalidTariff { tariff_id, .. }
            | Self::MixedCurrencies { tariff_id, .. } => Some(tariff_id),
            Self::NoTariffs | Self::Worker(_) => None,
        }
    }
}

/// Result type for comparison
pub type CompareResult<T> = Result<T, ComparisonError>;

// ── Configuration ──────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

// ── Umbrella ───────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TariffError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
