pub mod cost;
pub mod tariff;
pub mod units;
pub mod usage;

// Re-export commonly used types
pub use cost::{ComparisonResult, CostBreakdown, EnergyLine, LineKind, UsageSummary};
pub use tariff::{
    validate_and_build_tariff, Pricing, PricingKind, RateBand, RateSchedule, RawRateBand,
    RawTariff, RawTier, StandingChargePeriod, Surcharge, TariffDefinition, Tier, TierTable,
};
pub use units::{conversion_factor, EnergyUnit, UnitConversion};
pub use usage::{
    validate_and_build_profile, PowerReading, RawInterval, RawUsageProfile, UsageInterval,
    UsageProfile,
};

// Re-export error types from support for convenience
pub use crate::support::errors::{RatingError, ValidationError, ValidationResult};
