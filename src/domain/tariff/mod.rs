//! Tariff aggregate
//!
//! Contains the tariff definition, its pricing structures and their validation.

pub mod model;
pub mod schedule;
pub mod tiers;

pub use model::{
    validate_and_build_tariff, Pricing, PricingKind, RawTariff, StandingChargePeriod, Surcharge,
    TariffDefinition,
};
pub use schedule::{RateBand, RateSchedule, RawRateBand};
pub use tiers::{RawTier, Tier, TierTable};
