//! Usage aggregate
//!
//! Metered consumption intervals and their validation.

pub mod model;

pub use model::{
    validate_and_build_profile, PowerReading, RawInterval, RawUsageProfile, UsageInterval,
    UsageProfile,
};
