pub mod rating;
pub mod services;

// Re-export key types for convenience
pub use rating::{prorate_standing_charge, split_by_band, BandSplit, SubInterval};
pub use services::{compare, rate, RatingEngine};
