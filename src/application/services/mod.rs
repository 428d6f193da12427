//! Application services

mod comparison;
mod rating;

pub use comparison::compare;
pub use rating::{rate, RatingEngine};
