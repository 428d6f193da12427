//! Rating building blocks: band splitting, energy pricing and proration

mod energy;
mod proration;
mod split;

pub use energy::energy_lines;
pub use proration::prorate_standing_charge;
pub use split::{split_by_band, BandSplit, SubInterval};
