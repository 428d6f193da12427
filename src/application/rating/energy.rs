//! Energy pricing per pricing structure
//!
//! Every function here takes intervals already clipped to the billing period
//! and expressed in the tariff's unit, and returns unrounded lines.

use rust_decimal::Decimal;

use super::split::split_by_band;
use crate::domain::{
    EnergyLine, LineKind, Pricing, RateSchedule, Surcharge, TierTable, UsageInterval,
};
use crate::support::errors::{RatingError, RatingResult};

/// Itemised energy cost of `intervals` under `pricing`, followed by one line
/// per surcharge.
pub fn energy_lines(
    pricing: &Pricing,
    surcharges: &[Surcharge],
    intervals: &[UsageInterval],
) -> RatingResult<Vec<EnergyLine>> {
    let total: Decimal = intervals.iter().map(|i| i.quantity).sum();

    let mut lines = match pricing {
        Pricing::Flat { rate } => vec![EnergyLine {
            kind: LineKind::Flat,
            label: "flat".to_string(),
            quantity: total,
            unit_price: *rate,
            amount: total * *rate,
        }],
        Pricing::TimeOfUse(schedule) => time_of_use_lines(schedule, intervals),
        Pricing::Tiered(table) => tier_lines(table, total)?,
    };

    lines.extend(surcharges.iter().map(|s| EnergyLine {
        kind: LineKind::Surcharge,
        label: s.name.clone(),
        quantity: total,
        unit_price: s.price_per_unit,
        amount: total * s.price_per_unit,
    }));
    Ok(lines)
}

/// One line per band, in band order, including bands with no consumption.
fn time_of_use_lines(schedule: &RateSchedule, intervals: &[UsageInterval]) -> Vec<EnergyLine> {
    let mut quantities = vec![Decimal::ZERO; schedule.bands().len()];
    for interval in intervals {
        for piece in split_by_band(interval, schedule) {
            quantities[piece.band] += piece.quantity;
        }
    }

    schedule
        .bands()
        .iter()
        .zip(quantities)
        .map(|(band, quantity)| EnergyLine {
            kind: LineKind::Band,
            label: band.label.clone(),
            quantity,
            unit_price: band.price_per_unit,
            amount: quantity * band.price_per_unit,
        })
        .collect()
}

fn tier_lines(table: &TierTable, total: Decimal) -> RatingResult<Vec<EnergyLine>> {
    let (amounts, excess) = table.allocate(total);
    if excess > Decimal::ZERO {
        if let Some(ceiling) = table.ceiling() {
            return Err(RatingError::TierCeilingExceeded { total, ceiling });
        }
    }

    Ok(table
        .tiers()
        .iter()
        .zip(amounts)
        .map(|(tier, quantity)| EnergyLine {
            kind: LineKind::Tier,
            label: tier.label(),
            quantity,
            unit_price: tier.price_per_unit,
            amount: quantity * tier.price_per_unit,
        })
        .collect())
}
