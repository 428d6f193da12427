//! Rating results: per-tariff cost breakdowns and ranked comparisons

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::EnergyUnit;

/// What an energy line prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Flat,
    Band,
    Tier,
    Surcharge,
}

/// One itemised part of the energy cost. Values are unrounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyLine {
    pub kind: LineKind,
    pub label: String,
    /// Quantity in the tariff's unit
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

/// Consumption metrics of the rated period, in the tariff's unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub unit: EnergyUnit,
    pub total_quantity: Decimal,
    /// Highest average hourly rate of any interval (kW for kWh tariffs)
    pub peak_demand: Decimal,
    pub total_exported: Decimal,
}

/// Cost of one usage profile under one tariff.
///
/// Components are exact, unrounded amounts. `total_cost` is their net sum
/// rounded once to the currency's minor unit, so rounded components need not
/// add up to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub tariff_id: String,
    /// Imported energy including surcharges
    pub energy_cost: Decimal,
    pub standing_charge_cost: Decimal,
    /// Peak demand priced per capacity period
    pub capacity_charge_cost: Decimal,
    /// Fee on exported energy
    pub export_fee_cost: Decimal,
    /// Revenue for exported energy, never negative; subtracted from the total
    pub export_credit: Decimal,
    pub total_cost: Decimal,
    pub currency: String,
    pub minor_units: u32,
    pub period_start: NaiveDateTime,
    pub period_end: NaiveDateTime,
    pub lines: Vec<EnergyLine>,
    pub usage: UsageSummary,
}

impl CostBreakdown {
    /// Net sum of the components before rounding.
    pub fn exact_total(&self) -> Decimal {
        self.energy_cost
            + self.standing_charge_cost
            + self.capacity_charge_cost
            + self.export_fee_cost
            - self.export_credit
    }

    /// Total cost per consumed unit; `None` without consumption.
    pub fn average_unit_price(&self) -> Option<Decimal> {
        if self.usage.total_quantity.is_zero() {
            None
        } else {
            Some(self.total_cost / self.usage.total_quantity)
        }
    }

    pub fn format_total(&self) -> String {
        format!(
            "{:.*} {}",
            self.minor_units as usize, self.total_cost, self.currency
        )
    }
}

/// Breakdowns ranked by total cost, cheapest first, ties by tariff identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    entries: Vec<CostBreakdown>,
}

impl ComparisonResult {
    pub fn from_breakdowns(mut entries: Vec<CostBreakdown>) -> Self {
        entries.sort_by(|a, b| {
            a.total_cost
                .cmp(&b.total_cost)
                .then_with(|| a.tariff_id.cmp(&b.tariff_id))
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[CostBreakdown] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CostBreakdown> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cheapest(&self) -> Option<&CostBreakdown> {
        self.entries.first()
    }

    pub fn get(&self, tariff_id: &str) -> Option<&CostBreakdown> {
        self.entries.iter().find(|b| b.tariff_id == tariff_id)
    }

    /// Zero-based position of a tariff in the ranking
    pub fn rank_of(&self, tariff_id: &str) -> Option<usize> {
        self.entries.iter().position(|b| b.tariff_id == tariff_id)
    }

    /// How much more `tariff_id` costs than the cheapest tariff.
    pub fn savings_against(&self, tariff_id: &str) -> Option<Decimal> {
        let cheapest = self.cheapest()?;
        self.get(tariff_id)
            .map(|b| b.total_cost - cheapest.total_cost)
    }

    pub fn into_vec(self) -> Vec<CostBreakdown> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a ComparisonResult {
    type Item = &'a CostBreakdown;
    type IntoIter = std::slice::Iter<'a, CostBreakdown>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
