//! Rating service: cost of one usage profile under one tariff

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::debug;

use crate::application::rating::{energy_lines, prorate_standing_charge};
use crate::config::{AppConfig, RatingConfig};
use crate::domain::{
    conversion_factor, CostBreakdown, TariffDefinition, UsageInterval, UsageProfile, UsageSummary,
};
use crate::support::errors::{RatingError, RatingResult};

/// Rates and compares tariffs under one [`RatingConfig`].
///
/// Holds no mutable state; clones are cheap enough to hand to workers.
#[derive(Debug, Clone, Default)]
pub struct RatingEngine {
    config: RatingConfig,
}

impl RatingEngine {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.rating.clone())
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Cost of the consumption in `profile` that falls inside
    /// `[period_start, period_end)`, priced under `tariff`.
    pub fn rate(
        &self,
        profile: &UsageProfile,
        tariff: &TariffDefinition,
        period_start: NaiveDateTime,
        period_end: NaiveDateTime,
    ) -> RatingResult<CostBreakdown> {
        if period_end <= period_start {
            return Err(RatingError::InvalidPeriod {
                start: period_start,
                end: period_end,
            });
        }

        let factor = conversion_factor(profile.unit(), tariff.unit(), &self.config.conversions)
            .ok_or(RatingError::IncompatibleUnits {
                profile: profile.unit(),
                tariff: tariff.unit(),
            })?;

        let intervals = within_period(profile.intervals(), factor, period_start, period_end);
        let exports = within_period(profile.exports(), factor, period_start, period_end);

        let lines = energy_lines(tariff.pricing(), tariff.surcharges(), &intervals)?;
        let energy_cost: Decimal = lines.iter().map(|l| l.amount).sum();
        let standing_charge_cost = prorate_standing_charge(
            tariff.standing_charge(),
            tariff.standing_charge_period(),
            period_start,
            period_end,
        )?;

        let peak_demand = intervals
            .iter()
            .map(UsageInterval::hourly_rate)
            .max()
            .unwrap_or(Decimal::ZERO);
        let capacity_charge_cost = prorate_standing_charge(
            tariff.capacity_charge() * peak_demand,
            tariff.capacity_charge_period(),
            period_start,
            period_end,
        )?;

        let total_exported: Decimal = exports.iter().map(|i| i.quantity).sum();
        let export_fee_cost = total_exported * tariff.export_fee();
        let export_credit = total_exported * tariff.export_credit_rate();

        // Components stay exact; only the total is rounded.
        let currency = tariff.currency();
        let exact_total = energy_cost + standing_charge_cost + capacity_charge_cost
            + export_fee_cost
            - export_credit;
        let total_cost = self.config.round(exact_total, currency);

        let usage = UsageSummary {
            unit: tariff.unit(),
            total_quantity: intervals.iter().map(|i| i.quantity).sum(),
            peak_demand,
            total_exported,
        };

        debug!(
            tariff_id = tariff.id(),
            pricing = %tariff.pricing_kind(),
            intervals = intervals.len(),
            energy_cost = %energy_cost,
            standing_charge_cost = %standing_charge_cost,
            capacity_charge_cost = %capacity_charge_cost,
            export_credit = %export_credit,
            total_cost = %total_cost,
            currency,
            "Tariff rated"
        );

        Ok(CostBreakdown {
            tariff_id: tariff.id().to_string(),
            energy_cost,
            standing_charge_cost,
            capacity_charge_cost,
            export_fee_cost,
            export_credit,
            total_cost,
            currency: currency.to_string(),
            minor_units: self.config.minor_units_for(currency),
            period_start,
            period_end,
            lines,
            usage,
        })
    }
}

/// Intervals clipped to `[start, end)` and scaled into the tariff unit.
fn within_period(
    intervals: &[UsageInterval],
    factor: Decimal,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<UsageInterval> {
    intervals
        .iter()
        .filter_map(|i| i.clip(start, end))
        .map(|mut i| {
            i.quantity *= factor;
            i
        })
        .collect()
}

/// [`RatingEngine::rate`] with the default configuration.
pub fn rate(
    profile: &UsageProfile,
    tariff: &TariffDefinition,
    period_start: NaiveDateTime,
    period_end: NaiveDateTime,
) -> RatingResult<CostBreakdown> {
    RatingEngine::default().rate(profile, tariff, period_start, period_end)
}
