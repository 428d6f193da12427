//! Usage profile domain entity

use chrono::{NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::EnergyUnit;
use crate::support::errors::{ValidationError, ValidationResult};
use crate::support::time::{floor_to_granularity, is_aligned, span_nanos, HOUR_NANOS};

/// Energy consumed over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub quantity: Decimal,
}

impl UsageInterval {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Part of this interval inside `[from, to)`, with a time-proportional share
    /// of the quantity. `None` when nothing of it falls inside.
    pub fn clip(&self, from: NaiveDateTime, to: NaiveDateTime) -> Option<UsageInterval> {
        let start = self.start.max(from);
        let end = self.end.min(to);
        if start >= end {
            return None;
        }
        if start == self.start && end == self.end {
            return Some(self.clone());
        }

        let share = Decimal::from(span_nanos(end - start));
        let whole = Decimal::from(span_nanos(self.duration()));
        Some(UsageInterval {
            start,
            end,
            quantity: self.quantity * share / whole,
        })
    }

    /// Average consumption per hour over the interval (power, for energy units).
    pub fn hourly_rate(&self) -> Decimal {
        let nanos = Decimal::from(span_nanos(self.duration()));
        self.quantity * Decimal::from(HOUR_NANOS) / nanos
    }
}

/// Validated, time-ordered consumption readings.
///
/// Intervals are sorted by start and never overlap. Gaps between intervals are
/// unmetered periods and carry neither consumption nor cost. Energy fed back
/// to the grid is kept apart in `exports`, under the same rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageProfile {
    unit: EnergyUnit,
    granularity_minutes: Option<u32>,
    intervals: Vec<UsageInterval>,
    exports: Vec<UsageInterval>,
}

impl UsageProfile {
    /// A profile with no readings.
    pub fn empty(unit: EnergyUnit) -> Self {
        Self {
            unit,
            granularity_minutes: None,
            intervals: Vec::new(),
            exports: Vec::new(),
        }
    }

    /// Build a profile from average-power readings taken once per `granularity_minutes`.
    ///
    /// Each reading's power is expressed in `unit` per hour, so a 15-minute
    /// reading of 2 kW yields 0.5 kWh.
    pub fn from_power_readings(
        readings: &[PowerReading],
        granularity_minutes: u32,
        unit: EnergyUnit,
    ) -> ValidationResult<Self> {
        if granularity_minutes == 0 {
            return Err(ValidationError::InvalidGranularity);
        }
        let slot = TimeDelta::minutes(i64::from(granularity_minutes));
        let hours = Decimal::from(granularity_minutes) / Decimal::from(60);

        let intervals = readings
            .iter()
            .map(|r| RawInterval {
                start: r.start,
                end: r.start + slot,
                quantity: r.average_power * hours,
            })
            .collect();

        validate_and_build_profile(RawUsageProfile {
            unit,
            granularity_minutes: Some(granularity_minutes),
            intervals,
            exports: Vec::new(),
        })
    }

    pub fn unit(&self) -> EnergyUnit {
        self.unit
    }

    pub fn granularity(&self) -> Option<TimeDelta> {
        self.granularity_minutes
            .map(|m| TimeDelta::minutes(i64::from(m)))
    }

    pub fn intervals(&self) -> &[UsageInterval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UsageInterval> {
        self.intervals.iter()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn total_quantity(&self) -> Decimal {
        self.intervals.iter().map(|i| i.quantity).sum()
    }

    /// Exported (injected) energy, sorted and non-overlapping.
    pub fn exports(&self) -> &[UsageInterval] {
        &self.exports
    }

    pub fn total_exported(&self) -> Decimal {
        self.exports.iter().map(|i| i.quantity).sum()
    }

    /// Metered time: the union of all intervals, excluding gaps.
    pub fn covered_duration(&self) -> TimeDelta {
        self.intervals
            .iter()
            .fold(TimeDelta::zero(), |acc, i| acc + i.duration())
    }

    /// `[first start, last end)` of the readings.
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.intervals.first()?;
        let last = self.intervals.last()?;
        Some((first.start, last.end))
    }
}

impl<'a> IntoIterator for &'a UsageProfile {
    type Item = &'a UsageInterval;
    type IntoIter = std::slice::Iter<'a, UsageInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

// ── Raw input ──────────────────────────────────────────────────

/// Average power over one metering slot starting at `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerReading {
    pub start: NaiveDateTime,
    pub average_power: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub quantity: Decimal,
}

/// Unvalidated usage data as handed over by loaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUsageProfile {
    #[serde(default)]
    pub unit: EnergyUnit,
    #[serde(default)]
    pub granularity_minutes: Option<u32>,
    #[serde(default)]
    pub intervals: Vec<RawInterval>,
    #[serde(default)]
    pub exports: Vec<RawInterval>,
}

impl RawUsageProfile {
    pub fn new(unit: EnergyUnit, intervals: Vec<RawInterval>) -> Self {
        Self {
            unit,
            granularity_minutes: None,
            intervals,
            exports: Vec::new(),
        }
    }

    pub fn with_exports(mut self, exports: Vec<RawInterval>) -> Self {
        self.exports = exports;
        self
    }

    pub fn with_granularity(mut self, minutes: u32) -> Self {
        self.granularity_minutes = Some(minutes);
        self
    }

    /// Floor every timestamp onto the declared granularity grid, e.g.
    /// 12:07:23 → 12:00 for 15-minute slots. No-op without a granularity.
    pub fn snap_to_granularity(mut self) -> Self {
        if let Some(minutes) = self.granularity_minutes.filter(|m| *m > 0) {
            let step = TimeDelta::minutes(i64::from(minutes));
            for interval in self.intervals.iter_mut().chain(self.exports.iter_mut()) {
                interval.start = floor_to_granularity(interval.start, step);
                interval.end = floor_to_granularity(interval.end, step);
            }
        }
        self
    }
}

/// Validate raw readings and build an immutable [`UsageProfile`].
///
/// Rejects non-positive durations, negative quantities, overlaps and, when a
/// granularity is declared, intervals off its grid. Imports and exports are
/// checked separately. Sorting happens here, once; consumers rely on the order.
pub fn validate_and_build_profile(raw: RawUsageProfile) -> ValidationResult<UsageProfile> {
    let granularity = match raw.granularity_minutes {
        Some(0) => return Err(ValidationError::InvalidGranularity),
        Some(m) => Some((m, TimeDelta::minutes(i64::from(m)))),
        None => None,
    };

    let intervals = build_intervals(raw.intervals, granularity)?;
    let exports = build_intervals(raw.exports, granularity)?;

    Ok(UsageProfile {
        unit: raw.unit,
        granularity_minutes: granularity.map(|(m, _)| m),
        intervals,
        exports,
    })
}

fn build_intervals(
    raw: Vec<RawInterval>,
    granularity: Option<(u32, TimeDelta)>,
) -> ValidationResult<Vec<UsageInterval>> {
    let mut intervals = Vec::with_capacity(raw.len());
    for (index, r) in raw.into_iter().enumerate() {
        if r.end <= r.start {
            return Err(ValidationError::NonPositiveDuration {
                index,
                start: r.start,
                end: r.end,
            });
        }
        if r.quantity < Decimal::ZERO {
            return Err(ValidationError::NegativeQuantity {
                index,
                quantity: r.quantity,
            });
        }
        if let Some((minutes, step)) = granularity {
            let whole_slots = span_nanos(r.end - r.start) % span_nanos(step) == 0;
            if !is_aligned(r.start, step) || !whole_slots {
                return Err(ValidationError::Misaligned {
                    start: r.start,
                    end: r.end,
                    granularity_minutes: minutes,
                });
            }
        }
        intervals.push(UsageInterval {
            start: r.start,
            end: r.end,
            quantity: r.quantity,
        });
    }

    intervals.sort_by_key(|i| i.start);

    if let Some(pair) = intervals.windows(2).find(|w| w[1].start < w[0].end) {
        return Err(ValidationError::OverlappingIntervals {
            first_start: pair[0].start,
            first_end: pair[0].end,
            second: pair[1].start,
        });
    }
    Ok(intervals)
}

// ── Tests ──────────────────────────────────────────────────────
