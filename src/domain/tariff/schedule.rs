//! Time-of-use rate bands
//!
//! A schedule is a set of bands that covers every instant of the week exactly
//! once. Internally the week is flattened into segments of week offsets
//! (nanoseconds since Monday 00:00) so lookups are a binary search.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::support::errors::{ValidationError, ValidationResult};
use crate::support::time::{
    format_week_offset, time_of_day_nanos, week_offset, DAY_NANOS, WEEK_NANOS,
};

fn every_day() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
}

/// Unvalidated band.
///
/// The window `[start, end)` opens on each of `days`. When `end` is not after
/// `start` the window runs past midnight into the following day, so
/// `23:00..07:00` on Friday ends Saturday 07:00 and `00:00..00:00` is a whole day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRateBand {
    pub label: String,
    #[serde(default = "every_day")]
    pub days: Vec<Weekday>,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub price_per_unit: Decimal,
}

impl RawRateBand {
    /// Band opening on every day of the week.
    pub fn daily(label: impl Into<String>, start: NaiveTime, end: NaiveTime, price: Decimal) -> Self {
        Self {
            label: label.into(),
            days: every_day(),
            start,
            end,
            price_per_unit: price,
        }
    }

    pub fn on_days(mut self, days: &[Weekday]) -> Self {
        self.days = days.to_vec();
        self
    }
}

/// A validated time-of-use band.
#[derive(Debug, Clone, PartialEq)]
pub struct RateBand {
    pub label: String,
    pub days: Vec<Weekday>,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub price_per_unit: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    start: i64,
    end: i64,
    band: usize,
}

/// Bands that partition the week.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSchedule {
    bands: Vec<RateBand>,
    segments: Vec<Segment>,
}

impl RateSchedule {
    /// Validate that `raw` bands cover the week with no gap and no overlap.
    pub fn build(raw: Vec<RawRateBand>) -> ValidationResult<Self> {
        if raw.is_empty() {
            return Err(ValidationError::BandPartition(
                "at least one band is required".to_string(),
            ));
        }

        let mut segments = Vec::new();
        for (index, band) in raw.iter().enumerate() {
            if band.price_per_unit < Decimal::ZERO {
                return Err(ValidationError::NegativeAmount {
                    field: format!("price of band '{}'", band.label),
                    value: band.price_per_unit,
                });
            }
            if band.days.is_empty() {
                return Err(ValidationError::BandPartition(format!(
                    "band '{}' applies to no day",
                    band.label
                )));
            }

            let opens = time_of_day_nanos(band.start);
            let mut length = time_of_day_nanos(band.end) - opens;
            if length <= 0 {
                length += DAY_NANOS;
            }

            for day in &band.days {
                let start = i64::from(day.num_days_from_monday()) * DAY_NANOS + opens;
                let end = start + length;
                if end <= WEEK_NANOS {
                    segments.push(Segment { start, end, band: index });
                } else {
                    // Sunday window running into Monday
                    segments.push(Segment { start, end: WEEK_NANOS, band: index });
                    segments.push(Segment { start: 0, end: end - WEEK_NANOS, band: index });
                }
            }
        }
        segments.sort_by_key(|s| (s.start, s.end));

        let mut cursor = 0;
        let mut previous: Option<usize> = None;
        for segment in &segments {
            if segment.start > cursor {
                return Err(ValidationError::BandPartition(format!(
                    "no band covers {} to {}",
                    format_week_offset(cursor),
                    format_week_offset(segment.start)
                )));
            }
            if segment.start < cursor {
                let other = previous.map_or("?", |i| raw[i].label.as_str());
                return Err(ValidationError::BandPartition(format!(
                    "bands '{}' and '{}' overlap at {}",
                    other,
                    raw[segment.band].label,
                    format_week_offset(segment.start)
                )));
            }
            cursor = segment.end;
            previous = Some(segment.band);
        }
        if cursor < WEEK_NANOS {
            return Err(ValidationError::BandPartition(format!(
                "no band covers {} to {}",
                format_week_offset(cursor),
                format_week_offset(WEEK_NANOS)
            )));
        }

        let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
        for segment in segments {
            match merged.last_mut() {
                Some(last) if last.band == segment.band && last.end == segment.start => {
                    last.end = segment.end;
                }
                _ => merged.push(segment),
            }
        }

        let bands = raw
            .into_iter()
            .map(|b| RateBand {
                label: b.label,
                days: b.days,
                start: b.start,
                end: b.end,
                price_per_unit: b.price_per_unit,
            })
            .collect();

        Ok(Self {
            bands,
            segments: merged,
        })
    }

    pub fn bands(&self) -> &[RateBand] {
        &self.bands
    }

    fn segment_at(&self, at: NaiveDateTime) -> (Segment, i64) {
        let offset = week_offset(at);
        let index = self
            .segments
            .partition_point(|s| s.end <= offset)
            .min(self.segments.len() - 1);
        (self.segments[index], offset)
    }

    /// Index and band in force at `at`.
    pub fn band_at(&self, at: NaiveDateTime) -> (usize, &RateBand) {
        let (segment, _) = self.segment_at(at);
        (segment.band, &self.bands[segment.band])
    }

    /// First instant after `at` where a different segment starts.
    pub fn next_boundary(&self, at: NaiveDateTime) -> NaiveDateTime {
        let (segment, offset) = self.segment_at(at);
        at + TimeDelta::nanoseconds(segment.end - offset)
    }
}
