//! Splitting usage intervals at time-of-use band boundaries

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::domain::{RateSchedule, UsageInterval};
use crate::support::time::span_nanos;

/// Part of an interval that lies inside a single band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub quantity: Decimal,
    /// Index into [`RateSchedule::bands`]
    pub band: usize,
}

/// Lazy iterator over the band pieces of one interval.
///
/// Quantity is spread uniformly over time. The last piece takes whatever is
/// left so the pieces always add up to the interval's quantity exactly.
#[derive(Debug, Clone)]
pub struct BandSplit<'a> {
    schedule: &'a RateSchedule,
    cursor: NaiveDateTime,
    end: NaiveDateTime,
    quantity: Decimal,
    whole_nanos: Decimal,
    remaining: Decimal,
}

impl<'a> BandSplit<'a> {
    pub fn new(interval: &UsageInterval, schedule: &'a RateSchedule) -> Self {
        Self {
            schedule,
            cursor: interval.start,
            end: interval.end,
            quantity: interval.quantity,
            whole_nanos: Decimal::from(span_nanos(interval.duration())),
            remaining: interval.quantity,
        }
    }
}

impl Iterator for BandSplit<'_> {
    type Item = SubInterval;

    fn next(&mut self) -> Option<SubInterval> {
        if self.cursor >= self.end {
            return None;
        }

        let start = self.cursor;
        let end = self.schedule.next_boundary(start).min(self.end);
        let quantity = if end == self.end {
            self.remaining
        } else {
            self.quantity * Decimal::from(span_nanos(end - start)) / self.whole_nanos
        };
        self.remaining -= quantity;
        self.cursor = end;

        let midpoint = start + (end - start) / 2;
        let (band, _) = self.schedule.band_at(midpoint);
        Some(SubInterval {
            start,
            end,
            quantity,
            band,
        })
    }
}

/// Split `interval` wherever the band in force changes.
pub fn split_by_band<'a>(interval: &UsageInterval, schedule: &'a RateSchedule) -> BandSplit<'a> {
    BandSplit::new(interval, schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRateBand;
    use chrono::{Datelike, NaiveTime, Weekday};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn peak_offpeak() -> RateSchedule {
        RateSchedule::build(vec![
            RawRateBand::daily("offpeak", t(0), t(7), dec("0.12")),
            RawRateBand::daily("peak", t(7), t(0), dec("0.30")),
        ])
        .unwrap()
    }

    fn interval(start: &str, end: &str, quantity: &str) -> UsageInterval {
        UsageInterval {
            start: at(start),
            end: at(end),
            quantity: dec(quantity),
        }
    }

    #[test]
    fn interval_inside_one_band_is_not_split() {
        let schedule = peak_offpeak();
        let pieces: Vec<_> =
            split_by_band(&interval("2024-06-03 10:00", "2024-06-03 11:00", "2"), &schedule)
                .collect();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].quantity, dec("2"));
        assert_eq!(schedule.bands()[pieces[0].band].label, "peak");
    }

    #[test]
    fn splits_at_peak_transition_proportionally() {
        let schedule = peak_offpeak();
        let pieces: Vec<_> =
            split_by_band(&interval("2024-06-03 06:00", "2024-06-03 08:00", "3"), &schedule)
                .collect();

        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].end, at("2024-06-03 07:00"));
        assert_eq!(pieces[0].quantity, dec("1.5"));
        assert_eq!(pieces[1].quantity, dec("1.5"));
        assert_eq!(schedule.bands()[pieces[0].band].label, "offpeak");
        assert_eq!(schedule.bands()[pieces[1].band].label, "peak");
    }

    #[test]
    fn splits_at_midnight_and_keeps_total_exact() {
        let schedule = peak_offpeak();
        // 22:00 Sunday to 02:00 Monday crosses the week wrap as well
        let whole = interval("2024-06-09 22:00", "2024-06-10 02:00", "1");
        let pieces: Vec<_> = split_by_band(&whole, &schedule).collect();

        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].start.weekday(), Weekday::Sun);
        assert_eq!(pieces[1].start, at("2024-06-10 00:00"));
        let total: Decimal = pieces.iter().map(|p| p.quantity).sum();
        assert_eq!(total, dec("1"));
    }

    #[test]
    fn thirds_sum_back_to_the_quantity() {
        let schedule = RateSchedule::build(vec![
            RawRateBand::daily("a", t(0), t(1), dec("0.1")),
            RawRateBand::daily("b", t(1), t(2), dec("0.2")),
            RawRateBand::daily("c", t(2), t(0), dec("0.3")),
        ])
        .unwrap();
        let pieces: Vec<_> =
            split_by_band(&interval("2024-06-03 00:00", "2024-06-03 03:00", "1"), &schedule)
                .collect();

        assert_eq!(pieces.len(), 3);
        let total: Decimal = pieces.iter().map(|p| p.quantity).sum();
        assert_eq!(total, dec("1"));
        let bands: Vec<_> = pieces.iter().map(|p| p.band).collect();
        assert_eq!(bands, vec![0, 1, 2]);
    }
}
