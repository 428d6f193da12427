//! Standing charge proration

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::domain::StandingChargePeriod;
use crate::support::errors::{RatingError, RatingResult};
use crate::support::time::{month_bounds, span_nanos, DAY_NANOS};

/// Scale a per-period standing charge to `[start, end)`, unrounded.
///
/// Daily charges count fractional days. Monthly charges walk the calendar:
/// each month overlapped contributes `overlap / length of that month`, so a
/// day in June is worth 1/30 and a day in July 1/31 of the monthly charge.
pub fn prorate_standing_charge(
    charge: Decimal,
    period: StandingChargePeriod,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> RatingResult<Decimal> {
    if end <= start {
        return Err(RatingError::InvalidPeriod { start, end });
    }
    if charge.is_zero() {
        return Ok(Decimal::ZERO);
    }

    match period {
        StandingChargePeriod::Daily => {
            Ok(charge * Decimal::from(span_nanos(end - start)) / Decimal::from(DAY_NANOS))
        }
        StandingChargePeriod::Monthly => {
            let mut total = Decimal::ZERO;
            let mut cursor = start;
            while cursor < end {
                let (month_start, month_end) =
                    month_bounds(cursor.date()).ok_or(RatingError::InvalidPeriod { start, end })?;
                let upto = month_end.min(end);
                let overlap = Decimal::from(span_nanos(upto - cursor));
                let length = Decimal::from(span_nanos(month_end - month_start));
                total += charge * overlap / length;
                cursor = upto;
            }
            Ok(total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn daily_charge_counts_fractional_days() {
        let charge = prorate_standing_charge(
            dec("0.48"),
            StandingChargePeriod::Daily,
            at("2024-06-01 00:00"),
            at("2024-06-03 12:00"),
        )
        .unwrap();
        assert_eq!(charge, dec("1.2"));
    }

    #[test]
    fn whole_month_costs_the_monthly_charge() {
        let charge = prorate_standing_charge(
            dec("7.005"),
            StandingChargePeriod::Monthly,
            at("2024-02-01 00:00"),
            at("2024-03-01 00:00"),
        )
        .unwrap();
        assert_eq!(charge, dec("7.005"));
    }

    #[test]
    fn monthly_charge_uses_each_month_length() {
        // 30 June (1/30 of June) plus 1 July (1/31 of July)
        let charge = prorate_standing_charge(
            dec("930"),
            StandingChargePeriod::Monthly,
            at("2024-06-30 00:00"),
            at("2024-07-02 00:00"),
        )
        .unwrap();
        assert_eq!(charge, dec("61"));
    }

    #[test]
    fn proration_is_linear_in_duration() {
        let two_days = prorate_standing_charge(
            dec("30"),
            StandingChargePeriod::Monthly,
            at("2024-06-01 00:00"),
            at("2024-06-03 00:00"),
        )
        .unwrap();
        let four_days = prorate_standing_charge(
            dec("30"),
            StandingChargePeriod::Monthly,
            at("2024-06-01 00:00"),
            at("2024-06-05 00:00"),
        )
        .unwrap();
        assert_eq!(two_days, dec("2"));
        assert_eq!(four_days, two_days * dec("2"));
    }

    #[test]
    fn rejects_empty_period() {
        let start = at("2024-06-01 00:00");
        assert_eq!(
            prorate_standing_charge(dec("5"), StandingChargePeriod::Daily, start, start),
            Err(RatingError::InvalidPeriod { start, end: start })
        );
    }
}
