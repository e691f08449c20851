//! The eligible-period calendar.
//!
//! A habit's frequency maps calendar dates onto a dense sequence of period
//! indices: daily habits get one index per day, weekly habits one per ISO
//! week (Monday-anchored). Consecutive periods map to consecutive integers,
//! which turns streak scanning into a backward walk and deduplication into
//! set membership.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use tend_types::domain::Frequency;

/// Dense index of one eligible period for a given frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodIndex(i64);

impl PeriodIndex {
    pub fn prev(self) -> Self {
        Self(self.0 - 1)
    }
}

pub fn period_index(date: NaiveDate, frequency: Frequency) -> PeriodIndex {
    match frequency {
        // `custom` shares the daily calendar until custom schedules exist.
        Frequency::Daily | Frequency::Custom => PeriodIndex(i64::from(date.num_days_from_ce())),
        Frequency::Weekly => {
            let monday = date.week(Weekday::Mon).first_day();
            PeriodIndex(i64::from(monday.num_days_from_ce()).div_euclid(7))
        }
    }
}

/// Calendar bounds of the period containing `date`: start inclusive, end
/// exclusive. Used to range-scan completion logs for one period.
pub fn period_bounds(date: NaiveDate, frequency: Frequency) -> (NaiveDate, NaiveDate) {
    match frequency {
        Frequency::Daily | Frequency::Custom => (
            date,
            date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX),
        ),
        Frequency::Weekly => {
            let monday = date.week(Weekday::Mon).first_day();
            (
                monday,
                monday.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX),
            )
        }
    }
}

/// Number of eligible periods in the window `[window_start, today]`,
/// clamped to the habit's creation date. Zero when the effective window is
/// empty.
pub fn eligible_periods(
    window_start: NaiveDate,
    today: NaiveDate,
    created: NaiveDate,
    frequency: Frequency,
) -> u32 {
    let start = window_start.max(created);
    if start > today {
        return 0;
    }
    let span = period_index(today, frequency).0 - period_index(start, frequency).0 + 1;
    u32::try_from(span).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().expect("test date")
    }

    #[test]
    fn daily_periods_are_consecutive_days() {
        let a = period_index(d("2025-03-01"), Frequency::Daily);
        let b = period_index(d("2025-03-02"), Frequency::Daily);
        assert_eq!(b.prev(), a);
    }

    #[test]
    fn weekly_periods_follow_iso_weeks() {
        // Sunday and the following Monday land in different ISO weeks.
        let sun = period_index(d("2025-03-09"), Frequency::Weekly);
        let mon = period_index(d("2025-03-10"), Frequency::Weekly);
        assert_eq!(mon.prev(), sun);

        // Monday through Sunday of one week share an index.
        assert_eq!(
            period_index(d("2025-03-10"), Frequency::Weekly),
            period_index(d("2025-03-16"), Frequency::Weekly)
        );
    }

    #[test]
    fn weekly_bounds_span_monday_to_monday() {
        let (start, end) = period_bounds(d("2025-03-12"), Frequency::Weekly);
        assert_eq!(start, d("2025-03-10"));
        assert_eq!(end, d("2025-03-17"));
    }

    #[test]
    fn eligible_clamps_to_creation_date() {
        // 30-day window, habit created 7 days ago (inclusive of today = 8 days).
        let today = d("2025-06-30");
        let window_start = d("2025-06-01");
        let created = d("2025-06-23");
        assert_eq!(eligible_periods(window_start, today, created, Frequency::Daily), 8);
    }

    #[test]
    fn eligible_is_zero_for_empty_window() {
        let today = d("2025-06-30");
        assert_eq!(
            eligible_periods(d("2025-06-01"), today, d("2025-07-04"), Frequency::Daily),
            0
        );
    }
}
