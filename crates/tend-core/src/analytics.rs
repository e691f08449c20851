//! Aggregation formulas: completion rates, streaks, mood trends.
//!
//! All functions are pure over rows the store already fetched. Duplicate
//! completion logs in one eligible period collapse to a single countable
//! completion — dedup is by period membership, never by row count.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Days, NaiveDate, Utc};
use uuid::Uuid;

use tend_types::api::{HabitAnalytics, MoodTrendPoint};
use tend_types::domain::Frequency;

use crate::period::{self, PeriodIndex};

/// Distinct eligible periods that have at least one completion log.
pub fn completed_periods(log_dates: &[NaiveDate], frequency: Frequency) -> BTreeSet<PeriodIndex> {
    log_dates
        .iter()
        .map(|d| period::period_index(*d, frequency))
        .collect()
}

/// Consecutive completed periods ending at "today", scanning backward.
/// Today counts when completed; an uncompleted today does not break the
/// streak — the scan then starts at the previous period.
pub fn current_streak(
    completed: &BTreeSet<PeriodIndex>,
    today: NaiveDate,
    frequency: Frequency,
) -> u32 {
    let today_idx = period::period_index(today, frequency);
    let mut cursor = if completed.contains(&today_idx) {
        today_idx
    } else {
        today_idx.prev()
    };

    let mut streak = 0;
    while completed.contains(&cursor) {
        streak += 1;
        cursor = cursor.prev();
    }
    streak
}

/// Whole percent in [0, 100]. Exactly 0 when there are no eligible
/// periods — never NaN, never a division error.
pub fn completion_rate(completed: u32, eligible: u32) -> u8 {
    if eligible == 0 {
        return 0;
    }
    let pct = (f64::from(completed) / f64::from(eligible) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// First day of an N-day window ending at `today` (inclusive). `None`
/// means the window is empty.
pub fn window_start(today: NaiveDate, days: u32) -> Option<NaiveDate> {
    let back = days.checked_sub(1)?;
    today.checked_sub_days(Days::new(u64::from(back)))
}

/// Inputs for one habit's analytics row.
pub struct HabitFacts<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub frequency: Frequency,
    pub created: NaiveDate,
    pub log_dates: &'a [NaiveDate],
}

pub fn habit_analytics(facts: &HabitFacts<'_>, window_days: u32, today: NaiveDate) -> HabitAnalytics {
    let completed = completed_periods(facts.log_dates, facts.frequency);
    let streak = current_streak(&completed, today, facts.frequency);

    let (eligible, in_window) = match window_start(today, window_days) {
        Some(start) => {
            let eligible =
                period::eligible_periods(start, today, facts.created, facts.frequency);
            let from = period::period_index(start.max(facts.created), facts.frequency);
            let to = period::period_index(today, facts.frequency);
            let in_window = completed.range(from..=to).count() as u32;
            (eligible, in_window)
        }
        None => (0, 0),
    };

    HabitAnalytics {
        habit_id: facts.id,
        habit_name: facts.name.to_string(),
        total_completions: in_window,
        total_eligible_days: eligible,
        completion_rate: completion_rate(in_window, eligible),
        current_streak: streak,
    }
}

/// One point per day that has a check-in; the latest check-in of a day is
/// authoritative. Days without a check-in are omitted, not zero-filled.
pub fn mood_trend(checkins: &[(DateTime<Utc>, u8)]) -> Vec<MoodTrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, (DateTime<Utc>, u8)> = BTreeMap::new();
    for (ts, mood) in checkins {
        let entry = by_day.entry(ts.date_naive()).or_insert((*ts, *mood));
        if *ts >= entry.0 {
            *entry = (*ts, *mood);
        }
    }
    by_day
        .into_iter()
        .map(|(date, (_, mood))| MoodTrendPoint { date, mood })
        .collect()
}

pub fn average_mood(trend: &[MoodTrendPoint]) -> Option<f64> {
    if trend.is_empty() {
        return None;
    }
    let sum: u32 = trend.iter().map(|p| u32::from(p.mood)).sum();
    let avg = f64::from(sum) / trend.len() as f64;
    Some((avg * 100.0).round() / 100.0)
}

/// Today's most recent check-in, if any. Null is reserved for "no check-in
/// today" — yesterday's mood never leaks into the current value.
pub fn current_mood(checkins: &[(DateTime<Utc>, u8)], today: NaiveDate) -> Option<u8> {
    checkins
        .iter()
        .filter(|(ts, _)| ts.date_naive() == today)
        .max_by_key(|(ts, _)| *ts)
        .map(|(_, mood)| *mood)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn d(s: &str) -> NaiveDate {
        s.parse().expect("test date")
    }

    fn ts(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .expect("test timestamp")
            .and_utc()
    }

    #[test]
    fn duplicate_logs_in_one_period_count_once() {
        let logs = vec![d("2025-05-01"), d("2025-05-01"), d("2025-05-02")];
        let completed = completed_periods(&logs, Frequency::Daily);
        assert_eq!(completed.len(), 2);
    }

    #[test]
    fn streak_resets_on_gap() {
        // Completed days 1-3, missed day 4: streak on day 5 is 0.
        let logs = vec![d("2025-05-01"), d("2025-05-02"), d("2025-05-03")];
        let completed = completed_periods(&logs, Frequency::Daily);
        assert_eq!(current_streak(&completed, d("2025-05-05"), Frequency::Daily), 0);

        // Completing day 5 starts a fresh streak of 1.
        let logs = vec![
            d("2025-05-01"),
            d("2025-05-02"),
            d("2025-05-03"),
            d("2025-05-05"),
        ];
        let completed = completed_periods(&logs, Frequency::Daily);
        assert_eq!(current_streak(&completed, d("2025-05-05"), Frequency::Daily), 1);
    }

    #[test]
    fn uncompleted_today_does_not_break_streak() {
        let logs = vec![d("2025-05-03"), d("2025-05-04")];
        let completed = completed_periods(&logs, Frequency::Daily);
        assert_eq!(current_streak(&completed, d("2025-05-05"), Frequency::Daily), 2);
    }

    #[test]
    fn weekly_streak_counts_iso_weeks() {
        // One log in each of three consecutive ISO weeks.
        let logs = vec![d("2025-03-04"), d("2025-03-12"), d("2025-03-17")];
        let completed = completed_periods(&logs, Frequency::Weekly);
        assert_eq!(
            current_streak(&completed, d("2025-03-20"), Frequency::Weekly),
            3
        );
    }

    #[test]
    fn rate_is_zero_when_no_eligible_days() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(5, 0), 0);
    }

    #[test]
    fn rate_is_bounded_and_rounded() {
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(3, 3), 100);
        assert_eq!(completion_rate(10, 3), 100);
    }

    #[test]
    fn habit_analytics_dedupes_and_clamps_to_creation() {
        let logs = vec![d("2025-06-28"), d("2025-06-28"), d("2025-06-29"), d("2025-06-30")];
        let facts = HabitFacts {
            id: Uuid::new_v4(),
            name: "stretch",
            frequency: Frequency::Daily,
            created: d("2025-06-27"),
            log_dates: &logs,
        };
        let out = habit_analytics(&facts, 30, d("2025-06-30"));
        // Created 4 days ago, so only 4 eligible days despite the 30-day window.
        assert_eq!(out.total_eligible_days, 4);
        assert_eq!(out.total_completions, 3);
        assert_eq!(out.completion_rate, 75);
        assert_eq!(out.current_streak, 3);
    }

    #[test]
    fn mood_trend_takes_latest_per_day_and_omits_gaps() {
        let checkins = vec![
            (ts("2025-05-01 08:00:00"), 2),
            (ts("2025-05-01 21:00:00"), 4),
            (ts("2025-05-03 09:00:00"), 5),
        ];
        let trend = mood_trend(&checkins);
        assert_eq!(
            trend,
            vec![
                MoodTrendPoint { date: d("2025-05-01"), mood: 4 },
                MoodTrendPoint { date: d("2025-05-03"), mood: 5 },
            ]
        );
        assert_eq!(average_mood(&trend), Some(4.5));
    }

    #[test]
    fn empty_window_has_empty_trend_and_no_average() {
        let trend = mood_trend(&[]);
        assert!(trend.is_empty());
        assert_eq!(average_mood(&trend), None);
    }

    #[test]
    fn current_mood_is_today_only() {
        let checkins = vec![(ts("2025-05-04 22:00:00"), 5)];
        assert_eq!(current_mood(&checkins, d("2025-05-05")), None);
        assert_eq!(current_mood(&checkins, d("2025-05-04")), Some(5));
    }
}
