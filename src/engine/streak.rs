//! Consecutive-day streak state machine.

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::StreakResetPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StreakStep {
    /// Same calendar day as the last qualifying activity.
    Unchanged,
    /// First qualifying activity ever, or the day after the last one.
    Advanced,
    /// The streak was broken; `previous` is the length it had.
    Reset { previous: u32 },
}

/// Advances the streak for a qualifying activity at `now`.
///
/// Returns the new streak length, the step taken, and the day to record as
/// `last_streak_day`.
pub(super) fn advance(
    policy: StreakResetPolicy,
    streak_days: u32,
    last_streak_day: Option<NaiveDate>,
    last_activity_ts: i64,
    now: DateTime<Utc>,
) -> (u32, StreakStep, NaiveDate) {
    let today = now.date_naive();

    if let StreakResetPolicy::InactiveHours { hours } = policy {
        let gap_secs = now.timestamp().saturating_sub(last_activity_ts);
        if last_activity_ts > 0 && gap_secs > i64::from(hours) * 3600 && streak_days > 0 {
            return (
                1,
                StreakStep::Reset {
                    previous: streak_days,
                },
                today,
            );
        }
    }

    let Some(last_day) = last_streak_day else {
        return (1, StreakStep::Advanced, today);
    };

    let gap_days = (today - last_day).num_days();
    match gap_days {
        // Clock skew can move "today" before the recorded day; treat it as
        // the same day rather than punishing the user.
        i64::MIN..=0 => (streak_days.max(1), StreakStep::Unchanged, last_day),
        1 => (streak_days + 1, StreakStep::Advanced, today),
        _ => {
            if streak_days == 0 {
                (1, StreakStep::Advanced, today)
            } else {
                (
                    1,
                    StreakStep::Reset {
                        previous: streak_days,
                    },
                    today,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_activity_starts_a_streak() {
        let (days, step, recorded) =
            advance(StreakResetPolicy::CalendarDay, 0, None, 0, at(2024, 3, 1, 12));
        assert_eq!((days, step), (1, StreakStep::Advanced));
        assert_eq!(recorded, day(2024, 3, 1));
    }

    #[test]
    fn same_day_activity_is_a_no_op() {
        let (days, step, recorded) = advance(
            StreakResetPolicy::CalendarDay,
            3,
            Some(day(2024, 3, 1)),
            at(2024, 3, 1, 9).timestamp(),
            at(2024, 3, 1, 23),
        );
        assert_eq!((days, step), (3, StreakStep::Unchanged));
        assert_eq!(recorded, day(2024, 3, 1));
    }

    #[test]
    fn consecutive_days_increment() {
        let (days, step, _) = advance(
            StreakResetPolicy::CalendarDay,
            3,
            Some(day(2024, 3, 1)),
            at(2024, 3, 1, 23).timestamp(),
            at(2024, 3, 2, 0),
        );
        assert_eq!((days, step), (4, StreakStep::Advanced));
    }

    #[test]
    fn two_day_gap_resets() {
        let (days, step, _) = advance(
            StreakResetPolicy::CalendarDay,
            5,
            Some(day(2024, 3, 1)),
            at(2024, 3, 1, 12).timestamp(),
            at(2024, 3, 3, 12),
        );
        assert_eq!(days, 1);
        assert_eq!(step, StreakStep::Reset { previous: 5 });
    }

    #[test]
    fn gap_after_zero_streak_does_not_report_a_break() {
        let (days, step, _) = advance(
            StreakResetPolicy::CalendarDay,
            0,
            Some(day(2024, 3, 1)),
            0,
            at(2024, 3, 10, 12),
        );
        assert_eq!((days, step), (1, StreakStep::Advanced));
    }

    #[test]
    fn inactivity_hours_break_within_calendar_rules() {
        // Next calendar day, but 30h of silence under a 24h policy.
        let (days, step, _) = advance(
            StreakResetPolicy::InactiveHours { hours: 24 },
            7,
            Some(day(2024, 3, 1)),
            at(2024, 3, 1, 6).timestamp(),
            at(2024, 3, 2, 12),
        );
        assert_eq!(days, 1);
        assert_eq!(step, StreakStep::Reset { previous: 7 });
    }

    #[test]
    fn inactivity_policy_keeps_streak_within_window() {
        let (days, step, _) = advance(
            StreakResetPolicy::InactiveHours { hours: 48 },
            7,
            Some(day(2024, 3, 1)),
            at(2024, 3, 1, 20).timestamp(),
            at(2024, 3, 2, 12),
        );
        assert_eq!((days, step), (8, StreakStep::Advanced));
    }
}
