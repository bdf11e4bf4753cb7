//! Daily check-in streak calculation.
//!
//! The original app recomputed streaks inline in each submission handler with
//! ad hoc date math; here it is a single pure function shared by every caller.
//! All dates are UTC calendar dates (`Utc::now().date_naive()` at the edges),
//! so "yesterday" means the previous UTC day regardless of the client's clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-user streak counters. One row per user, created zeroed at
/// registration and only ever mutated through [`update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserStreak {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_logged_date: Option<NaiveDate>,
}

impl UserStreak {
    /// The state a freshly registered user starts from.
    pub fn new() -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            last_logged_date: None,
        }
    }
}

impl Default for UserStreak {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance the streak for a check-in on `event_date`.
///
/// Total and pure. Repeated events on the same calendar day are no-ops, so
/// callers may apply this once per logged entry without deduplicating first.
/// A gap of more than one day (or a backdated event) restarts the streak at
/// 1, never 0. `longest_streak` never decreases and always dominates
/// `current_streak` in the result.
pub fn update(prior: &UserStreak, event_date: NaiveDate) -> UserStreak {
    if prior.last_logged_date == Some(event_date) {
        return prior.clone();
    }

    let continues = prior
        .last_logged_date
        .map_or(false, |last| last.succ_opt() == Some(event_date));

    let current = if continues { prior.current_streak + 1 } else { 1 };

    UserStreak {
        current_streak: current,
        longest_streak: prior.longest_streak.max(current),
        last_logged_date: Some(event_date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn streak(current: i32, longest: i32, last: &str) -> UserStreak {
        UserStreak {
            current_streak: current,
            longest_streak: longest,
            last_logged_date: Some(date(last)),
        }
    }

    #[test]
    fn first_event_starts_streak_at_one() {
        let result = update(&UserStreak::new(), date("2024-01-10"));
        assert_eq!(result, streak(1, 1, "2024-01-10"));
    }

    #[test]
    fn same_day_resubmission_is_a_no_op() {
        let prior = streak(3, 5, "2024-01-10");
        assert_eq!(update(&prior, date("2024-01-10")), prior);
    }

    #[test]
    fn consecutive_day_increments() {
        let prior = streak(3, 5, "2024-01-10");
        let result = update(&prior, date("2024-01-11"));
        assert_eq!(result, streak(4, 5, "2024-01-11"));
    }

    #[test]
    fn gap_resets_to_one() {
        let prior = streak(3, 5, "2024-01-10");
        let result = update(&prior, date("2024-01-13"));
        assert_eq!(result, streak(1, 5, "2024-01-13"));
    }

    #[test]
    fn two_day_gap_resets_to_one() {
        let prior = streak(3, 5, "2024-01-10");
        let result = update(&prior, date("2024-01-12"));
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.last_logged_date, Some(date("2024-01-12")));
    }

    #[test]
    fn backdated_event_resets_to_one() {
        let prior = streak(3, 5, "2024-01-10");
        let result = update(&prior, date("2024-01-05"));
        assert_eq!(result, streak(1, 5, "2024-01-05"));
    }

    #[test]
    fn longest_follows_current_past_the_record() {
        let prior = streak(5, 5, "2024-01-10");
        let result = update(&prior, date("2024-01-11"));
        assert_eq!(result.current_streak, 6);
        assert_eq!(result.longest_streak, 6);
    }

    #[test]
    fn longest_is_monotone_across_a_run_of_updates() {
        let mut state = UserStreak::new();
        let days = [
            "2024-01-01",
            "2024-01-02",
            "2024-01-03",
            "2024-01-03", // duplicate
            "2024-01-07", // gap
            "2024-01-08",
            "2024-01-08", // duplicate
            "2024-01-09",
            "2024-01-10",
        ];
        let mut prev_longest = 0;
        for d in days {
            state = update(&state, date(d));
            assert!(state.longest_streak >= state.current_streak);
            assert!(state.longest_streak >= prev_longest);
            assert!(state.current_streak >= 1);
            prev_longest = state.longest_streak;
        }
        assert_eq!(state.current_streak, 4);
        assert_eq!(state.longest_streak, 4);
    }

    #[test]
    fn month_boundary_counts_as_consecutive() {
        let prior = streak(2, 2, "2024-01-31");
        let result = update(&prior, date("2024-02-01"));
        assert_eq!(result.current_streak, 3);
    }
}
