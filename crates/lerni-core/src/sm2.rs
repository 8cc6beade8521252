//! SM-2 spaced repetition scheduling.
//!
//! [`compute`] is a pure function of the prior [`ScheduleState`], a quality
//! grade in `0..=5`, and the current time. It never reads a clock and never
//! clamps an out-of-range grade.
//!
//! ```text
//! EF' = max(1.3, EF + (0.1 - (5 - g) * (0.08 + (5 - g) * 0.02)))
//!
//! g < 3          → repetitions = 0, interval = 1
//! repetitions 0  → interval = 1
//! repetitions 1  → interval = 6
//! otherwise      → interval = round(interval * EF')
//! ```
//!
//! Intervals are capped at [`MAX_INTERVAL_DAYS`] so due dates stay within
//! the range the store can write and read back.

use chrono::{DateTime, Duration, Utc};

use crate::entities::ScheduleState;
use crate::errors::CoreError;

pub const DEFAULT_EASINESS_FACTOR: f64 = 2.5;
pub const MIN_EASINESS_FACTOR: f64 = 1.3;
pub const MAX_GRADE: u8 = 5;

/// Longest interval a review can schedule: one hundred years.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Lowest grade that counts as a successful recall.
pub const PASSING_GRADE: u8 = 3;

const GRADE_DESCRIPTIONS: [&str; 6] = [
    "Complete blackout",
    "Incorrect, but recognized answer",
    "Incorrect, but easy to recall",
    "Correct with serious difficulty",
    "Correct with hesitation",
    "Perfect response",
];

/// Compute the next schedule state after a review graded `grade` at `now`.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] if `grade > 5`, or if the next due date
/// falls outside the representable range.
pub fn compute(
    current: &ScheduleState,
    grade: u8,
    now: DateTime<Utc>,
) -> Result<ScheduleState, CoreError> {
    if grade > MAX_GRADE {
        return Err(CoreError::validation(format!(
            "Grade must be between 0 and {MAX_GRADE}, got {grade}"
        )));
    }

    let easiness_factor = next_easiness_factor(current.easiness_factor, grade);

    let (interval, repetitions) = if grade < PASSING_GRADE {
        (1, 0)
    } else {
        let interval = match current.repetitions {
            0 => 1,
            1 => 6,
            _ => scaled_interval(current.interval, easiness_factor),
        };
        (interval, current.repetitions.saturating_add(1))
    };

    let next_review_at = now
        .checked_add_signed(Duration::days(i64::from(interval)))
        .ok_or_else(|| {
            CoreError::validation(format!(
                "Next review date out of range ({interval} days after {now})"
            ))
        })?;

    Ok(ScheduleState {
        easiness_factor,
        interval,
        repetitions,
        next_review_at,
    })
}

fn next_easiness_factor(easiness_factor: f64, grade: u8) -> f64 {
    let miss = f64::from(MAX_GRADE - grade);
    let next = miss.mul_add(-miss.mul_add(0.02, 0.08), easiness_factor + 0.1);
    next.max(MIN_EASINESS_FACTOR)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_interval(interval: u32, easiness_factor: f64) -> u32 {
    let scaled = (f64::from(interval) * easiness_factor).round();
    if scaled >= f64::from(MAX_INTERVAL_DAYS) {
        MAX_INTERVAL_DAYS
    } else {
        scaled as u32
    }
}

/// Human-readable label for a grade, or `"Unknown grade"`.
#[must_use]
pub fn grade_description(grade: u8) -> &'static str {
    GRADE_DESCRIPTIONS
        .get(usize::from(grade))
        .copied()
        .unwrap_or("Unknown grade")
}

/// Format an interval in days as "1 day", "2 weeks", "3 months", "1 year".
#[must_use]
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "today".to_string(),
        1 => "1 day".to_string(),
        2..=6 => format!("{days} days"),
        7..=13 => "1 week".to_string(),
        14..=29 => format!("{} weeks", days / 7),
        30..=59 => "1 month".to_string(),
        60..=364 => format!("{} months", days / 30),
        _ => {
            let years = days / 365;
            if years == 1 {
                "1 year".to_string()
            } else {
                format!("{years} years")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn state(easiness_factor: f64, interval: u32, repetitions: u32) -> ScheduleState {
        ScheduleState {
            easiness_factor,
            interval,
            repetitions,
            next_review_at: now(),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn failing_grade_resets(#[case] grade: u8) {
        let next = compute(&state(2.5, 15, 4), grade, now()).unwrap();
        assert_eq!(next.repetitions, 0);
        assert_eq!(next.interval, 1);
        assert_eq!(next.next_review_at, now() + Duration::days(1));
    }

    #[rstest]
    #[case(0, 0, 1)]
    #[case(0, 1, 6)]
    #[case(6, 2, 15)]
    #[case(15, 3, 38)]
    fn passing_interval_by_repetitions(
        #[case] interval: u32,
        #[case] repetitions: u32,
        #[case] expected: u32,
    ) {
        // grade 4 keeps EF at 2.5
        let next = compute(&state(2.5, interval, repetitions), 4, now()).unwrap();
        assert!(approx(next.easiness_factor, 2.5));
        assert_eq!(next.interval, expected);
        assert_eq!(next.repetitions, repetitions + 1);
    }

    #[rstest]
    #[case(0, 1.7)]
    #[case(1, 1.96)]
    #[case(2, 2.18)]
    #[case(3, 2.36)]
    #[case(4, 2.5)]
    #[case(5, 2.6)]
    fn easiness_factor_adjustment(#[case] grade: u8, #[case] expected: f64) {
        let next = compute(&state(2.5, 6, 2), grade, now()).unwrap();
        assert!(
            approx(next.easiness_factor, expected),
            "grade {grade}: got {}",
            next.easiness_factor
        );
    }

    #[test]
    fn easiness_factor_never_below_minimum() {
        let mut current = ScheduleState::initial(now());
        for _ in 0..20 {
            current = compute(&current, 0, now()).unwrap();
            assert!(current.easiness_factor >= MIN_EASINESS_FACTOR);
        }
        assert!(approx(current.easiness_factor, MIN_EASINESS_FACTOR));
    }

    #[test]
    fn grade_out_of_range_is_rejected() {
        let err = compute(&ScheduleState::initial(now()), 6, now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn three_perfect_reviews() {
        let mut current = ScheduleState::initial(now());
        let mut intervals = Vec::new();
        for _ in 0..3 {
            current = compute(&current, 5, now()).unwrap();
            intervals.push(current.interval);
        }

        // EF after three grade-5 reviews: 2.5 + 3 * 0.1
        assert!(approx(current.easiness_factor, 2.8));
        assert_eq!(intervals, vec![1, 6, 17]);
        assert_eq!(current.repetitions, 3);
    }

    #[test]
    fn passing_intervals_never_shrink() {
        let mut current = ScheduleState::initial(now());
        let mut previous = 0;
        for grade in [3, 3, 3, 3, 3, 3, 3, 3] {
            current = compute(&current, grade, now()).unwrap();
            assert!(current.interval >= previous);
            previous = current.interval;
        }
    }

    #[test]
    fn long_perfect_streak_stops_at_the_cap() {
        let mut current = ScheduleState::initial(now());
        let mut previous = 0;
        for _ in 0..40 {
            current = compute(&current, 5, now()).unwrap();
            assert!(current.interval >= previous);
            assert!(current.interval <= MAX_INTERVAL_DAYS);
            previous = current.interval;
        }
        assert_eq!(current.interval, MAX_INTERVAL_DAYS);
        assert_eq!(
            current.next_review_at,
            now() + Duration::days(i64::from(MAX_INTERVAL_DAYS))
        );
    }

    #[test]
    fn due_date_past_chrono_range_is_rejected() {
        let edge = DateTime::<Utc>::MAX_UTC - Duration::days(3);
        let err = compute(&state(2.5, 6, 2), 4, edge).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn next_review_is_relative_to_now_not_previous_due_date() {
        let mut current = state(2.5, 6, 2);
        current.next_review_at = now() - Duration::days(30);
        let next = compute(&current, 4, now()).unwrap();
        assert_eq!(next.next_review_at, now() + Duration::days(15));
    }

    #[test]
    fn initial_state_is_due_immediately() {
        let initial = ScheduleState::initial(now());
        assert!(approx(initial.easiness_factor, DEFAULT_EASINESS_FACTOR));
        assert_eq!(initial.interval, 0);
        assert_eq!(initial.repetitions, 0);
        assert!(initial.is_due(now()));
    }

    #[rstest]
    #[case(0, "Complete blackout")]
    #[case(3, "Correct with serious difficulty")]
    #[case(5, "Perfect response")]
    #[case(9, "Unknown grade")]
    fn grade_descriptions(#[case] grade: u8, #[case] expected: &str) {
        assert_eq!(grade_description(grade), expected);
    }

    #[rstest]
    #[case(1, "1 day")]
    #[case(4, "4 days")]
    #[case(7, "1 week")]
    #[case(21, "3 weeks")]
    #[case(30, "1 month")]
    #[case(90, "3 months")]
    #[case(365, "1 year")]
    #[case(800, "2 years")]
    fn interval_formatting(#[case] days: u32, #[case] expected: &str) {
        assert_eq!(format_interval(days), expected);
    }
}
