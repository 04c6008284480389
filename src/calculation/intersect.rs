//! Clipping an employment interval against a period window.

use crate::models::{EffectiveInterval, EmploymentInterval, PeriodWindow};

/// Intersects an employment interval with a window.
///
/// The result is [`EffectiveInterval::Empty`] when the employee started after
/// the window closed or ceased before it opened. That is a normal outcome
/// and not an error.
///
/// # Example
///
/// ```
/// use beneficios_engine::calculation::{intersect, resolve_window};
/// use beneficios_engine::models::{EffectiveInterval, EmploymentInterval, WindowScheme};
/// use chrono::NaiveDate;
///
/// let interval = EmploymentInterval::new(
///     NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
/// ).unwrap();
/// let window = resolve_window(
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     WindowScheme::SemiannualCalendar,
/// );
///
/// assert_eq!(intersect(&interval, &window), EffectiveInterval::Empty);
/// ```
pub fn intersect(interval: &EmploymentInterval, window: &PeriodWindow) -> EffectiveInterval {
    let start = interval.start().max(window.start);
    let end = interval.end().min(window.end);

    if start > end {
        EffectiveInterval::Empty
    } else {
        EffectiveInterval::Span { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn first_half_2025() -> PeriodWindow {
        PeriodWindow {
            start: date(2025, 1, 1),
            end: date(2025, 6, 30),
            label: "Ene-Jun 2025".to_string(),
        }
    }

    fn interval(start: NaiveDate, end: NaiveDate) -> EmploymentInterval {
        EmploymentInterval::new(start, end).unwrap()
    }

    #[test]
    fn test_interval_inside_window_is_unchanged() {
        let effective = intersect(
            &interval(date(2025, 1, 1), date(2025, 3, 15)),
            &first_half_2025(),
        );
        assert_eq!(
            effective,
            EffectiveInterval::Span {
                start: date(2025, 1, 1),
                end: date(2025, 3, 15)
            }
        );
    }

    #[test]
    fn test_interval_spanning_window_is_clipped_both_sides() {
        let effective = intersect(
            &interval(date(2020, 3, 1), date(2026, 2, 1)),
            &first_half_2025(),
        );
        assert_eq!(effective.bounds(), Some((date(2025, 1, 1), date(2025, 6, 30))));
    }

    #[test]
    fn test_started_mid_window() {
        let effective = intersect(
            &interval(date(2025, 4, 10), date(2025, 12, 31)),
            &first_half_2025(),
        );
        assert_eq!(effective.bounds(), Some((date(2025, 4, 10), date(2025, 6, 30))));
    }

    #[test]
    fn test_started_after_window_is_empty() {
        let effective = intersect(
            &interval(date(2025, 8, 1), date(2025, 12, 31)),
            &first_half_2025(),
        );
        assert!(effective.is_empty());
    }

    #[test]
    fn test_ceased_before_window_is_empty() {
        let effective = intersect(
            &interval(date(2024, 2, 1), date(2024, 12, 31)),
            &first_half_2025(),
        );
        assert!(effective.is_empty());
    }

    #[test]
    fn test_single_overlapping_day() {
        let effective = intersect(
            &interval(date(2025, 6, 30), date(2025, 9, 1)),
            &first_half_2025(),
        );
        assert_eq!(effective.days(), 1);
    }
}
