//! Day/month decomposition under the 30-day month convention.

use chrono::{Datelike, NaiveDate};

use crate::models::{EffectiveInterval, TimeDecomposition};

/// Days in a legal month.
pub const DAYS_PER_MONTH: u32 = 30;

/// Decomposes an effective interval into 30-day months and remainder days.
///
/// The day count is inclusive of both endpoints. An empty interval yields
/// `{0, 0}`.
///
/// # Example
///
/// ```
/// use beneficios_engine::calculation::decompose;
/// use beneficios_engine::models::EffectiveInterval;
/// use chrono::NaiveDate;
///
/// let effective = EffectiveInterval::Span {
///     start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     end: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
/// };
/// let decomposition = decompose(&effective);
///
/// // 74 days
/// assert_eq!(decomposition.whole_months, 2);
/// assert_eq!(decomposition.remainder_days, 14);
/// ```
pub fn decompose(effective: &EffectiveInterval) -> TimeDecomposition {
    decompose_days(effective.days())
}

/// Decomposes a raw day count into 30-day months and remainder days.
pub fn decompose_days(total_days: u32) -> TimeDecomposition {
    TimeDecomposition {
        whole_months: total_days / DAYS_PER_MONTH,
        remainder_days: total_days % DAYS_PER_MONTH,
    }
}

/// Complete calendar months inside an effective interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullMonths {
    /// Months covered from their first to their last day.
    pub months: u32,
    /// Days of the interval falling outside those months.
    pub leftover_days: u32,
}

/// Counts the complete calendar months inside an effective interval.
///
/// A month counts only when the interval covers it from its first to its
/// last day. Gratificaciones are accrued this way: a partial month earns
/// nothing (Ley 27735, Art. 7).
///
/// ```
/// use beneficios_engine::calculation::count_full_months;
/// use beneficios_engine::models::EffectiveInterval;
/// use chrono::NaiveDate;
///
/// let effective = EffectiveInterval::Span {
///     start: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
///     end: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
/// };
/// let full = count_full_months(&effective);
/// assert_eq!(full.months, 3);
/// assert_eq!(full.leftover_days, 17);
/// ```
pub fn count_full_months(effective: &EffectiveInterval) -> FullMonths {
    let Some((start, end)) = effective.bounds() else {
        return FullMonths::default();
    };

    let mut months = 0;
    let mut covered_days = 0;
    let mut month_start = first_of_month(start);
    while month_start <= end {
        let month_end = last_of_month(month_start);
        if month_start >= start && month_end <= end {
            months += 1;
            covered_days += month_end.day();
        }
        match month_end.succ_opt() {
            Some(next) => month_start = next,
            None => break,
        }
    }

    FullMonths {
        months,
        leftover_days: effective.days() - covered_days,
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // December of the last representable year has no following month.
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
