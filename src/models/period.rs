//! Period window, effective interval and time decomposition models.
//!
//! These are the value types flowing through the proration pipeline:
//! a [`PeriodWindow`] is resolved from a reference date, clipped against an
//! employment interval into an [`EffectiveInterval`], and finally turned into
//! a [`TimeDecomposition`] of 30-day months and remainder days.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Selects which legal semester cutoffs apply when resolving a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowScheme {
    /// January–June and July–December (gratificaciones, Ley 27735).
    SemiannualCalendar,
    /// May–October and November–April (CTS, D.S. 001-97-TR).
    SemiannualOffset,
}

/// A named calendar window with inclusive bounds.
///
/// # Example
///
/// ```
/// use beneficios_engine::models::PeriodWindow;
/// use chrono::NaiveDate;
///
/// let window = PeriodWindow {
///     start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     end: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
///     label: "Ene-Jun 2025".to_string(),
/// };
///
/// assert!(window.contains(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()));
/// assert!(!window.contains(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    /// First day of the window (inclusive).
    pub start: NaiveDate,
    /// Last day of the window (inclusive).
    pub end: NaiveDate,
    /// Display label (e.g. "Nov. 2024 - Abr. 2025").
    pub label: String,
}

impl PeriodWindow {
    /// Checks if a date lies within the window, inclusive of both bounds.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// The overlap between an employment interval and a period window.
///
/// `Empty` is the normal outcome for employees who started after the window
/// closed or ceased before it opened; it carries zero computable days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectiveInterval {
    /// No overlap.
    Empty,
    /// Overlap with inclusive bounds, `start <= end`.
    Span {
        /// First computable day.
        start: NaiveDate,
        /// Last computable day.
        end: NaiveDate,
    },
}

impl EffectiveInterval {
    /// Returns true if there is no computable time.
    pub fn is_empty(&self) -> bool {
        matches!(self, EffectiveInterval::Empty)
    }

    /// Number of calendar days covered, counting both endpoints.
    ///
    /// # Example
    ///
    /// ```
    /// use beneficios_engine::models::EffectiveInterval;
    /// use chrono::NaiveDate;
    ///
    /// let span = EffectiveInterval::Span {
    ///     start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    ///     end: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
    /// };
    /// assert_eq!(span.days(), 74);
    /// assert_eq!(EffectiveInterval::Empty.days(), 0);
    /// ```
    pub fn days(&self) -> u32 {
        match self {
            EffectiveInterval::Empty => 0,
            EffectiveInterval::Span { start, end } => {
                u32::try_from((*end - *start).num_days() + 1).unwrap_or(0)
            }
        }
    }

    /// Returns the inclusive bounds, if any.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            EffectiveInterval::Empty => None,
            EffectiveInterval::Span { start, end } => Some((*start, *end)),
        }
    }

    /// Display label in `dd/mm/yyyy - dd/mm/yyyy` form.
    pub fn label(&self) -> String {
        match self {
            EffectiveInterval::Empty => "Sin periodo computable".to_string(),
            EffectiveInterval::Span { start, end } => format!(
                "{} - {}",
                start.format("%d/%m/%Y"),
                end.format("%d/%m/%Y")
            ),
        }
    }
}

/// Computable time expressed as 30-day months plus remainder days.
///
/// Invariant: `remainder_days < 30`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeDecomposition {
    /// Complete 30-day months.
    pub whole_months: u32,
    /// Days left over after the whole months, in `0..30`.
    pub remainder_days: u32,
}

impl TimeDecomposition {
    /// Total days represented (`whole_months * 30 + remainder_days`).
    pub fn total_days(&self) -> u32 {
        self.whole_months * 30 + self.remainder_days
    }
}
