//! Calendar window resolution.
//!
//! Peruvian labour law accrues benefits over fixed semesters. Gratificaciones
//! follow the calendar halves (Ley 27735) while CTS deposits follow the
//! May–October / November–April halves (D.S. 001-97-TR, Art. 21).

use chrono::{Datelike, NaiveDate};

use crate::models::{PeriodWindow, WindowScheme};

// Bounds past the representable calendar clamp to `fallback`, so a window
// around `NaiveDate::MIN` or `NaiveDate::MAX` still contains its reference.
fn ymd(year: i32, month: u32, day: u32, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(fallback)
}

/// Resolves the semester window enclosing `reference` under `scheme`.
///
/// The window bounds are always the full half, regardless of where the
/// reference date falls inside it. Every date maps to exactly one window.
///
/// # Example
///
/// ```
/// use beneficios_engine::calculation::resolve_window;
/// use beneficios_engine::models::WindowScheme;
/// use chrono::NaiveDate;
///
/// let reference = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
///
/// let grati = resolve_window(reference, WindowScheme::SemiannualCalendar);
/// assert_eq!(grati.label, "Ene-Jun 2025");
///
/// let cts = resolve_window(reference, WindowScheme::SemiannualOffset);
/// assert_eq!(cts.start, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
/// assert_eq!(cts.end, NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
/// assert_eq!(cts.label, "Nov. 2024 - Abr. 2025");
/// ```
pub fn resolve_window(reference: NaiveDate, scheme: WindowScheme) -> PeriodWindow {
    let year = reference.year();
    let month = reference.month();

    match scheme {
        WindowScheme::SemiannualCalendar => {
            if month <= 6 {
                PeriodWindow {
                    start: ymd(year, 1, 1, NaiveDate::MIN),
                    end: ymd(year, 6, 30, NaiveDate::MAX),
                    label: format!("Ene-Jun {}", year),
                }
            } else {
                PeriodWindow {
                    start: ymd(year, 7, 1, NaiveDate::MIN),
                    end: ymd(year, 12, 31, NaiveDate::MAX),
                    label: format!("Jul-Dic {}", year),
                }
            }
        }
        WindowScheme::SemiannualOffset => {
            if (5..=10).contains(&month) {
                PeriodWindow {
                    start: ymd(year, 5, 1, NaiveDate::MIN),
                    end: ymd(year, 10, 31, NaiveDate::MAX),
                    label: format!("Mayo {} - Oct. {}", year, year),
                }
            } else {
                // November and December open the window; January to April close it.
                let start_year = if month >= 11 { year } else { year - 1 };
                PeriodWindow {
                    start: ymd(start_year, 11, 1, NaiveDate::MIN),
                    end: ymd(start_year + 1, 4, 30, NaiveDate::MAX),
                    label: format!("Nov. {} - Abr. {}", start_year, start_year + 1),
                }
            }
        }
    }
}

/// Returns true if `window` is the May–October CTS window, whose deposit
/// falls in November and includes the July gratificación in its base.
pub fn is_november_deposit(window: &PeriodWindow) -> bool {
    window.start.month() == 5
}
