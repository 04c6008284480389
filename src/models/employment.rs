//! Employment interval and labour-regime types.
//!
//! This module defines the worker-side inputs to the benefit calculators:
//! the employment interval, the labour regime the employer is registered
//! under, and the factor each regime applies to each benefit.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A closed employment interval `[start, end]`.
///
/// The constructor enforces `start <= end`, so every value of this type is a
/// valid interval.
///
/// # Example
///
/// ```
/// use beneficios_engine::models::EmploymentInterval;
/// use chrono::NaiveDate;
///
/// let interval = EmploymentInterval::new(
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
/// ).unwrap();
/// assert_eq!(interval.start(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
///
/// let reversed = EmploymentInterval::new(
///     NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
/// );
/// assert!(reversed.is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmploymentInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl EmploymentInterval {
    /// Creates an interval, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if start > end {
            return Err(EngineError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day of employment (inclusive).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of employment or cut-off date (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Labour regime under which the employer operates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaborRegime {
    /// Régimen laboral general (D.Leg. 728).
    #[default]
    General,
    /// Trabajadores del hogar (Ley 31047).
    Hogar,
    /// Pequeña empresa under the MYPE law.
    MypePequena,
    /// Microempresa under the MYPE law.
    Micro,
    /// Régimen agrario (Ley 31110).
    Agrario,
}

impl LaborRegime {
    /// Returns the wire code of the regime.
    pub fn as_str(&self) -> &'static str {
        match self {
            LaborRegime::General => "general",
            LaborRegime::Hogar => "hogar",
            LaborRegime::MypePequena => "mype_pequena",
            LaborRegime::Micro => "micro",
            LaborRegime::Agrario => "agrario",
        }
    }
}

impl std::fmt::Display for LaborRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Statutory benefits whose amount depends on the labour regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Benefit {
    /// Compensación por tiempo de servicios.
    Cts,
    /// Gratificación legal (July / December).
    Gratificacion,
    /// Vacaciones (truncas on cessation).
    Vacaciones,
}

/// Multiplier applied to a proportional benefit amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeFactor {
    /// Full benefit (1).
    Full,
    /// Half benefit (0.5).
    Half,
    /// Benefit does not apply (0).
    None,
}

impl RegimeFactor {
    /// Returns the numeric multiplier.
    ///
    /// ```
    /// use beneficios_engine::models::RegimeFactor;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(RegimeFactor::Half.multiplier(), Decimal::new(5, 1));
    /// ```
    pub fn multiplier(&self) -> Decimal {
        match self {
            RegimeFactor::Full => Decimal::ONE,
            RegimeFactor::Half => Decimal::new(5, 1),
            RegimeFactor::None => Decimal::ZERO,
        }
    }
}

/// Health insurance provider, which sets the gratificación bonus rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthInsurance {
    /// EsSalud (9% extraordinary bonus).
    #[default]
    Essalud,
    /// Entidad prestadora de salud (6.75% extraordinary bonus).
    Eps,
}

/// How gratificaciones are paid to agrarian workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgrarianModality {
    /// Included in the daily wage; nothing further is owed.
    #[default]
    Incluida,
    /// Paid separately under general-regime rules.
    General,
}
