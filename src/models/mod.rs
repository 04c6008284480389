//! Core data models for the benefits and tax engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod employment;
mod journal;
mod period;

pub use calculation_result::{AuditStep, AuditTrace, AuditWarning, Audited, CalculationResult};
pub use employment::{
    AgrarianModality, Benefit, EmploymentInterval, HealthInsurance, LaborRegime, RegimeFactor,
};
pub use journal::{JournalLine, JournalTemplate, TemplateEntry};
pub use period::{EffectiveInterval, PeriodWindow, TimeDecomposition, WindowScheme};
