//! Shared input checks and remuneration components for benefit calculators.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditWarning, Audited, Benefit, LaborRegime, RegimeFactor};

pub(crate) fn require_positive(field: &str, value: Decimal) -> EngineResult<()> {
    if value <= Decimal::ZERO {
        return Err(EngineError::invalid_input(field, "must be greater than zero"));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_input(field, "must not be negative"));
    }
    Ok(())
}

/// Returns the asignación familiar in force on `date`, or zero when the
/// worker is not entitled to it.
pub(crate) fn family_allowance(
    config: &ConfigLoader,
    entitled: bool,
    date: NaiveDate,
) -> EngineResult<Decimal> {
    if !entitled {
        return Ok(Decimal::ZERO);
    }
    Ok(config.rates_for(date)?.family_allowance)
}

/// Adds the regime's note as a warning when a benefit is not separately
/// payable, and returns the note for the result body.
pub(crate) fn regime_note<T>(
    audited: &mut Audited<T>,
    config: &ConfigLoader,
    regime: LaborRegime,
    benefit: Benefit,
    factor: RegimeFactor,
) -> Option<String> {
    if factor != RegimeFactor::None {
        return None;
    }

    let note = config.regime_note(regime, benefit).map(str::to_string);
    let message = note
        .clone()
        .unwrap_or_else(|| format!("No corresponde para el régimen {}.", regime));
    audited
        .warnings
        .push(AuditWarning::info("BENEFIT_NOT_APPLICABLE", message));
    note
}
