//! Compensación por Tiempo de Servicios (CTS).
//!
//! CTS accrues over the May–October and November–April halves and is
//! deposited in November and May respectively (D.S. 001-97-TR). The
//! computable remuneration includes the asignación familiar and the average
//! of regular overtime; the November deposit also includes one sixth of the
//! July gratificación.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::models::{AuditStep, Audited, Benefit, EmploymentInterval, LaborRegime, WindowScheme};

use super::checked::try_sum;
use super::remuneration::{family_allowance, regime_note, require_non_negative, require_positive};
use super::{ProrationInput, calculate_proration, is_november_deposit, resolve_window, round_currency};

/// Input to [`calculate_cts`].
#[derive(Debug, Clone, Deserialize)]
pub struct CtsInput {
    /// Monthly salary.
    pub salary: Decimal,
    /// Whether the worker receives asignación familiar.
    #[serde(default)]
    pub family_allowance: bool,
    /// Average monthly overtime pay over the semester.
    #[serde(default)]
    pub average_overtime: Decimal,
    /// The July gratificación; only used for the May–October window.
    #[serde(default)]
    pub previous_gratificacion: Decimal,
    /// First day of employment.
    pub start_date: NaiveDate,
    /// Cessation or cut-off date.
    pub end_date: NaiveDate,
    /// Labour regime.
    #[serde(default)]
    pub regime: LaborRegime,
}

/// Result of a CTS calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CtsResult {
    /// CTS window label (e.g. "Nov. 2024 - Abr. 2025").
    pub period_label: String,
    /// Computable period inside the window.
    pub effective_period: String,
    /// Month the deposit is due ("Mayo" or "Noviembre").
    pub deposit_month: String,
    /// Remuneración computable.
    pub computable_base: Decimal,
    /// Complete 30-day months.
    pub whole_months: u32,
    /// Remaining days.
    pub remainder_days: u32,
    /// CTS amount.
    pub amount: Decimal,
    /// Informational note when CTS is not separately payable.
    pub message: Option<String>,
}

/// Calculates the CTS for the window containing the end date.
///
/// Returns `InvalidInterval` if the start date is after the end date and
/// `InvalidInput` if the salary is not positive.
///
/// # Example
///
/// ```no_run
/// use beneficios_engine::calculation::{CtsInput, calculate_cts};
/// use beneficios_engine::config::ConfigLoader;
/// use beneficios_engine::models::LaborRegime;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::load("./config/peru").unwrap();
/// let input = CtsInput {
///     salary: Decimal::from(2400),
///     family_allowance: false,
///     average_overtime: Decimal::ZERO,
///     previous_gratificacion: Decimal::ZERO,
///     start_date: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
///     regime: LaborRegime::General,
/// };
///
/// let result = calculate_cts(&input, &config).unwrap();
/// // 181 days = 6 months 1 day: 200 × 6 + 200 / 30 = 1206.67
/// assert_eq!(result.value.amount, Decimal::new(120667, 2));
/// ```
pub fn calculate_cts(input: &CtsInput, config: &ConfigLoader) -> EngineResult<Audited<CtsResult>> {
    require_positive("salary", input.salary)?;
    require_non_negative("average_overtime", input.average_overtime)?;
    require_non_negative("previous_gratificacion", input.previous_gratificacion)?;
    let interval = EmploymentInterval::new(input.start_date, input.end_date)?;
    let factor = config.regime_factor(input.regime, Benefit::Cts)?;

    let window = resolve_window(input.end_date, WindowScheme::SemiannualOffset);
    let november = is_november_deposit(&window);
    let allowance = family_allowance(config, input.family_allowance, input.end_date)?;
    let gratificacion_sixth = if november {
        input.previous_gratificacion / Decimal::from(6)
    } else {
        Decimal::ZERO
    };
    let base = try_sum([input.salary, allowance, input.average_overtime, gratificacion_sixth])?;

    let mut audited = Audited::new(
        (),
        vec![AuditStep {
            step_number: 1,
            rule_id: "cts_computable_base".to_string(),
            rule_name: "CTS Computable Remuneration".to_string(),
            clause_ref: "D.S. 001-97-TR, Art. 9, 16, 19".to_string(),
            input: serde_json::json!({
                "salary": input.salary.normalize().to_string(),
                "family_allowance": allowance.normalize().to_string(),
                "average_overtime": input.average_overtime.normalize().to_string(),
                "previous_gratificacion": input.previous_gratificacion.normalize().to_string(),
                "november_deposit": november,
            }),
            output: serde_json::json!({
                "computable_base": base.normalize().to_string(),
            }),
            reasoning: if november {
                format!(
                    "S/ {} + S/ {} + S/ {} + S/ {} / 6 = S/ {}",
                    input.salary.normalize(),
                    allowance.normalize(),
                    input.average_overtime.normalize(),
                    input.previous_gratificacion.normalize(),
                    base.normalize()
                )
            } else {
                format!(
                    "S/ {} + S/ {} + S/ {} = S/ {} (May deposit excludes gratificación)",
                    input.salary.normalize(),
                    allowance.normalize(),
                    input.average_overtime.normalize(),
                    base.normalize()
                )
            },
        }],
    );

    let proration = audited.absorb(calculate_proration(&ProrationInput {
        base,
        interval,
        reference: input.end_date,
        scheme: WindowScheme::SemiannualOffset,
        factor,
    })?);

    let message = regime_note(&mut audited, config, input.regime, Benefit::Cts, factor);

    Ok(audited.map(|_| CtsResult {
        period_label: proration.period_label,
        effective_period: proration.effective_period,
        deposit_month: if november { "Noviembre" } else { "Mayo" }.to_string(),
        computable_base: round_currency(base),
        whole_months: proration.whole_months,
        remainder_days: proration.remainder_days,
        amount: proration.amount,
        message,
    }))
}
