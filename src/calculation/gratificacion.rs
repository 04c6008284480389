//! Gratificaciones legales (Ley 27735) and the extraordinary bonus
//! (Ley 30334).
//!
//! The July gratificación covers January–June and the December one covers
//! July–December. One sixth of the computable remuneration accrues per
//! complete calendar month worked. The employer's health contribution it
//! would otherwise owe on the gratificación is paid to the worker as an
//! extraordinary bonus.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::models::{
    AgrarianModality, AuditStep, Audited, Benefit, EmploymentInterval, HealthInsurance,
    LaborRegime, RegimeFactor, WindowScheme,
};

use super::checked::CheckedAmount;
use super::remuneration::{family_allowance, regime_note, require_positive};
use super::{count_full_months, intersect, resolve_window, round_currency};

/// Input to [`calculate_gratificacion`].
#[derive(Debug, Clone, Deserialize)]
pub struct GratificacionInput {
    /// Monthly salary.
    pub salary: Decimal,
    /// Whether the worker receives asignación familiar.
    #[serde(default)]
    pub family_allowance: bool,
    /// Health insurer, which sets the bonus rate.
    #[serde(default)]
    pub health_insurance: HealthInsurance,
    /// First day of employment.
    pub start_date: NaiveDate,
    /// Cessation or cut-off date.
    pub end_date: NaiveDate,
    /// Labour regime.
    #[serde(default)]
    pub regime: LaborRegime,
    /// How an agrarian worker's gratificación is paid.
    #[serde(default)]
    pub agrarian_modality: AgrarianModality,
}

/// Result of a gratificación calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GratificacionResult {
    /// Semester label (e.g. "Jul-Dic 2025").
    pub period_label: String,
    /// Computable period inside the semester.
    pub effective_period: String,
    /// Remuneración computable.
    pub computable_base: Decimal,
    /// Complete calendar months worked.
    pub full_months: u32,
    /// Days outside complete months; reported but not paid.
    pub leftover_days: u32,
    /// Gratificación before the bonus.
    pub gross_amount: Decimal,
    /// Bonus rate applied.
    pub bonus_rate: Decimal,
    /// Extraordinary bonus.
    pub bonus_amount: Decimal,
    /// Gratificación plus bonus.
    pub total: Decimal,
    /// Informational note when the gratificación is not separately payable.
    pub message: Option<String>,
}

/// Gross gratificación before the bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GrossGratificacion {
    pub full_months: u32,
    pub leftover_days: u32,
    pub amount: Decimal,
}

/// Resolves the factor for a gratificación. Agrarian workers paid under the
/// general modality receive the full gratificación.
pub(crate) fn gratificacion_factor(
    config: &ConfigLoader,
    regime: LaborRegime,
    modality: AgrarianModality,
) -> EngineResult<RegimeFactor> {
    if regime == LaborRegime::Agrario && modality == AgrarianModality::General {
        return Ok(RegimeFactor::Full);
    }
    config.regime_factor(regime, Benefit::Gratificacion)
}

/// `base / 6 × complete months × factor` over the semester containing the
/// end of `interval`.
pub(crate) fn gross_gratificacion(
    base: Decimal,
    interval: &EmploymentInterval,
    factor: RegimeFactor,
) -> GrossGratificacion {
    let window = resolve_window(interval.end(), WindowScheme::SemiannualCalendar);
    let full = count_full_months(&intersect(interval, &window));
    GrossGratificacion {
        full_months: full.months,
        leftover_days: full.leftover_days,
        amount: base / Decimal::from(6) * Decimal::from(full.months) * factor.multiplier(),
    }
}

/// Calculates the gratificación and extraordinary bonus for the semester
/// containing the end date.
///
/// # Example
///
/// ```no_run
/// use beneficios_engine::calculation::{GratificacionInput, calculate_gratificacion};
/// use beneficios_engine::config::ConfigLoader;
/// use beneficios_engine::models::{AgrarianModality, HealthInsurance, LaborRegime};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::load("./config/peru").unwrap();
/// let input = GratificacionInput {
///     salary: Decimal::from(3000),
///     family_allowance: false,
///     health_insurance: HealthInsurance::Essalud,
///     start_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
///     regime: LaborRegime::General,
///     agrarian_modality: AgrarianModality::Incluida,
/// };
///
/// let result = calculate_gratificacion(&input, &config).unwrap();
/// assert_eq!(result.value.total, Decimal::new(327000, 2));
/// ```
pub fn calculate_gratificacion(
    input: &GratificacionInput,
    config: &ConfigLoader,
) -> EngineResult<Audited<GratificacionResult>> {
    require_positive("salary", input.salary)?;
    let interval = EmploymentInterval::new(input.start_date, input.end_date)?;
    let factor = gratificacion_factor(config, input.regime, input.agrarian_modality)?;

    let allowance = family_allowance(config, input.family_allowance, input.end_date)?;
    let base = input.salary.try_add(allowance)?;

    let window = resolve_window(input.end_date, WindowScheme::SemiannualCalendar);
    let effective = intersect(&interval, &window);
    let gross = gross_gratificacion(base, &interval, factor);

    let bonus_rate = config.gratificacion_bonus_rate(input.health_insurance);
    let bonus = gross.amount.try_mul(bonus_rate)?;
    let total = gross.amount.try_add(bonus)?;

    let mut audited = Audited::new(
        (),
        vec![
            AuditStep {
                step_number: 1,
                rule_id: "gratificacion_computable_base".to_string(),
                rule_name: "Gratificación Computable Remuneration".to_string(),
                clause_ref: "Ley 27735, Art. 3".to_string(),
                input: serde_json::json!({
                    "salary": input.salary.normalize().to_string(),
                    "family_allowance": allowance.normalize().to_string(),
                }),
                output: serde_json::json!({
                    "computable_base": base.normalize().to_string(),
                }),
                reasoning: format!(
                    "S/ {} + S/ {} = S/ {}",
                    input.salary.normalize(),
                    allowance.normalize(),
                    base.normalize()
                ),
            },
            AuditStep {
                step_number: 2,
                rule_id: "gratificacion_full_months".to_string(),
                rule_name: "Complete Calendar Months".to_string(),
                clause_ref: "Ley 27735, Art. 7".to_string(),
                input: serde_json::json!({
                    "window": window.label,
                    "effective": effective,
                }),
                output: serde_json::json!({
                    "full_months": gross.full_months,
                    "leftover_days": gross.leftover_days,
                }),
                reasoning: format!(
                    "{} complete months in {}; {} days in partial months are not computable",
                    gross.full_months,
                    effective.label(),
                    gross.leftover_days
                ),
            },
            AuditStep {
                step_number: 3,
                rule_id: "gratificacion_amount".to_string(),
                rule_name: "Gratificación Amount".to_string(),
                clause_ref: "Ley 27735, Art. 5".to_string(),
                input: serde_json::json!({
                    "computable_base": base.normalize().to_string(),
                    "full_months": gross.full_months,
                    "regime": input.regime,
                    "factor": factor.multiplier().normalize().to_string(),
                }),
                output: serde_json::json!({
                    "gross_amount": gross.amount.normalize().to_string(),
                }),
                reasoning: format!(
                    "S/ {} / 6 × {} × {} = S/ {}",
                    base.normalize(),
                    gross.full_months,
                    factor.multiplier().normalize(),
                    round_currency(gross.amount)
                ),
            },
            AuditStep {
                step_number: 4,
                rule_id: "gratificacion_bonus".to_string(),
                rule_name: "Extraordinary Bonus".to_string(),
                clause_ref: "Ley 30334, Art. 3".to_string(),
                input: serde_json::json!({
                    "gross_amount": gross.amount.normalize().to_string(),
                    "health_insurance": input.health_insurance,
                    "bonus_rate": bonus_rate.normalize().to_string(),
                }),
                output: serde_json::json!({
                    "bonus_amount": bonus.normalize().to_string(),
                    "total": total.normalize().to_string(),
                }),
                reasoning: format!(
                    "S/ {} × {} = S/ {}; total S/ {}",
                    round_currency(gross.amount),
                    bonus_rate.normalize(),
                    round_currency(bonus),
                    round_currency(total)
                ),
            },
        ],
    );

    let message = regime_note(
        &mut audited,
        config,
        input.regime,
        Benefit::Gratificacion,
        factor,
    );

    Ok(audited.map(|_| GratificacionResult {
        period_label: window.label.clone(),
        effective_period: effective.label(),
        computable_base: round_currency(base),
        full_months: gross.full_months,
        leftover_days: gross.leftover_days,
        gross_amount: round_currency(gross.amount),
        bonus_rate,
        bonus_amount: round_currency(bonus),
        total: round_currency(total),
        message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn load_config() -> ConfigLoader {
        ConfigLoader::load("./config/peru").expect("Failed to load config")
    }

    fn input(salary: &str, start: NaiveDate, end: NaiveDate) -> GratificacionInput {
        GratificacionInput {
            salary: dec(salary),
            family_allowance: false,
            health_insurance: HealthInsurance::Essalud,
            start_date: start,
            end_date: end,
            regime: LaborRegime::General,
            agrarian_modality: AgrarianModality::Incluida,
        }
    }

    #[test]
    fn test_full_semester_with_essalud_bonus() {
        let config = load_config();
        let result =
            calculate_gratificacion(&input("3000", date(2020, 3, 1), date(2025, 12, 31)), &config)
                .unwrap();

        assert_eq!(result.value.period_label, "Jul-Dic 2025");
        assert_eq!(result.value.full_months, 6);
        assert_eq!(result.value.gross_amount, dec("3000.00"));
        assert_eq!(result.value.bonus_amount, dec("270.00"));
        assert_eq!(result.value.total, dec("3270.00"));
    }

    #[test]
    fn test_eps_bonus_rate() {
        let config = load_config();
        let mut grati = input("3000", date(2020, 3, 1), date(2025, 6, 30));
        grati.health_insurance = HealthInsurance::Eps;

        let result = calculate_gratificacion(&grati, &config).unwrap();
        assert_eq!(result.value.bonus_rate, dec("0.0675"));
        assert_eq!(result.value.bonus_amount, dec("202.50"));
        assert_eq!(result.value.total, dec("3202.50"));
    }

    #[test]
    fn test_partial_months_are_not_paid() {
        let config = load_config();
        // Started March 15, ceased May 20: only April is complete.
        let result =
            calculate_gratificacion(&input("1800", date(2025, 3, 15), date(2025, 5, 20)), &config)
                .unwrap();

        assert_eq!(result.value.full_months, 1);
        assert_eq!(result.value.leftover_days, 37);
        assert_eq!(result.value.gross_amount, dec("300.00"));
    }

    #[test]
    fn test_family_allowance_in_base() {
        let config = load_config();
        let mut grati = input("1130", date(2025, 1, 1), date(2025, 6, 30));
        grati.family_allowance = true;

        let result = calculate_gratificacion(&grati, &config).unwrap();
        assert_eq!(result.value.computable_base, dec("1243.00"));
        assert_eq!(result.value.gross_amount, dec("1243.00"));
    }

    #[test]
    fn test_hogar_and_mype_pay_half() {
        let config = load_config();
        for regime in [LaborRegime::Hogar, LaborRegime::MypePequena] {
            let mut grati = input("2000", date(2025, 1, 1), date(2025, 6, 30));
            grati.regime = regime;

            let result = calculate_gratificacion(&grati, &config).unwrap();
            assert_eq!(result.value.gross_amount, dec("1000.00"), "{}", regime);
        }
    }

    #[test]
    fn test_micro_pays_nothing() {
        let config = load_config();
        let mut grati = input("2000", date(2025, 1, 1), date(2025, 6, 30));
        grati.regime = LaborRegime::Micro;

        let result = calculate_gratificacion(&grati, &config).unwrap();
        assert_eq!(result.value.total, dec("0.00"));
        assert!(result.value.message.is_none());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_agrario_included_modality() {
        let config = load_config();
        let mut grati = input("2000", date(2025, 1, 1), date(2025, 6, 30));
        grati.regime = LaborRegime::Agrario;

        let result = calculate_gratificacion(&grati, &config).unwrap();
        assert_eq!(result.value.total, dec("0.00"));
        assert!(
            result
                .value
                .message
                .unwrap()
                .contains("incluida en la remuneración diaria")
        );
    }

    #[test]
    fn test_agrario_general_modality_pays_in_full() {
        let config = load_config();
        let mut grati = input("2000", date(2025, 1, 1), date(2025, 6, 30));
        grati.regime = LaborRegime::Agrario;
        grati.agrarian_modality = AgrarianModality::General;

        let result = calculate_gratificacion(&grati, &config).unwrap();
        assert_eq!(result.value.gross_amount, dec("2000.00"));
        assert!(result.value.message.is_none());
    }

    #[test]
    fn test_started_after_semester_end_is_zero() {
        let config = load_config();
        let result =
            calculate_gratificacion(&input("2000", date(2025, 6, 20), date(2025, 6, 30)), &config)
                .unwrap();
        assert_eq!(result.value.full_months, 0);
        assert_eq!(result.value.total, dec("0.00"));
    }

    #[test]
    fn test_reversed_dates_rejected() {
        let config = load_config();
        let result =
            calculate_gratificacion(&input("2000", date(2025, 6, 30), date(2025, 1, 1)), &config);
        assert!(matches!(result, Err(EngineError::InvalidInterval { .. })));
    }

    #[test]
    fn test_salary_beyond_decimal_range_is_calculation_error() {
        let config = load_config();
        let mut grati = input("1", date(2020, 3, 1), date(2025, 12, 31));
        grati.salary = Decimal::MAX;

        // Six complete months keep the full salary; the 9% bonus overflows.
        let result = calculate_gratificacion(&grati, &config);
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }
}
