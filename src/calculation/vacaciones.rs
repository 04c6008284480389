//! Vacaciones truncas (D.Leg. 713).
//!
//! A worker who ceases before completing the vacation year is owed one
//! twelfth of the computable remuneration for each month of service since
//! the last vacation enjoyed, and one thirtieth of that per extra day.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Audited, Benefit, EffectiveInterval, EmploymentInterval, LaborRegime};

use super::checked::CheckedAmount;
use super::remuneration::{family_allowance, regime_note, require_positive};
use super::{compute_proration, decompose, round_currency};

/// Input to [`calculate_vacaciones`].
#[derive(Debug, Clone, Deserialize)]
pub struct VacacionesInput {
    /// Monthly salary.
    pub salary: Decimal,
    /// Whether the worker receives asignación familiar.
    #[serde(default)]
    pub family_allowance: bool,
    /// First day of employment.
    pub start_date: NaiveDate,
    /// Cessation date.
    pub end_date: NaiveDate,
    /// Last day of the most recent vacation enjoyed, if any.
    #[serde(default)]
    pub last_vacation_end: Option<NaiveDate>,
    /// Labour regime.
    #[serde(default)]
    pub regime: LaborRegime,
}

/// Result of a vacaciones truncas calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacacionesResult {
    /// Computable period.
    pub effective_period: String,
    /// Remuneración computable.
    pub computable_base: Decimal,
    /// Days counted, inclusive.
    pub computable_days: u32,
    /// Complete 30-day months.
    pub whole_months: u32,
    /// Remaining days.
    pub remainder_days: u32,
    /// Vacaciones truncas amount.
    pub amount: Decimal,
    /// Informational note when vacation pay is not separately payable.
    pub message: Option<String>,
}

/// Calculates vacaciones truncas up to the cessation date.
///
/// Computation starts the day after the last vacation enjoyed, or on the
/// start date if that is later. A computation start after the cessation
/// date is rejected with `InvalidInterval`.
pub fn calculate_vacaciones(
    input: &VacacionesInput,
    config: &ConfigLoader,
) -> EngineResult<Audited<VacacionesResult>> {
    require_positive("salary", input.salary)?;
    EmploymentInterval::new(input.start_date, input.end_date)?;
    let factor = config.regime_factor(input.regime, Benefit::Vacaciones)?;

    let computation_start = match input.last_vacation_end {
        Some(vacation_end) => {
            let day_after = vacation_end
                .succ_opt()
                .ok_or_else(|| EngineError::invalid_input("last_vacation_end", "out of range"))?;
            day_after.max(input.start_date)
        }
        None => input.start_date,
    };
    let interval = EmploymentInterval::new(computation_start, input.end_date)?;
    let effective = EffectiveInterval::Span {
        start: interval.start(),
        end: interval.end(),
    };
    let decomposition = decompose(&effective);

    let allowance = family_allowance(config, input.family_allowance, input.end_date)?;
    let base = input.salary.try_add(allowance)?;
    let raw = compute_proration(base, decomposition, factor)?;
    let amount = round_currency(raw);

    let mut audited = Audited::new(
        (),
        vec![
            AuditStep {
                step_number: 1,
                rule_id: "vacaciones_computation_start".to_string(),
                rule_name: "Vacation Record Start".to_string(),
                clause_ref: "D.Leg. 713, Art. 22".to_string(),
                input: serde_json::json!({
                    "start_date": input.start_date.to_string(),
                    "last_vacation_end": input.last_vacation_end.map(|d| d.to_string()),
                }),
                output: serde_json::json!({
                    "computation_start": computation_start.to_string(),
                    "computable_days": effective.days(),
                }),
                reasoning: format!(
                    "Computable record {} ({} days)",
                    effective.label(),
                    effective.days()
                ),
            },
            AuditStep {
                step_number: 2,
                rule_id: "vacaciones_amount".to_string(),
                rule_name: "Vacaciones Truncas Amount".to_string(),
                clause_ref: "D.Leg. 713, Art. 22".to_string(),
                input: serde_json::json!({
                    "computable_base": base.normalize().to_string(),
                    "whole_months": decomposition.whole_months,
                    "remainder_days": decomposition.remainder_days,
                    "factor": factor.multiplier().normalize().to_string(),
                }),
                output: serde_json::json!({
                    "amount": amount.to_string(),
                }),
                reasoning: format!(
                    "(S/ {} / 12 × {} + S/ {} / 360 × {}) × {} = S/ {}",
                    base.normalize(),
                    decomposition.whole_months,
                    base.normalize(),
                    decomposition.remainder_days,
                    factor.multiplier().normalize(),
                    amount
                ),
            },
        ],
    );

    let message = regime_note(&mut audited, config, input.regime, Benefit::Vacaciones, factor);

    Ok(audited.map(|_| VacacionesResult {
        effective_period: effective.label(),
        computable_base: round_currency(base),
        computable_days: effective.days(),
        whole_months: decomposition.whole_months,
        remainder_days: decomposition.remainder_days,
        amount,
        message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn input(salary: &str, start: NaiveDate, end: NaiveDate) -> VacacionesInput {
        VacacionesInput {
            salary: dec(salary),
            family_allowance: false,
            start_date: start,
            end_date: end,
            last_vacation_end: None,
            regime: LaborRegime::General,
        }
    }

    #[test]
    fn test_record_from_start_date() {
        let config = load_config();
        // Jan 1 - Mar 15 = 74 days = 2 months 14 days
        let result =
            calculate_vacaciones(&input("1800", date(2025, 1, 1), date(2025, 3, 15)), &config)
                .unwrap();

        assert_eq!(result.value.computable_days, 74);
        assert_eq!(result.value.whole_months, 2);
        assert_eq!(result.value.remainder_days, 14);
        assert_eq!(result.value.amount, dec("370.00"));
    }

    #[test]
    fn test_record_restarts_after_last_vacation() {
        let config = load_config();
        let mut vac = input("3600", date(2020, 1, 1), date(2025, 6, 30));
        vac.last_vacation_end = Some(date(2025, 2, 28));

        let result = calculate_vacaciones(&vac, &config).unwrap();

        // Mar 1 - Jun 30 = 122 days = 4 months 2 days
        assert_eq!(result.value.effective_period, "01/03/2025 - 30/06/2025");
        assert_eq!(result.value.whole_months, 4);
        assert_eq!(result.value.remainder_days, 2);
        // 300 × 4 + 10 × 2
        assert_eq!(result.value.amount, dec("1220.00"));
    }

    #[test]
    fn test_vacation_before_start_date_uses_start() {
        let config = load_config();
        let mut vac = input("1800", date(2025, 1, 1), date(2025, 3, 15));
        vac.last_vacation_end = Some(date(2024, 6, 1));

        let result = calculate_vacaciones(&vac, &config).unwrap();
        assert_eq!(result.value.computable_days, 74);
    }

    #[test]
    fn test_vacation_ending_on_cessation_is_rejected() {
        let config = load_config();
        let mut vac = input("1800", date(2024, 1, 1), date(2025, 3, 15));
        vac.last_vacation_end = Some(date(2025, 3, 15));

        let result = calculate_vacaciones(&vac, &config);
        match result {
            Err(EngineError::InvalidInterval { start, end }) => {
                assert_eq!(start, date(2025, 3, 16));
                assert_eq!(end, date(2025, 3, 15));
            }
            _ => panic!("Expected InvalidInterval error"),
        }
    }

    #[test]
    fn test_mype_half_and_agrario_zero() {
        let config = load_config();

        let mut mype = input("1800", date(2025, 1, 1), date(2025, 3, 15));
        mype.regime = LaborRegime::MypePequena;
        assert_eq!(
            calculate_vacaciones(&mype, &config).unwrap().value.amount,
            dec("185.00")
        );

        let mut agrario = input("1800", date(2025, 1, 1), date(2025, 3, 15));
        agrario.regime = LaborRegime::Agrario;
        let result = calculate_vacaciones(&agrario, &config).unwrap();
        assert_eq!(result.value.amount, dec("0.00"));
        assert!(result.value.message.unwrap().contains("vacaciones"));
    }

    #[test]
    fn test_family_allowance_uses_rate_at_cessation() {
        let config = load_config();
        let mut vac = input("1025", date(2022, 1, 1), date(2022, 12, 30));
        vac.family_allowance = true;

        let result = calculate_vacaciones(&vac, &config).unwrap();
        assert_eq!(result.value.computable_base, dec("1127.50"));
    }

    #[test]
    fn test_long_record_on_huge_salary_is_calculation_error() {
        let config = load_config();
        let mut vac = input("1", date(2020, 1, 1), date(2025, 6, 30));
        vac.salary = Decimal::MAX;

        let result = calculate_vacaciones(&vac, &config);
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }
}
