//! Liquidación de beneficios sociales.
//!
//! On cessation the employer owes the truncated gratificación, the truncated
//! CTS for the current deposit window, and the truncated vacation record
//! since the last employment anniversary.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AgrarianModality, AuditStep, Audited, Benefit, EmploymentInterval, HealthInsurance,
    LaborRegime, RegimeFactor, WindowScheme,
};

use super::checked::{CheckedAmount, try_sum};
use super::gratificacion::{gratificacion_factor, gross_gratificacion};
use super::remuneration::{family_allowance, require_non_negative, require_positive};
use super::{compute_proration, decompose, decompose_days, intersect, resolve_window, round_currency};

/// Input to [`calculate_liquidacion`].
#[derive(Debug, Clone, Deserialize)]
pub struct LiquidacionInput {
    /// Monthly salary.
    pub salary: Decimal,
    /// Whether the worker receives asignación familiar.
    #[serde(default)]
    pub family_allowance: bool,
    /// Average of regular variable pay.
    #[serde(default)]
    pub average_variable_pay: Decimal,
    /// First day of employment.
    pub start_date: NaiveDate,
    /// Cessation date.
    pub end_date: NaiveDate,
    /// Labour regime.
    #[serde(default)]
    pub regime: LaborRegime,
    /// Health insurer, which sets the gratificación bonus rate.
    #[serde(default)]
    pub health_insurance: HealthInsurance,
}

/// One benefit in the settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquidacionLine {
    /// The benefit settled.
    pub benefit: Benefit,
    /// Display concept.
    pub concept: String,
    /// Amount owed.
    pub amount: Decimal,
    /// How the amount was reached.
    pub detail: String,
}

/// Result of a liquidación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquidacionResult {
    /// Remuneración computable (salary + allowance + variable pay).
    pub computable_base: Decimal,
    /// Gratificación, CTS and vacation lines, in that order.
    pub lines: Vec<LiquidacionLine>,
    /// Sum of the lines.
    pub total: Decimal,
}

/// Computes the full settlement on cessation.
///
/// # Example
///
/// ```no_run
/// use beneficios_engine::calculation::{LiquidacionInput, calculate_liquidacion};
/// use beneficios_engine::config::ConfigLoader;
/// use beneficios_engine::models::{HealthInsurance, LaborRegime};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::load("./config/peru").unwrap();
/// let input = LiquidacionInput {
///     salary: Decimal::from(3000),
///     family_allowance: false,
///     average_variable_pay: Decimal::ZERO,
///     start_date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
///     regime: LaborRegime::General,
///     health_insurance: HealthInsurance::Essalud,
/// };
///
/// let result = calculate_liquidacion(&input, &config).unwrap();
/// assert_eq!(result.value.lines.len(), 3);
/// ```
pub fn calculate_liquidacion(
    input: &LiquidacionInput,
    config: &ConfigLoader,
) -> EngineResult<Audited<LiquidacionResult>> {
    require_positive("salary", input.salary)?;
    require_non_negative("average_variable_pay", input.average_variable_pay)?;
    let interval = EmploymentInterval::new(input.start_date, input.end_date)?;

    let allowance = family_allowance(config, input.family_allowance, input.end_date)?;
    let base = try_sum([input.salary, allowance, input.average_variable_pay])?;

    let mut audited = Audited::new(
        (),
        vec![AuditStep {
            step_number: 1,
            rule_id: "liquidacion_computable_base".to_string(),
            rule_name: "Settlement Computable Remuneration".to_string(),
            clause_ref: "D.S. 001-97-TR, Art. 9".to_string(),
            input: serde_json::json!({
                "salary": input.salary.normalize().to_string(),
                "family_allowance": allowance.normalize().to_string(),
                "average_variable_pay": input.average_variable_pay.normalize().to_string(),
            }),
            output: serde_json::json!({
                "computable_base": base.normalize().to_string(),
            }),
            reasoning: format!(
                "S/ {} + S/ {} + S/ {} = S/ {}",
                input.salary.normalize(),
                allowance.normalize(),
                input.average_variable_pay.normalize(),
                base.normalize()
            ),
        }],
    );

    // Agrarian settlements follow the included modality.
    let grati_factor = gratificacion_factor(config, input.regime, AgrarianModality::Incluida)?;
    let (grati_line, grati_gross) =
        gratificacion_line(&mut audited, config, input, &interval, base, grati_factor)?;
    let cts_line = cts_line(&mut audited, config, input, &interval, base, grati_gross)?;
    let vacation_line = vacation_line(&mut audited, config, input, base)?;

    let lines = vec![grati_line, cts_line, vacation_line];
    let total = try_sum(lines.iter().map(|l| l.amount))?;

    Ok(audited.map(|_| LiquidacionResult {
        computable_base: round_currency(base),
        lines,
        total,
    }))
}

fn not_applicable_detail(config: &ConfigLoader, regime: LaborRegime, benefit: Benefit) -> String {
    if let Some(note) = config.regime_note(regime, benefit) {
        return note.to_string();
    }
    match config.regime(regime) {
        Ok(r) => format!("No corresponde para {}.", r.name),
        Err(_) => "No corresponde.".to_string(),
    }
}

fn gratificacion_line(
    audited: &mut Audited<()>,
    config: &ConfigLoader,
    input: &LiquidacionInput,
    interval: &EmploymentInterval,
    base: Decimal,
    factor: RegimeFactor,
) -> EngineResult<(LiquidacionLine, Decimal)> {
    let window = resolve_window(input.end_date, WindowScheme::SemiannualCalendar);
    let gross = gross_gratificacion(base, interval, factor);
    let bonus_rate = config.gratificacion_bonus_rate(input.health_insurance);
    let amount = round_currency(gross.amount.try_add(gross.amount.try_mul(bonus_rate)?)?);

    let detail = if factor == RegimeFactor::None {
        not_applicable_detail(config, input.regime, Benefit::Gratificacion)
    } else {
        format!(
            "Por {}m en {} (incluye bonificación extraordinaria)",
            gross.full_months, window.label
        )
    };

    audited.steps.push(AuditStep {
        step_number: audited.next_step(),
        rule_id: "liquidacion_gratificacion".to_string(),
        rule_name: "Truncated Gratificación".to_string(),
        clause_ref: "Ley 27735, Art. 7; Ley 30334".to_string(),
        input: serde_json::json!({
            "window": window.label,
            "full_months": gross.full_months,
            "factor": factor.multiplier().normalize().to_string(),
            "bonus_rate": bonus_rate.normalize().to_string(),
        }),
        output: serde_json::json!({
            "gross_amount": gross.amount.normalize().to_string(),
            "amount": amount.to_string(),
        }),
        reasoning: detail.clone(),
    });

    Ok((
        LiquidacionLine {
            benefit: Benefit::Gratificacion,
            concept: "Gratificación trunca".to_string(),
            amount,
            detail,
        },
        gross.amount,
    ))
}

fn cts_line(
    audited: &mut Audited<()>,
    config: &ConfigLoader,
    input: &LiquidacionInput,
    interval: &EmploymentInterval,
    base: Decimal,
    grati_gross: Decimal,
) -> EngineResult<LiquidacionLine> {
    let factor = config.regime_factor(input.regime, Benefit::Cts)?;
    let cts_base = base.try_add(grati_gross / Decimal::from(6))?;
    let window = resolve_window(input.end_date, WindowScheme::SemiannualOffset);
    let effective = intersect(interval, &window);
    let decomposition = decompose(&effective);
    let amount = round_currency(compute_proration(cts_base, decomposition, factor)?);

    let detail = if factor == RegimeFactor::None {
        not_applicable_detail(config, input.regime, Benefit::Cts)
    } else {
        format!(
            "Por {}m y {}d (Per. {})",
            decomposition.whole_months, decomposition.remainder_days, window.label
        )
    };

    audited.steps.push(AuditStep {
        step_number: audited.next_step(),
        rule_id: "liquidacion_cts".to_string(),
        rule_name: "Truncated CTS".to_string(),
        clause_ref: "D.S. 001-97-TR, Art. 3".to_string(),
        input: serde_json::json!({
            "computable_base": cts_base.normalize().to_string(),
            "effective": effective,
            "factor": factor.multiplier().normalize().to_string(),
        }),
        output: serde_json::json!({
            "whole_months": decomposition.whole_months,
            "remainder_days": decomposition.remainder_days,
            "amount": amount.to_string(),
        }),
        reasoning: detail.clone(),
    });

    Ok(LiquidacionLine {
        benefit: Benefit::Cts,
        concept: "CTS trunca".to_string(),
        amount,
        detail,
    })
}

fn vacation_line(
    audited: &mut Audited<()>,
    config: &ConfigLoader,
    input: &LiquidacionInput,
    base: Decimal,
) -> EngineResult<LiquidacionLine> {
    let factor = config.regime_factor(input.regime, Benefit::Vacaciones)?;

    let service_days = u32::try_from((input.end_date - input.start_date).num_days()).unwrap_or(0);
    let (years, anniversary) = last_anniversary(input.start_date, input.end_date)?;
    let truncated_days = u32::try_from((input.end_date - anniversary).num_days()).unwrap_or(0);
    let decomposition = decompose_days(truncated_days);
    let amount = round_currency(compute_proration(base, decomposition, factor)?);

    let detail = if factor == RegimeFactor::None {
        not_applicable_detail(config, input.regime, Benefit::Vacaciones)
    } else if truncated_days == 0 {
        "Sin récord trunco.".to_string()
    } else {
        format!(
            "Por {}m y {}d de récord trunco.",
            decomposition.whole_months, decomposition.remainder_days
        )
    };

    audited.steps.push(AuditStep {
        step_number: audited.next_step(),
        rule_id: "liquidacion_vacaciones".to_string(),
        rule_name: "Truncated Vacation Record".to_string(),
        clause_ref: "D.Leg. 713, Art. 22".to_string(),
        input: serde_json::json!({
            "service_days": service_days,
            "complete_years": years,
            "last_anniversary": anniversary.to_string(),
            "factor": factor.multiplier().normalize().to_string(),
        }),
        output: serde_json::json!({
            "truncated_days": truncated_days,
            "whole_months": decomposition.whole_months,
            "remainder_days": decomposition.remainder_days,
            "amount": amount.to_string(),
        }),
        reasoning: detail.clone(),
    });

    Ok(LiquidacionLine {
        benefit: Benefit::Vacaciones,
        concept: "Vacaciones truncas".to_string(),
        amount,
        detail,
    })
}

/// Latest calendar anniversary of `start` on or before `end`, with the
/// number of complete years it closes. `start` itself counts as year zero.
fn last_anniversary(start: NaiveDate, end: NaiveDate) -> EngineResult<(u32, NaiveDate)> {
    let mut years = u32::try_from(end.year() - start.year()).unwrap_or(0);
    loop {
        let anniversary = start
            .checked_add_months(Months::new(years * 12))
            .ok_or_else(|| EngineError::invalid_input("start_date", "out of range"))?;
        if anniversary <= end || years == 0 {
            return Ok((years, anniversary));
        }
        years -= 1;
    }
}
