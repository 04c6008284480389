//! Tax fines with the gradualidad discount (R. 063-2007/SUNAT).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigLoader, FineBasis};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Audited};

use super::checked::CheckedAmount;
use super::remuneration::require_non_negative;
use super::round_currency;

/// How the infraction was cured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CureType {
    /// Before any SUNAT notification.
    #[default]
    Voluntaria,
    /// After a SUNAT notification.
    Inducida,
}

/// Input to [`calculate_multa`].
#[derive(Debug, Clone, Deserialize)]
pub struct MultaInput {
    /// Infraction code, e.g. `176_1`.
    pub infraction: String,
    /// Year of the infraction, used to look up the UIT.
    pub year: i32,
    /// How the infraction was cured.
    #[serde(default)]
    pub cure: CureType,
    /// Omitted tax, for infractions based on it.
    #[serde(default)]
    pub omitted_tax: Decimal,
    /// Annual net income, for infractions based on it.
    #[serde(default)]
    pub net_income: Decimal,
}

/// Result of a fine calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultaResult {
    /// Infraction description.
    pub title: String,
    /// Código Tributario reference.
    pub clause: String,
    /// UIT used.
    pub uit: Decimal,
    /// How the base fine was reached.
    pub basis: String,
    /// Base fine.
    pub base_fine: Decimal,
    /// Gradualidad discount, as a fraction.
    pub discount_rate: Decimal,
    /// Discount amount.
    pub discount: Decimal,
    /// Fine payable.
    pub final_fine: Decimal,
}

/// Calculates the base fine for an infraction and applies the gradualidad
/// discount for the cure type.
pub fn calculate_multa(input: &MultaInput, config: &ConfigLoader) -> EngineResult<Audited<MultaResult>> {
    require_non_negative("omitted_tax", input.omitted_tax)?;
    require_non_negative("net_income", input.net_income)?;

    let infraction = config
        .tax()
        .infractions
        .get(&input.infraction)
        .ok_or_else(|| EngineError::UnknownInfraction {
            code: input.infraction.clone(),
        })?;
    let uit = config.uit_for_year(input.year)?;

    let (base_fine, basis) = match infraction.basis {
        FineBasis::NetIncome { rate } => (
            input.net_income.try_mul(rate)?,
            format!("{}% de S/ {}", percent(rate), round_currency(input.net_income)),
        ),
        FineBasis::OmittedTax { rate } => (
            input.omitted_tax.try_mul(rate)?,
            format!("{}% de S/ {}", percent(rate), round_currency(input.omitted_tax)),
        ),
        FineBasis::BoundedNetIncome {
            rate,
            threshold_uit,
            floor_uit,
            cap_uit,
        } => {
            if input.net_income > threshold_uit.try_mul(uit)? {
                let fine = input
                    .net_income
                    .try_mul(rate)?
                    .min(cap_uit.try_mul(uit)?)
                    .max(floor_uit.try_mul(uit)?);
                (
                    fine,
                    format!("{}% de S/ {}", percent(rate), round_currency(input.net_income)),
                )
            } else {
                (floor_uit.try_mul(uit)?, format!("{} UIT", floor_uit.normalize()))
            }
        }
    };

    let discount_rate = match input.cure {
        CureType::Voluntaria => infraction.graduality.voluntary,
        CureType::Inducida => infraction.graduality.induced,
    };
    let discount = base_fine.try_mul(discount_rate)?;
    let final_fine = round_currency(base_fine.try_sub(discount)?);

    let step = AuditStep {
        step_number: 1,
        rule_id: format!("multa_{}", input.infraction),
        rule_name: infraction.title.clone(),
        clause_ref: infraction.clause.clone(),
        input: serde_json::json!({
            "uit": uit.normalize().to_string(),
            "omitted_tax": input.omitted_tax.normalize().to_string(),
            "net_income": input.net_income.normalize().to_string(),
            "cure": input.cure,
        }),
        output: serde_json::json!({
            "base_fine": base_fine.normalize().to_string(),
            "discount": discount.normalize().to_string(),
            "final_fine": final_fine.to_string(),
        }),
        reasoning: format!(
            "{} = S/ {}; rebaja {}% → S/ {}",
            basis,
            round_currency(base_fine),
            percent(discount_rate),
            final_fine
        ),
    };

    Ok(Audited::new(
        MultaResult {
            title: infraction.title.clone(),
            clause: infraction.clause.clone(),
            uit,
            basis,
            base_fine: round_currency(base_fine),
            discount_rate,
            discount: round_currency(discount),
            final_fine,
        },
        vec![step],
    ))
}

fn percent(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn load_config() -> ConfigLoader {
        ConfigLoader::load("./config/peru").expect("Failed to load config")
    }

    fn input(code: &str, cure: CureType) -> MultaInput {
        MultaInput {
            infraction: code.to_string(),
            year: 2025,
            cure,
            omitted_tax: Decimal::ZERO,
            net_income: Decimal::ZERO,
        }
    }

    #[test]
    fn test_late_return_above_threshold() {
        let config = load_config();
        let mut multa = input("176_1", CureType::Voluntaria);
        multa.net_income = dec("1000000");

        let result = calculate_multa(&multa, &config).unwrap();
        // 1,000,000 > 150 UIT (802,500): 0.6% = 6000, within 1-12 UIT
        assert_eq!(result.value.base_fine, dec("6000.00"));
        assert_eq!(result.value.basis, "0.6% de S/ 1000000.00");
        assert_eq!(result.value.discount, dec("5400.00"));
        assert_eq!(result.value.final_fine, dec("600.00"));
    }

    #[test]
    fn test_late_return_below_threshold_is_one_uit() {
        let config = load_config();
        let mut multa = input("176_1", CureType::Inducida);
        multa.net_income = dec("100000");

        let result = calculate_multa(&multa, &config).unwrap();
        assert_eq!(result.value.basis, "1 UIT");
        assert_eq!(result.value.base_fine, dec("5350.00"));
        // 70% off
        assert_eq!(result.value.final_fine, dec("1605.00"));
    }

    #[test]
    fn test_late_return_capped_at_twelve_uit() {
        let config = load_config();
        let mut multa = input("176_1", CureType::Voluntaria);
        multa.net_income = dec("20000000");

        let result = calculate_multa(&multa, &config).unwrap();
        assert_eq!(result.value.base_fine, dec("64200.00"));
    }

    #[test]
    fn test_false_figures_on_omitted_tax() {
        let config = load_config();
        let mut multa = input("178_1", CureType::Voluntaria);
        multa.omitted_tax = dec("2000");

        let result = calculate_multa(&multa, &config).unwrap();
        assert_eq!(result.value.base_fine, dec("1000.00"));
        assert_eq!(result.value.discount_rate, dec("0.95"));
        assert_eq!(result.value.final_fine, dec("50.00"));
    }

    #[test]
    fn test_books_not_shown() {
        let config = load_config();
        let mut multa = input("177_1", CureType::Inducida);
        multa.net_income = dec("500000");

        let result = calculate_multa(&multa, &config).unwrap();
        assert_eq!(result.value.base_fine, dec("1500.00"));
        assert_eq!(result.value.final_fine, dec("300.00"));
    }

    #[test]
    fn test_unknown_infraction() {
        let config = load_config();
        let result = calculate_multa(&input("999_9", CureType::Voluntaria), &config);
        match result {
            Err(EngineError::UnknownInfraction { code }) => assert_eq!(code, "999_9"),
            _ => panic!("Expected UnknownInfraction error"),
        }
    }

    #[test]
    fn test_amounts_at_decimal_limit_do_not_overflow() {
        let config = load_config();

        // The cap keeps the fine at 12 UIT.
        let mut late = input("176_1", CureType::Voluntaria);
        late.net_income = Decimal::MAX;
        let result = calculate_multa(&late, &config).unwrap();
        assert_eq!(result.value.base_fine, dec("64200.00"));

        let mut false_figures = input("178_1", CureType::Inducida);
        false_figures.omitted_tax = Decimal::MAX;
        let result = calculate_multa(&false_figures, &config).unwrap();
        assert!(result.value.final_fine > Decimal::ZERO);
    }
}
