//! Annual income tax on work income (rentas de cuarta y quinta categoría).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigLoader, TaxBracket};
use crate::error::EngineResult;
use crate::models::{AuditStep, Audited};

use super::checked::{CheckedAmount, try_sum};
use super::remuneration::{require_non_negative, require_positive};
use super::round_currency;

/// Which work income is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeKind {
    /// Employment income.
    #[default]
    Quinta,
    /// Independent fees.
    Cuarta,
    /// Both.
    CuartaQuinta,
}

impl IncomeKind {
    fn has_quinta(self) -> bool {
        matches!(self, IncomeKind::Quinta | IncomeKind::CuartaQuinta)
    }

    fn has_cuarta(self) -> bool {
        matches!(self, IncomeKind::Cuarta | IncomeKind::CuartaQuinta)
    }
}

fn default_true() -> bool {
    true
}

/// Input to [`calculate_renta`].
#[derive(Debug, Clone, Deserialize)]
pub struct RentaInput {
    /// Income kind.
    #[serde(default)]
    pub kind: IncomeKind,
    /// Tax year, used to look up the UIT.
    pub year: i32,
    /// UIT to use instead of the configured value.
    #[serde(default)]
    pub uit_override: Option<Decimal>,
    /// Monthly salary (quinta).
    #[serde(default)]
    pub monthly_salary: Decimal,
    /// Include July and December gratificaciones plus the 9% bonus.
    #[serde(default = "default_true")]
    pub include_gratificaciones: bool,
    /// Other annual quinta income.
    #[serde(default)]
    pub other_annual_income: Decimal,
    /// Annual fees (cuarta).
    #[serde(default)]
    pub annual_fees: Decimal,
}

/// Tax charged within one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTax {
    /// Bracket description.
    pub label: String,
    /// Rate, as a fraction.
    pub rate: Decimal,
    /// Income taxed in this bracket.
    pub taxable: Decimal,
    /// Tax in this bracket.
    pub tax: Decimal,
}

/// Result of an income tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RentaResult {
    /// UIT used.
    pub uit: Decimal,
    /// Gross quinta income.
    pub gross_quinta: Decimal,
    /// Gross cuarta income.
    pub gross_cuarta: Decimal,
    /// 20% fees deduction, capped.
    pub fees_deduction: Decimal,
    /// 7 UIT deduction.
    pub personal_deduction: Decimal,
    /// Income subject to the brackets.
    pub net_taxable: Decimal,
    /// Tax per bracket reached.
    pub brackets: Vec<BracketTax>,
    /// Annual tax.
    pub annual_tax: Decimal,
    /// Monthly withholding (annual tax / 12).
    pub monthly_withholding: Decimal,
}

/// Calculates annual work-income tax and the monthly withholding.
///
/// # Errors
///
/// `UitNotFound` when no rate file covers `year` and no override is given.
pub fn calculate_renta(input: &RentaInput, config: &ConfigLoader) -> EngineResult<Audited<RentaResult>> {
    require_non_negative("monthly_salary", input.monthly_salary)?;
    require_non_negative("other_annual_income", input.other_annual_income)?;
    require_non_negative("annual_fees", input.annual_fees)?;

    let uit = match input.uit_override {
        Some(uit) => {
            require_positive("uit_override", uit)?;
            uit
        }
        None => config.uit_for_year(input.year)?,
    };
    let params = &config.tax().income_tax;

    let mut gross_quinta = Decimal::ZERO;
    if input.kind.has_quinta() {
        gross_quinta = input
            .monthly_salary
            .try_mul(Decimal::from(12))?
            .try_add(input.other_annual_income)?;
        if input.include_gratificaciones {
            let gratificaciones = input.monthly_salary.try_mul(Decimal::from(2))?;
            let bonus = gratificaciones.try_mul(params.gratificacion_bonus_rate)?;
            gross_quinta = try_sum([gross_quinta, gratificaciones, bonus])?;
        }
    }

    let (gross_cuarta, fees_deduction) = if input.kind.has_cuarta() {
        let deduction = input
            .annual_fees
            .try_mul(params.fees_deduction_rate)?
            .min(params.fees_deduction_cap_uit.try_mul(uit)?);
        (input.annual_fees, deduction)
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let gross_total = gross_quinta.try_add(gross_cuarta)?;
    let personal_deduction = params.personal_deduction_uit.try_mul(uit)?;
    let net_taxable = gross_total
        .try_sub(fees_deduction)?
        .try_sub(personal_deduction)?
        .max(Decimal::ZERO);

    let brackets = apply_brackets(net_taxable, uit, &params.brackets)?;
    let annual_raw = try_sum(brackets.iter().map(|b| b.taxable * b.rate))?;
    let monthly_withholding = if gross_total > Decimal::ZERO {
        round_currency(annual_raw / Decimal::from(12))
    } else {
        round_currency(Decimal::ZERO)
    };
    let annual_tax = round_currency(annual_raw);

    let steps = vec![
        AuditStep {
            step_number: 1,
            rule_id: "renta_net_taxable".to_string(),
            rule_name: "Net Taxable Work Income".to_string(),
            clause_ref: "TUO Ley del Impuesto a la Renta, Art. 45-46".to_string(),
            input: serde_json::json!({
                "uit": uit.normalize().to_string(),
                "gross_quinta": gross_quinta.normalize().to_string(),
                "gross_cuarta": gross_cuarta.normalize().to_string(),
            }),
            output: serde_json::json!({
                "fees_deduction": fees_deduction.normalize().to_string(),
                "personal_deduction": personal_deduction.normalize().to_string(),
                "net_taxable": net_taxable.normalize().to_string(),
            }),
            reasoning: format!(
                "max(0, S/ {} - S/ {} - 7 UIT S/ {}) = S/ {}",
                gross_total.normalize(),
                fees_deduction.normalize(),
                personal_deduction.normalize(),
                net_taxable.normalize()
            ),
        },
        AuditStep {
            step_number: 2,
            rule_id: "renta_progressive_brackets".to_string(),
            rule_name: "Progressive Brackets".to_string(),
            clause_ref: "TUO Ley del Impuesto a la Renta, Art. 53".to_string(),
            input: serde_json::json!({
                "net_taxable": net_taxable.normalize().to_string(),
            }),
            output: serde_json::json!({
                "annual_tax": annual_tax.to_string(),
                "monthly_withholding": monthly_withholding.to_string(),
            }),
            reasoning: brackets
                .iter()
                .map(|b| format!("{}: S/ {} × {}", b.label, b.taxable.normalize(), b.rate.normalize()))
                .collect::<Vec<_>>()
                .join("; "),
        },
    ];

    Ok(Audited::new(
        RentaResult {
            uit,
            gross_quinta: round_currency(gross_quinta),
            gross_cuarta: round_currency(gross_cuarta),
            fees_deduction: round_currency(fees_deduction),
            personal_deduction: round_currency(personal_deduction),
            net_taxable: round_currency(net_taxable),
            brackets,
            annual_tax,
            monthly_withholding,
        },
        steps,
    ))
}

/// Splits `net` across the brackets; only brackets that receive income are
/// returned.
fn apply_brackets(
    net: Decimal,
    uit: Decimal,
    brackets: &[TaxBracket],
) -> EngineResult<Vec<BracketTax>> {
    let mut remaining = net;
    let mut previous_limit = Decimal::ZERO;
    let mut taxed = Vec::new();

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }
        let taxable = match bracket.up_to_uit {
            Some(limit_uit) => {
                let limit = limit_uit.try_mul(uit)?;
                let span = limit - previous_limit;
                previous_limit = limit;
                remaining.min(span)
            }
            None => remaining,
        };
        if taxable <= Decimal::ZERO {
            continue;
        }
        remaining -= taxable;
        taxed.push(BracketTax {
            label: bracket.label.clone(),
            rate: bracket.rate,
            taxable,
            tax: round_currency(taxable * bracket.rate),
        });
    }
    Ok(taxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn load_config() -> ConfigLoader {
        ConfigLoader::load("./config/peru").expect("Failed to load config")
    }

    fn input(kind: IncomeKind, year: i32) -> RentaInput {
        RentaInput {
            kind,
            year,
            uit_override: None,
            monthly_salary: Decimal::ZERO,
            include_gratificaciones: true,
            other_annual_income: Decimal::ZERO,
            annual_fees: Decimal::ZERO,
        }
    }

    #[test]
    fn test_quinta_with_gratificaciones() {
        let config = load_config();
        let mut renta = input(IncomeKind::Quinta, 2025);
        renta.monthly_salary = dec("5000");

        let result = calculate_renta(&renta, &config).unwrap();

        // 60000 + 10000 + 900 = 70900; 70900 - 7 × 5350 = 33450
        assert_eq!(result.value.uit, dec("5350"));
        assert_eq!(result.value.gross_quinta, dec("70900.00"));
        assert_eq!(result.value.net_taxable, dec("33450.00"));
        // 26750 × 8% + 6700 × 14% = 2140 + 938
        assert_eq!(result.value.brackets.len(), 2);
        assert_eq!(result.value.brackets[0].tax, dec("2140.00"));
        assert_eq!(result.value.brackets[1].taxable, dec("6700"));
        assert_eq!(result.value.annual_tax, dec("3078.00"));
        assert_eq!(result.value.monthly_withholding, dec("256.50"));
    }

    #[test]
    fn test_quinta_without_gratificaciones() {
        let config = load_config();
        let mut renta = input(IncomeKind::Quinta, 2025);
        renta.monthly_salary = dec("5000");
        renta.include_gratificaciones = false;

        let result = calculate_renta(&renta, &config).unwrap();
        assert_eq!(result.value.gross_quinta, dec("60000.00"));
    }

    #[test]
    fn test_cuarta_fees_deduction() {
        let config = load_config();
        let mut renta = input(IncomeKind::Cuarta, 2025);
        renta.annual_fees = dec("60000");
        // Ignored for cuarta only
        renta.monthly_salary = dec("5000");

        let result = calculate_renta(&renta, &config).unwrap();
        assert_eq!(result.value.gross_quinta, Decimal::ZERO);
        assert_eq!(result.value.fees_deduction, dec("12000.00"));
        // 48000 - 37450 = 10550 × 8%
        assert_eq!(result.value.annual_tax, dec("844.00"));
        assert_eq!(result.value.monthly_withholding, dec("70.33"));
    }

    #[test]
    fn test_fees_deduction_is_capped() {
        let config = load_config();
        let mut renta = input(IncomeKind::Cuarta, 2025);
        renta.annual_fees = dec("1000000");
        renta.uit_override = Some(dec("5000"));

        let result = calculate_renta(&renta, &config).unwrap();
        assert_eq!(result.value.uit, dec("5000"));
        assert_eq!(result.value.fees_deduction, dec("120000.00"));
        // Income beyond 45 UIT reaches the top bracket
        assert_eq!(result.value.brackets.len(), 5);
        assert_eq!(result.value.brackets[4].rate, dec("0.30"));
    }

    #[test]
    fn test_income_below_deduction_is_untaxed() {
        let config = load_config();
        let mut renta = input(IncomeKind::CuartaQuinta, 2024);
        renta.monthly_salary = dec("1500");
        renta.annual_fees = dec("5000");

        let result = calculate_renta(&renta, &config).unwrap();
        assert_eq!(result.value.net_taxable, Decimal::ZERO);
        assert!(result.value.brackets.is_empty());
        assert_eq!(result.value.annual_tax, Decimal::ZERO);
    }

    #[test]
    fn test_no_income_has_no_withholding() {
        let config = load_config();
        let result = calculate_renta(&input(IncomeKind::Quinta, 2025), &config).unwrap();
        assert_eq!(result.value.monthly_withholding, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_year_without_override() {
        let config = load_config();
        let mut renta = input(IncomeKind::Quinta, 2019);
        renta.monthly_salary = dec("5000");

        let result = calculate_renta(&renta, &config);
        assert!(matches!(result, Err(EngineError::UitNotFound { year: 2019 })));

        renta.uit_override = Some(dec("4200"));
        assert!(calculate_renta(&renta, &config).is_ok());
    }

    #[test]
    fn test_out_of_range_income_is_calculation_error() {
        let config = load_config();

        let mut quinta = input(IncomeKind::Quinta, 2025);
        quinta.monthly_salary = Decimal::MAX;
        assert!(matches!(
            calculate_renta(&quinta, &config),
            Err(EngineError::CalculationError { .. })
        ));

        let mut uit = input(IncomeKind::Cuarta, 2025);
        uit.uit_override = Some(Decimal::MAX);
        uit.annual_fees = dec("60000");
        assert!(matches!(
            calculate_renta(&uit, &config),
            Err(EngineError::CalculationError { .. })
        ));
    }
}
