//! Tax regime comparison: Nuevo RUS, RER, RMT and Régimen General.
//!
//! Each regime is checked against its eligibility thresholds and costed on
//! the same annual figures. The best option is the eligible regime with the
//! lowest income tax plus ITAN; IGV is reported but not compared, since it
//! is the same for every regime that charges it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Audited};

use super::checked::CheckedAmount;
use super::remuneration::require_non_negative;
use super::round_currency;

/// The tax regimes available to a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    /// Nuevo Régimen Único Simplificado.
    Nrus,
    /// Régimen Especial de Renta.
    Rer,
    /// Régimen MYPE Tributario.
    Rmt,
    /// Régimen General.
    Rg,
}

impl TaxRegime {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            TaxRegime::Nrus => "Nuevo RUS",
            TaxRegime::Rer => "Régimen Especial (RER)",
            TaxRegime::Rmt => "Régimen MYPE (RMT)",
            TaxRegime::Rg => "Régimen General (RG)",
        }
    }
}

/// Input to [`simulate_regimenes`].
#[derive(Debug, Clone, Deserialize)]
pub struct RegimenesInput {
    /// Tax year, used to look up the UIT.
    pub year: i32,
    /// Annual income.
    pub annual_income: Decimal,
    /// Annual purchases.
    #[serde(default)]
    pub annual_purchases: Decimal,
    /// Annual deductible expenses.
    #[serde(default)]
    pub deductible_expenses: Decimal,
    /// Net asset value.
    #[serde(default)]
    pub asset_value: Decimal,
    /// Whether the business must issue facturas.
    #[serde(default)]
    pub needs_invoices: bool,
    /// Whether the business has more than ten workers per shift.
    #[serde(default)]
    pub more_than_ten_workers: bool,
}

/// One regime's eligibility and annual cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegimeOption {
    /// Regime.
    pub regime: TaxRegime,
    /// Display name.
    pub name: String,
    /// Whether the business qualifies.
    pub valid: bool,
    /// Why the business does not qualify.
    pub reasons: Vec<String>,
    /// Annual income tax (or NRUS fees).
    pub income_tax: Decimal,
    /// Annual IGV payable.
    pub igv: Decimal,
    /// ITAN.
    pub itan: Decimal,
    /// Income tax plus ITAN.
    pub total: Decimal,
}

/// Result of a regime simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegimenesResult {
    /// UIT used.
    pub uit: Decimal,
    /// max(0, income - purchases - expenses).
    pub profit: Decimal,
    /// max(0, IGV on sales - IGV on purchases).
    pub igv_payable: Decimal,
    /// All four regimes, in order.
    pub options: Vec<RegimeOption>,
    /// The eligible regime with the lowest total.
    pub best_option: Option<TaxRegime>,
}

struct Figures {
    income: Decimal,
    purchases: Decimal,
    assets: Decimal,
    profit: Decimal,
    igv_payable: Decimal,
    uit: Decimal,
}

/// Compares the four regimes for the given annual figures.
///
/// # Errors
///
/// `InvalidInput` when annual income is not positive; `UitNotFound` when
/// the year has no configured UIT.
pub fn simulate_regimenes(
    input: &RegimenesInput,
    config: &ConfigLoader,
) -> EngineResult<Audited<RegimenesResult>> {
    if input.annual_income <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "annual_income",
            "must be greater than zero",
        ));
    }
    require_non_negative("annual_purchases", input.annual_purchases)?;
    require_non_negative("deductible_expenses", input.deductible_expenses)?;
    require_non_negative("asset_value", input.asset_value)?;

    let uit = config.uit_for_year(input.year)?;
    let igv_rate = config.tax().igv_rate;
    let figures = Figures {
        income: input.annual_income,
        purchases: input.annual_purchases,
        assets: input.asset_value,
        profit: input
            .annual_income
            .try_sub(input.annual_purchases)?
            .try_sub(input.deductible_expenses)?
            .max(Decimal::ZERO),
        igv_payable: (input.annual_income * igv_rate - input.annual_purchases * igv_rate)
            .max(Decimal::ZERO),
        uit,
    };

    let options = vec![
        nuevo_rus(input, &figures, config),
        rer(input, &figures, config),
        rmt(&figures, config),
        general(&figures, config),
    ];

    let best_option = options
        .iter()
        .filter(|o| o.valid)
        .fold(None::<&RegimeOption>, |best, o| match best {
            Some(b) if b.total <= o.total => Some(b),
            _ => Some(o),
        })
        .map(|o| o.regime);

    let step = AuditStep {
        step_number: 1,
        rule_id: "regimenes_comparison".to_string(),
        rule_name: "Tax Regime Comparison".to_string(),
        clause_ref: "D.Leg. 937; D.Leg. 1269; TUO LIR".to_string(),
        input: serde_json::json!({
            "uit": uit.normalize().to_string(),
            "annual_income": input.annual_income.normalize().to_string(),
            "profit": figures.profit.normalize().to_string(),
        }),
        output: serde_json::json!({
            "valid": options.iter().filter(|o| o.valid).map(|o| o.regime).collect::<Vec<_>>(),
            "best_option": best_option,
        }),
        reasoning: options
            .iter()
            .map(|o| {
                if o.valid {
                    format!("{}: S/ {}", o.name, o.total)
                } else {
                    format!("{}: {}", o.name, o.reasons.join(" "))
                }
            })
            .collect::<Vec<_>>()
            .join("; "),
    };

    Ok(Audited::new(
        RegimenesResult {
            uit,
            profit: round_currency(figures.profit),
            igv_payable: round_currency(figures.igv_payable),
            options,
            best_option,
        },
        vec![step],
    ))
}

fn option(regime: TaxRegime, reasons: Vec<String>) -> RegimeOption {
    RegimeOption {
        regime,
        name: regime.name().to_string(),
        valid: reasons.is_empty(),
        reasons,
        income_tax: round_currency(Decimal::ZERO),
        igv: round_currency(Decimal::ZERO),
        itan: round_currency(Decimal::ZERO),
        total: round_currency(Decimal::ZERO),
    }
}

fn with_cost(mut o: RegimeOption, income_tax: Decimal, igv: Decimal, itan: Decimal) -> RegimeOption {
    o.igv = round_currency(igv);
    if o.valid {
        o.income_tax = round_currency(income_tax);
        o.itan = round_currency(itan);
        o.total = round_currency(income_tax + itan);
    }
    o
}

fn nuevo_rus(input: &RegimenesInput, f: &Figures, config: &ConfigLoader) -> RegimeOption {
    let limits = &config.tax().tax_regimes.nrus;
    let mut reasons = Vec::new();
    if f.income > limits.max_income || f.purchases > limits.max_income {
        reasons.push(format!(
            "Supera S/ {} en ingresos o compras.",
            limits.max_income.normalize()
        ));
    }
    if f.assets > limits.max_assets {
        reasons.push(format!("Supera S/ {} en activos.", limits.max_assets.normalize()));
    }
    if input.needs_invoices {
        reasons.push("Requiere emitir facturas.".to_string());
    }

    let monthly_average = f.income.max(f.purchases) / Decimal::from(12);
    let fee = if monthly_average <= limits.fee_threshold {
        limits.low_monthly_fee
    } else {
        limits.high_monthly_fee
    };
    // NRUS fees include IGV.
    with_cost(option(TaxRegime::Nrus, reasons), fee * Decimal::from(12), Decimal::ZERO, Decimal::ZERO)
}

fn rer(input: &RegimenesInput, f: &Figures, config: &ConfigLoader) -> RegimeOption {
    let limits = &config.tax().tax_regimes.rer;
    let mut reasons = Vec::new();
    if f.income > limits.max_income || f.purchases > limits.max_income {
        reasons.push(format!(
            "Supera S/ {} en ingresos o compras.",
            limits.max_income.normalize()
        ));
    }
    if f.assets > limits.max_assets {
        reasons.push(format!("Supera S/ {} en activos.", limits.max_assets.normalize()));
    }
    if input.more_than_ten_workers {
        reasons.push(format!(
            "Supera los {} trabajadores por turno.",
            limits.max_workers_per_shift
        ));
    }
    with_cost(option(TaxRegime::Rer, reasons), f.income * limits.rate, f.igv_payable, Decimal::ZERO)
}

fn rmt(f: &Figures, config: &ConfigLoader) -> RegimeOption {
    let limits = &config.tax().tax_regimes.rmt;
    let mut reasons = Vec::new();
    let max_income = limits.max_income_uit * f.uit;
    if f.income > max_income {
        reasons.push(format!(
            "Supera {} UIT (S/ {}) en ingresos.",
            limits.max_income_uit.normalize(),
            max_income.normalize()
        ));
    }

    let tier = limits.tier_uit * f.uit;
    let income_tax = if f.profit <= tier {
        f.profit * limits.low_rate
    } else {
        tier * limits.low_rate + (f.profit - tier) * limits.high_rate
    };
    with_cost(option(TaxRegime::Rmt, reasons), income_tax, f.igv_payable, Decimal::ZERO)
}

fn general(f: &Figures, config: &ConfigLoader) -> RegimeOption {
    let params = &config.tax().tax_regimes.rg;
    let itan = if f.assets > params.itan_exempt_assets {
        (f.assets - params.itan_exempt_assets) * params.itan_rate
    } else {
        Decimal::ZERO
    };
    with_cost(option(TaxRegime::Rg, Vec::new()), f.profit * params.rate, f.igv_payable, itan)
}
