//! IGV (Impuesto General a las Ventas) breakdown.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Audited};

use super::checked::CheckedAmount;
use super::remuneration::require_non_negative;

/// Which figure the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgvMode {
    /// `amount` is the total, IGV included.
    #[default]
    AmountIncludesIgv,
    /// `amount` is the taxable base.
    AmountExcludesIgv,
    /// `amount` is the IGV itself.
    FromIgv,
}

/// Input to [`calculate_igv`].
#[derive(Debug, Clone, Deserialize)]
pub struct IgvInput {
    /// The supplied figure, interpreted according to `mode`.
    pub amount: Decimal,
    /// How `amount` is interpreted.
    #[serde(default)]
    pub mode: IgvMode,
    /// Rate override, as a fraction. Defaults to the configured rate.
    #[serde(default)]
    pub igv_rate: Option<Decimal>,
    /// Number of units, for a unit price.
    #[serde(default)]
    pub units: Option<u32>,
    /// Decimal places in the result (default 2).
    #[serde(default)]
    pub decimals: Option<u32>,
}

/// IGV breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgvResult {
    /// Rate applied, as a fraction.
    pub igv_rate: Decimal,
    /// Valor de venta.
    pub base: Decimal,
    /// IGV.
    pub igv: Decimal,
    /// Precio de venta.
    pub total: Decimal,
    /// Base divided by units, when units were given.
    pub unit_price: Option<Decimal>,
}

const MAX_DECIMALS: u32 = 8;

/// Splits an amount into base, IGV and total.
///
/// A zero rate in `from_igv` mode yields a zero base.
pub fn calculate_igv(input: &IgvInput, config: &ConfigLoader) -> EngineResult<Audited<IgvResult>> {
    require_non_negative("amount", input.amount)?;
    let rate = input.igv_rate.unwrap_or(config.tax().igv_rate);
    require_non_negative("igv_rate", rate)?;
    let decimals = input.decimals.unwrap_or(2);
    if decimals > MAX_DECIMALS {
        return Err(EngineError::invalid_input(
            "decimals",
            format!("must be at most {}", MAX_DECIMALS),
        ));
    }

    let (base, igv, total) = match input.mode {
        IgvMode::AmountIncludesIgv => {
            let total = input.amount;
            let base = total.try_div(Decimal::ONE.try_add(rate)?)?;
            (base, total - base, total)
        }
        IgvMode::AmountExcludesIgv => {
            let base = input.amount;
            let igv = base.try_mul(rate)?;
            (base, igv, base.try_add(igv)?)
        }
        IgvMode::FromIgv => {
            let igv = input.amount;
            let base = if rate.is_zero() { Decimal::ZERO } else { igv.try_div(rate)? };
            (base, igv, base.try_add(igv)?)
        }
    };
    let rate_percent = rate.try_mul(Decimal::ONE_HUNDRED)?;

    let unit_price = match input.units {
        Some(units) if units > 0 => Some(round_to(base / Decimal::from(units), decimals)),
        _ => None,
    };

    let result = IgvResult {
        igv_rate: rate,
        base: round_to(base, decimals),
        igv: round_to(igv, decimals),
        total: round_to(total, decimals),
        unit_price,
    };

    let step = AuditStep {
        step_number: 1,
        rule_id: "igv_breakdown".to_string(),
        rule_name: "IGV Breakdown".to_string(),
        clause_ref: "TUO Ley del IGV, Art. 17".to_string(),
        input: serde_json::json!({
            "amount": input.amount.normalize().to_string(),
            "mode": input.mode,
            "igv_rate": rate.normalize().to_string(),
        }),
        output: serde_json::json!({
            "base": result.base.to_string(),
            "igv": result.igv.to_string(),
            "total": result.total.to_string(),
        }),
        reasoning: format!(
            "Base S/ {} + IGV S/ {} ({}%) = S/ {}",
            result.base,
            result.igv,
            rate_percent.normalize(),
            result.total
        ),
    };

    Ok(Audited::new(result, vec![step]))
}

fn round_to(value: Decimal, decimals: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);
    rounded
}
