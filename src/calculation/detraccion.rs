//! Detracciones (SPOT).
//!
//! The buyer withholds a percentage of the operation amount and deposits it
//! in the seller's Banco de la Nación account. Operations at or below the
//! configured threshold are not subject.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::models::{AuditStep, Audited};

use super::checked::CheckedAmount;
use super::round_currency;

fn default_true() -> bool {
    true
}

/// Input to [`calculate_detraccion`].
#[derive(Debug, Clone, Deserialize)]
pub struct DetraccionInput {
    /// Operation amount, IGV included.
    pub amount: Decimal,
    /// Percentage to withhold (e.g. `12` for 12%). Catalog rates and custom
    /// percentages are both accepted.
    pub rate: Decimal,
    /// Round the detracción to whole soles.
    #[serde(default = "default_true")]
    pub round_to_soles: bool,
}

/// Result of a detracción calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetraccionResult {
    /// Operation amount.
    pub amount: Decimal,
    /// Percentage applied.
    pub rate: Decimal,
    /// Catalog description when the rate matches a configured rate.
    pub rate_label: Option<String>,
    /// Whether the operation is subject to detracción.
    pub applies: bool,
    /// Set when the amount is positive but does not exceed the threshold.
    pub below_threshold: bool,
    /// Amount to deposit.
    pub detraccion: Decimal,
    /// Amount payable to the seller.
    pub net_payable: Decimal,
}

/// Calculates the detracción for an operation.
///
/// A non-positive amount or rate yields no detracción; that is not an
/// error. A product outside `Decimal`'s range is a `CalculationError`.
pub fn calculate_detraccion(
    input: &DetraccionInput,
    config: &ConfigLoader,
) -> EngineResult<Audited<DetraccionResult>> {
    let detraccion_config = &config.tax().detraccion;
    let rate_label = detraccion_config
        .rates
        .iter()
        .find(|r| r.rate == input.rate)
        .map(|r| r.label.clone());

    let valid = input.amount > Decimal::ZERO && input.rate > Decimal::ZERO;
    let applies = valid && input.amount > detraccion_config.threshold;

    let mut detraccion = if applies {
        input.amount.try_mul(input.rate)? / Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    if applies && input.round_to_soles {
        detraccion = detraccion.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    }
    let detraccion = round_currency(detraccion);
    let net_payable = round_currency(input.amount - detraccion);

    let result = DetraccionResult {
        amount: round_currency(input.amount),
        rate: input.rate,
        rate_label,
        applies,
        below_threshold: valid && !applies,
        detraccion,
        net_payable,
    };

    let reasoning = if applies {
        format!(
            "S/ {} × {}% = S/ {}{}",
            input.amount.normalize(),
            input.rate.normalize(),
            detraccion,
            if input.round_to_soles { " (redondeado a soles)" } else { "" }
        )
    } else {
        format!(
            "S/ {} does not exceed S/ {}; no detracción",
            input.amount.normalize(),
            detraccion_config.threshold.normalize()
        )
    };

    let step = AuditStep {
        step_number: 1,
        rule_id: "detraccion_amount".to_string(),
        rule_name: "Detracción Amount".to_string(),
        clause_ref: "D.Leg. 940; R.S. 183-2004/SUNAT".to_string(),
        input: serde_json::json!({
            "amount": input.amount.normalize().to_string(),
            "rate": input.rate.normalize().to_string(),
            "threshold": detraccion_config.threshold.normalize().to_string(),
            "round_to_soles": input.round_to_soles,
        }),
        output: serde_json::json!({
            "applies": applies,
            "detraccion": detraccion.to_string(),
            "net_payable": net_payable.to_string(),
        }),
        reasoning,
    };

    Ok(Audited::new(result, vec![step]))
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

    fn input(amount: &str, rate: &str, round: bool) -> DetraccionInput {
        DetraccionInput {
            amount: dec(amount),
            rate: dec(rate),
            round_to_soles: round,
        }
    }

    #[test]
    fn test_catalog_rate_rounded_to_soles() {
        let config = load_config();
        let result = calculate_detraccion(&input("1234.50", "12", true), &config).unwrap();

        // 1234.50 × 12% = 148.14 → 148
        assert!(result.value.applies);
        assert_eq!(result.value.detraccion, dec("148.00"));
        assert_eq!(result.value.net_payable, dec("1086.50"));
        assert!(result.value.rate_label.unwrap().starts_with("12%"));
    }

    #[test]
    fn test_unrounded_detraccion() {
        let config = load_config();
        let result = calculate_detraccion(&input("1234.50", "12", false), &config).unwrap();
        assert_eq!(result.value.detraccion, dec("148.14"));
    }

    #[test]
    fn test_custom_rate_has_no_label() {
        let config = load_config();
        let result = calculate_detraccion(&input("2000", "7", true), &config).unwrap();
        assert_eq!(result.value.detraccion, dec("140.00"));
        assert_eq!(result.value.rate_label, None);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let config = load_config();
        let result = calculate_detraccion(&input("700", "10", true), &config).unwrap();

        assert!(!result.value.applies);
        assert!(result.value.below_threshold);
        assert_eq!(result.value.detraccion, Decimal::ZERO);
        assert_eq!(result.value.net_payable, dec("700.00"));

        let above = calculate_detraccion(&input("700.01", "10", true), &config).unwrap();
        assert!(above.value.applies);
        assert_eq!(above.value.detraccion, dec("70.00"));
    }

    #[test]
    fn test_non_positive_inputs_yield_nothing() {
        let config = load_config();

        let zero = calculate_detraccion(&input("0", "10", true), &config).unwrap();
        assert!(!zero.value.applies);
        assert!(!zero.value.below_threshold);

        let no_rate = calculate_detraccion(&input("5000", "0", true), &config).unwrap();
        assert_eq!(no_rate.value.detraccion, Decimal::ZERO);
        assert_eq!(no_rate.value.net_payable, dec("5000.00"));
    }

    #[test]
    fn test_amount_beyond_decimal_range_is_calculation_error() {
        let config = load_config();
        let input = DetraccionInput {
            amount: Decimal::MAX,
            rate: dec("12"),
            round_to_soles: true,
        };

        let result = calculate_detraccion(&input, &config);
        assert!(matches!(
            result,
            Err(crate::error::EngineError::CalculationError { .. })
        ));
    }
}
