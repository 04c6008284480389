//! Intereses moratorios on unpaid tax.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Audited};

use super::checked::CheckedAmount;
use super::remuneration::require_non_negative;
use super::round_currency;

/// Input to [`calculate_intereses`].
#[derive(Debug, Clone, Deserialize)]
pub struct InteresesInput {
    /// Tributo insoluto.
    pub tax_amount: Decimal,
    /// Original due date.
    pub due_date: NaiveDate,
    /// Date of payment.
    pub payment_date: NaiveDate,
}

/// Result of an intereses moratorios calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteresesResult {
    /// Days between due date and payment.
    pub days_late: i64,
    /// Monthly TIM applied, as a fraction.
    pub tim_monthly: Decimal,
    /// Daily TIM (monthly / 30), as a fraction.
    pub tim_daily: Decimal,
    /// Interest owed.
    pub interest: Decimal,
    /// Tax plus interest.
    pub total: Decimal,
}

/// Calculates simple daily interest at the TIM in force on the due date.
pub fn calculate_intereses(
    input: &InteresesInput,
    config: &ConfigLoader,
) -> EngineResult<Audited<InteresesResult>> {
    require_non_negative("tax_amount", input.tax_amount)?;
    if input.payment_date < input.due_date {
        return Err(EngineError::InvalidInterval {
            start: input.due_date,
            end: input.payment_date,
        });
    }

    let tim_monthly = config.rates_for(input.due_date)?.tim_monthly;
    let tim_daily = tim_monthly / Decimal::from(30);
    let days_late = (input.payment_date - input.due_date).num_days();
    let interest = round_currency(
        input
            .tax_amount
            .try_mul(tim_daily)?
            .try_mul(Decimal::from(days_late))?,
    );
    let total = round_currency(input.tax_amount).try_add(interest)?;

    let step = AuditStep {
        step_number: 1,
        rule_id: "intereses_moratorios".to_string(),
        rule_name: "Late Payment Interest".to_string(),
        clause_ref: "Código Tributario, Art. 33".to_string(),
        input: serde_json::json!({
            "tax_amount": input.tax_amount.normalize().to_string(),
            "due_date": input.due_date.to_string(),
            "payment_date": input.payment_date.to_string(),
            "tim_monthly": tim_monthly.normalize().to_string(),
        }),
        output: serde_json::json!({
            "days_late": days_late,
            "interest": interest.to_string(),
        }),
        reasoning: format!(
            "S/ {} × ({}% / 30) × {} days = S/ {}",
            input.tax_amount.normalize(),
            (tim_monthly * Decimal::ONE_HUNDRED).normalize(),
            days_late,
            interest
        ),
    };

    Ok(Audited::new(
        InteresesResult {
            days_late,
            tim_monthly,
            tim_daily,
            interest,
            total,
        },
        vec![step],
    ))
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

    #[test]
    fn test_interest_for_days_late() {
        let config = load_config();
        let input = InteresesInput {
            tax_amount: dec("10000"),
            due_date: date(2025, 3, 17),
            payment_date: date(2025, 4, 16),
        };

        let result = calculate_intereses(&input, &config).unwrap();
        // 10000 × 0.0003 × 30
        assert_eq!(result.value.days_late, 30);
        assert_eq!(result.value.tim_daily, dec("0.0003"));
        assert_eq!(result.value.interest, dec("90.00"));
        assert_eq!(result.value.total, dec("10090.00"));
    }

    #[test]
    fn test_payment_on_due_date_has_no_interest() {
        let config = load_config();
        let input = InteresesInput {
            tax_amount: dec("1500"),
            due_date: date(2025, 5, 20),
            payment_date: date(2025, 5, 20),
        };

        let result = calculate_intereses(&input, &config).unwrap();
        assert_eq!(result.value.days_late, 0);
        assert_eq!(result.value.interest, Decimal::ZERO);
    }

    #[test]
    fn test_payment_before_due_date_rejected() {
        let config = load_config();
        let input = InteresesInput {
            tax_amount: dec("1500"),
            due_date: date(2025, 5, 20),
            payment_date: date(2025, 5, 19),
        };

        let result = calculate_intereses(&input, &config);
        assert!(matches!(result, Err(EngineError::InvalidInterval { .. })));
    }

    #[test]
    fn test_out_of_range_interest_is_calculation_error() {
        let config = load_config();
        let cases = [
            (Decimal::MAX, date(2025, 4, 16)),
            (Decimal::from_str("10000000000000000000000000").unwrap(), date(200000, 1, 1)),
        ];
        for (tax_amount, payment_date) in cases {
            let input = InteresesInput {
                tax_amount,
                due_date: date(2025, 3, 17),
                payment_date,
            };
            let result = calculate_intereses(&input, &config);
            assert!(
                matches!(result, Err(EngineError::CalculationError { .. })),
                "{}",
                payment_date
            );
        }
    }
}
