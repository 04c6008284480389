//! Loan schedules under the French system (cuota constante).
//!
//! The installment is `P·r / (1 − (1 + r)^−n)`, which equals
//! `P·r(1 + r)^n / ((1 + r)^n − 1)` without raising `1 + r` to large powers.
//! Every row is rounded to céntimos and the last row settles the balance, so
//! the principal column always adds back to the amount borrowed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Audited};

use super::checked::{CheckedAmount, try_sum};
use super::round_currency;

/// Longest schedule accepted, in months.
pub const MAX_TERM_MONTHS: u32 = 600;

/// Input to [`calculate_prestamo`].
#[derive(Debug, Clone, Deserialize)]
pub struct PrestamoInput {
    /// Amount borrowed.
    pub principal: Decimal,
    /// Nominal annual rate as a percentage (e.g. `12` for 12%).
    pub annual_rate: Decimal,
    /// Number of monthly installments.
    pub term_months: u32,
    /// Extra principal paid with every installment.
    #[serde(default)]
    pub extra_payment: Decimal,
}

/// One month of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmortizationRow {
    /// Installment number, starting at 1.
    pub period: u32,
    /// Amount paid this month, extra payment included.
    pub payment: Decimal,
    /// Interest on the balance carried into this month.
    pub interest: Decimal,
    /// Principal repaid this month.
    pub principal: Decimal,
    /// Principal outstanding after this payment.
    pub balance: Decimal,
}

/// Result of a loan calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrestamoResult {
    /// Amount borrowed, rounded to céntimos.
    pub principal: Decimal,
    /// Monthly rate as a fraction (annual percentage / 1200).
    pub monthly_rate: Decimal,
    /// Constant installment before any extra payment.
    pub installment: Decimal,
    /// Installment plus the extra payment.
    pub payment: Decimal,
    /// Rows in the schedule; fewer than the term when extra payments are made.
    pub periods: u32,
    /// Sum of the interest column.
    pub total_interest: Decimal,
    /// Sum of the payment column.
    pub total_paid: Decimal,
    /// One row per installment.
    pub schedule: Vec<AmortizationRow>,
}

fn validate(input: &PrestamoInput) -> EngineResult<()> {
    if input.principal <= Decimal::ZERO {
        return Err(EngineError::invalid_input("principal", "must be positive"));
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(EngineError::invalid_input("annual_rate", "must not be negative"));
    }
    if input.extra_payment < Decimal::ZERO {
        return Err(EngineError::invalid_input("extra_payment", "must not be negative"));
    }
    if input.term_months == 0 || input.term_months > MAX_TERM_MONTHS {
        return Err(EngineError::invalid_input(
            "term_months",
            format!("must be between 1 and {}", MAX_TERM_MONTHS),
        ));
    }
    Ok(())
}

/// Unrounded French installment.
fn french_installment(principal: Decimal, rate: Decimal, months: u32) -> EngineResult<Decimal> {
    let straight = principal.try_div(Decimal::from(months))?;
    if rate.is_zero() {
        return Ok(straight);
    }

    let discount = Decimal::ONE.try_div(Decimal::ONE.try_add(rate)?)?;
    let mut discount_n = Decimal::ONE;
    for _ in 0..months {
        discount_n = discount_n.try_mul(discount)?;
    }

    let annuity = Decimal::ONE - discount_n;
    if annuity.is_zero() {
        // The rate vanishes below Decimal's precision.
        return Ok(straight);
    }
    principal.try_mul(rate)?.try_div(annuity)
}

/// Calculates the installment and amortization schedule of a loan.
///
/// Interest accrues monthly on the outstanding balance. Extra payments go
/// to principal and shorten the schedule; the installment itself is not
/// recalculated.
///
/// # Errors
///
/// `InvalidInput` for a non-positive principal, a negative rate or extra
/// payment, or a term outside `1..=MAX_TERM_MONTHS`. Figures beyond
/// `Decimal`'s range are a `CalculationError`.
pub fn calculate_prestamo(input: &PrestamoInput) -> EngineResult<Audited<PrestamoResult>> {
    validate(input)?;

    let principal = round_currency(input.principal);
    let rate = input.annual_rate.try_div(Decimal::from(1200))?;
    let installment = round_currency(french_installment(principal, rate, input.term_months)?);
    let scheduled = installment.try_add(input.extra_payment)?;

    let mut schedule = Vec::new();
    let mut balance = principal;
    for period in 1..=input.term_months {
        let interest = round_currency(balance.try_mul(rate)?);
        let mut amortized = scheduled.try_sub(interest)?;
        if amortized >= balance || period == input.term_months {
            amortized = balance;
        }
        balance -= amortized;
        schedule.push(AmortizationRow {
            period,
            payment: interest.try_add(amortized)?,
            interest,
            principal: amortized,
            balance,
        });
        if balance.is_zero() {
            break;
        }
    }

    let total_interest = round_currency(try_sum(schedule.iter().map(|row| row.interest))?);
    let total_paid = round_currency(try_sum(schedule.iter().map(|row| row.payment))?);
    let periods = schedule.len() as u32;

    let installment_step = AuditStep {
        step_number: 1,
        rule_id: "prestamo_installment".to_string(),
        rule_name: "French System Installment".to_string(),
        clause_ref: "Sistema francés de cuota constante".to_string(),
        input: serde_json::json!({
            "principal": principal.to_string(),
            "annual_rate": input.annual_rate.normalize().to_string(),
            "monthly_rate": rate.normalize().to_string(),
            "term_months": input.term_months,
        }),
        output: serde_json::json!({
            "installment": installment.to_string(),
        }),
        reasoning: format!(
            "S/ {} × {} / (1 − (1 + {})^−{}) = S/ {}",
            principal,
            rate.normalize(),
            rate.normalize(),
            input.term_months,
            installment
        ),
    };

    let schedule_step = AuditStep {
        step_number: 2,
        rule_id: "prestamo_schedule".to_string(),
        rule_name: "Amortization Schedule".to_string(),
        clause_ref: "Res. SBS 3274-2017 (cronograma de pagos)".to_string(),
        input: serde_json::json!({
            "installment": installment.to_string(),
            "extra_payment": input.extra_payment.normalize().to_string(),
        }),
        output: serde_json::json!({
            "periods": periods,
            "total_interest": total_interest.to_string(),
            "total_paid": total_paid.to_string(),
        }),
        reasoning: format!(
            "{} payments of S/ {} settle the loan with S/ {} of interest",
            periods, scheduled, total_interest
        ),
    };

    let result = PrestamoResult {
        principal,
        monthly_rate: rate.normalize(),
        installment,
        payment: round_currency(scheduled),
        periods,
        total_interest,
        total_paid,
        schedule,
    };

    Ok(Audited::new(result, vec![installment_step, schedule_step]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(principal: &str, rate: &str, months: u32) -> PrestamoInput {
        PrestamoInput {
            principal: dec(principal),
            annual_rate: dec(rate),
            term_months: months,
            extra_payment: Decimal::ZERO,
        }
    }

    #[test]
    fn test_twelve_month_loan_at_twelve_percent() {
        let result = calculate_prestamo(&input("10000", "12", 12)).unwrap().value;

        assert_eq!(result.monthly_rate, dec("0.01"));
        assert_eq!(result.installment, dec("888.49"));
        assert_eq!(result.periods, 12);

        let first = &result.schedule[0];
        assert_eq!(first.interest, dec("100.00"));
        assert_eq!(first.principal, dec("788.49"));
        assert_eq!(first.balance, dec("9211.51"));

        // The last row absorbs the rounding of the previous eleven.
        let last = result.schedule.last().unwrap();
        assert_eq!(last.payment, dec("888.47"));
        assert_eq!(last.balance, Decimal::ZERO);

        assert_eq!(result.total_interest, dec("661.86"));
        assert_eq!(result.total_paid, dec("10661.86"));
    }

    #[test]
    fn test_principal_column_repays_the_loan() {
        let result = calculate_prestamo(&input("30000", "18.5", 36)).unwrap().value;
        assert_eq!(result.installment, dec("1092.11"));

        let repaid: Decimal = result.schedule.iter().map(|row| row.principal).sum();
        assert_eq!(repaid, dec("30000.00"));
        assert_eq!(result.total_interest, dec("9316.05"));
        for pair in result.schedule.windows(2) {
            assert!(pair[1].interest < pair[0].interest);
        }
    }

    #[test]
    fn test_extra_payment_shortens_schedule() {
        let mut with_extra = input("10000", "12", 12);
        with_extra.extra_payment = dec("500");

        let result = calculate_prestamo(&with_extra).unwrap().value;
        assert_eq!(result.installment, dec("888.49"));
        assert_eq!(result.payment, dec("1388.49"));
        assert_eq!(result.periods, 8);
        assert_eq!(result.schedule.last().unwrap().payment, dec("712.48"));
        assert_eq!(result.total_interest, dec("431.91"));
    }

    #[test]
    fn test_zero_rate_splits_principal_evenly() {
        let result = calculate_prestamo(&input("1000", "0", 7)).unwrap().value;

        assert_eq!(result.installment, dec("142.86"));
        assert_eq!(result.total_interest, dec("0.00"));
        assert_eq!(result.schedule.last().unwrap().payment, dec("142.84"));
        assert_eq!(result.total_paid, dec("1000.00"));
    }

    #[test]
    fn test_audit_trace() {
        let audited = calculate_prestamo(&input("10000", "12", 12)).unwrap();

        assert_eq!(audited.steps.len(), 2);
        assert_eq!(audited.steps[0].rule_id, "prestamo_installment");
        assert_eq!(audited.steps[0].output["installment"], "888.49");
        assert_eq!(audited.steps[1].output["periods"], 12);
    }

    #[test]
    fn test_invalid_inputs() {
        let cases = [
            (input("0", "12", 12), "principal"),
            (input("1000", "-1", 12), "annual_rate"),
            (input("1000", "12", 0), "term_months"),
            (input("1000", "12", MAX_TERM_MONTHS + 1), "term_months"),
        ];

        for (case, expected) in cases {
            match calculate_prestamo(&case) {
                Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, expected),
                other => panic!("Expected InvalidInput for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_principal_beyond_decimal_range_is_calculation_error() {
        let result = calculate_prestamo(&input("79228162514264337593543950335", "12", 12));
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }
}
