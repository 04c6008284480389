//! Proportional benefit amounts.
//!
//! This module provides [`compute_proration`], the formula shared by every
//! truncated labour benefit, and [`calculate_proration`], which composes the
//! whole pipeline: resolve the window, intersect the employment interval,
//! decompose the effective time, and prorate the computable base.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::EngineResult;
use crate::models::{
    AuditStep, Audited, EmploymentInterval, RegimeFactor, TimeDecomposition, WindowScheme,
};

use super::checked::CheckedAmount;
use super::{DAYS_PER_MONTH, decompose, intersect, resolve_window};

/// Rounds an amount to céntimos, midpoint away from zero.
///
/// Only results are rounded; intermediate values keep full precision.
///
/// ```
/// use beneficios_engine::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_currency(Decimal::from_str("10.005").unwrap()), Decimal::from_str("10.01").unwrap());
/// assert_eq!(round_currency(Decimal::from_str("-10.005").unwrap()), Decimal::from_str("-10.01").unwrap());
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // Fixed two-place scale so amounts serialize as "370.00".
    rounded.rescale(2);
    rounded
}

/// Applies the proportional formula to a decomposition.
///
/// `(base / 12 × months + base / 12 / 30 × days) × factor`
///
/// There is no validation and no rounding: a non-positive base produces a
/// zero or negative amount. A product outside `Decimal`'s range is a
/// `CalculationError`.
///
/// # Example
///
/// ```
/// use beneficios_engine::calculation::compute_proration;
/// use beneficios_engine::models::{RegimeFactor, TimeDecomposition};
/// use rust_decimal::Decimal;
///
/// let decomposition = TimeDecomposition { whole_months: 2, remainder_days: 14 };
/// let amount = compute_proration(Decimal::from(1800), decomposition, RegimeFactor::Full).unwrap();
/// assert_eq!(amount, Decimal::from(370));
/// ```
pub fn compute_proration(
    base: Decimal,
    decomposition: TimeDecomposition,
    factor: RegimeFactor,
) -> EngineResult<Decimal> {
    let monthly_rate = base / Decimal::from(12);
    let monthly_portion = monthly_rate.try_mul(Decimal::from(decomposition.whole_months))?;
    let daily_portion =
        monthly_rate / Decimal::from(DAYS_PER_MONTH) * Decimal::from(decomposition.remainder_days);
    monthly_portion
        .try_add(daily_portion)?
        .try_mul(factor.multiplier())
}

/// Input to the full proration pipeline.
#[derive(Debug, Clone)]
pub struct ProrationInput {
    /// Computable remuneration.
    pub base: Decimal,
    /// The employment interval.
    pub interval: EmploymentInterval,
    /// Date that selects the window (usually the cut-off date).
    pub reference: NaiveDate,
    /// Which semester cutoffs apply.
    pub scheme: WindowScheme,
    /// Regime multiplier.
    pub factor: RegimeFactor,
}

/// Output of the full proration pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProrationResult {
    /// Label of the resolved window.
    pub period_label: String,
    /// Label of the effective interval.
    pub effective_period: String,
    /// Complete 30-day months.
    pub whole_months: u32,
    /// Remaining days.
    pub remainder_days: u32,
    /// Prorated amount, rounded to céntimos.
    pub amount: Decimal,
}

/// Runs resolve → intersect → decompose → compute and records each stage.
///
/// # Example
///
/// ```
/// use beneficios_engine::calculation::{ProrationInput, calculate_proration};
/// use beneficios_engine::models::{EmploymentInterval, RegimeFactor, WindowScheme};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let end = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
/// let input = ProrationInput {
///     base: Decimal::from(1800),
///     interval: EmploymentInterval::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), end).unwrap(),
///     reference: end,
///     scheme: WindowScheme::SemiannualCalendar,
///     factor: RegimeFactor::Full,
/// };
///
/// let result = calculate_proration(&input).unwrap();
/// assert_eq!(result.value.period_label, "Ene-Jun 2025");
/// assert_eq!(result.value.amount, Decimal::new(37000, 2));
/// assert_eq!(result.steps.len(), 4);
/// ```
pub fn calculate_proration(input: &ProrationInput) -> EngineResult<Audited<ProrationResult>> {
    let window = resolve_window(input.reference, input.scheme);
    let effective = intersect(&input.interval, &window);
    let decomposition = decompose(&effective);
    let raw = compute_proration(input.base, decomposition, input.factor)?;
    let amount = round_currency(raw);

    let steps = vec![
        AuditStep {
            step_number: 1,
            rule_id: "window_resolution".to_string(),
            rule_name: "Calendar Window Resolution".to_string(),
            clause_ref: scheme_clause(input.scheme).to_string(),
            input: serde_json::json!({
                "reference": input.reference.to_string(),
                "scheme": input.scheme,
            }),
            output: serde_json::json!({
                "start": window.start.to_string(),
                "end": window.end.to_string(),
                "label": window.label,
            }),
            reasoning: format!("{} falls in window {}", input.reference, window.label),
        },
        AuditStep {
            step_number: 2,
            rule_id: "period_intersection".to_string(),
            rule_name: "Period Intersection".to_string(),
            clause_ref: scheme_clause(input.scheme).to_string(),
            input: serde_json::json!({
                "employment_start": input.interval.start().to_string(),
                "employment_end": input.interval.end().to_string(),
            }),
            output: serde_json::json!({
                "effective": effective,
                "days": effective.days(),
            }),
            reasoning: if effective.is_empty() {
                "Employment does not overlap the window; no computable time".to_string()
            } else {
                format!("Computable period {}", effective.label())
            },
        },
        AuditStep {
            step_number: 3,
            rule_id: "time_decomposition".to_string(),
            rule_name: "30-Day Month Decomposition".to_string(),
            clause_ref: scheme_clause(input.scheme).to_string(),
            input: serde_json::json!({ "total_days": effective.days() }),
            output: serde_json::json!({
                "whole_months": decomposition.whole_months,
                "remainder_days": decomposition.remainder_days,
            }),
            reasoning: format!(
                "{} days = {} months × 30 + {} days",
                effective.days(),
                decomposition.whole_months,
                decomposition.remainder_days
            ),
        },
        AuditStep {
            step_number: 4,
            rule_id: "proportional_amount".to_string(),
            rule_name: "Proportional Amount".to_string(),
            clause_ref: scheme_clause(input.scheme).to_string(),
            input: serde_json::json!({
                "base": input.base.normalize().to_string(),
                "factor": input.factor.multiplier().normalize().to_string(),
            }),
            output: serde_json::json!({
                "raw_amount": raw.normalize().to_string(),
                "amount": amount.to_string(),
            }),
            reasoning: format!(
                "(S/ {} / 12 × {} + S/ {} / 360 × {}) × {} = S/ {}",
                input.base.normalize(),
                decomposition.whole_months,
                input.base.normalize(),
                decomposition.remainder_days,
                input.factor.multiplier().normalize(),
                amount
            ),
        },
    ];

    Ok(Audited::new(
        ProrationResult {
            period_label: window.label.clone(),
            effective_period: effective.label(),
            whole_months: decomposition.whole_months,
            remainder_days: decomposition.remainder_days,
            amount,
        },
        steps,
    ))
}

fn scheme_clause(scheme: WindowScheme) -> &'static str {
    match scheme {
        WindowScheme::SemiannualCalendar => "Ley 27735",
        WindowScheme::SemiannualOffset => "D.S. 001-97-TR",
    }
}
