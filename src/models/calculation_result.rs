//! Calculation result models.
//!
//! This module contains the [`CalculationResult`] envelope returned by every
//! calculator, together with the audit trace structures that document each
//! rule applied along the way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number, starting at 1.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the legal norm behind this rule.
    pub clause_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate conditions that don't prevent calculation but that the
/// user should see, such as an operation below the detracción threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("info", "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates an informational warning.
    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: "info".to_string(),
        }
    }
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use beneficios_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// A calculator output paired with the audit steps that produced it.
///
/// Calculators number their own steps from 1; [`Audited::absorb`] renumbers
/// steps from a nested calculation so the combined trace stays sequential.
#[derive(Debug, Clone, PartialEq)]
pub struct Audited<T> {
    /// The calculator output.
    pub value: T,
    /// Steps recorded while computing `value`.
    pub steps: Vec<AuditStep>,
    /// Warnings raised while computing `value`.
    pub warnings: Vec<AuditWarning>,
}

impl<T> Audited<T> {
    /// Wraps a value with its steps and no warnings.
    pub fn new(value: T, steps: Vec<AuditStep>) -> Self {
        Self {
            value,
            steps,
            warnings: Vec::new(),
        }
    }

    /// Adds a warning.
    pub fn with_warning(mut self, warning: AuditWarning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Appends steps and warnings from a nested calculation, renumbering the
    /// steps to follow on from the ones already recorded.
    pub fn absorb<U>(&mut self, other: Audited<U>) -> U {
        let offset = self.steps.len() as u32;
        self.steps.extend(other.steps.into_iter().map(|mut step| {
            step.step_number += offset;
            step
        }));
        self.warnings.extend(other.warnings);
        other.value
    }

    /// Replaces the value, keeping the recorded steps and warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Audited<U> {
        Audited {
            value: f(self.value),
            steps: self.steps,
            warnings: self.warnings,
        }
    }

    /// Returns the number the next recorded step should carry.
    pub fn next_step(&self) -> u32 {
        self.steps.len() as u32 + 1
    }
}

/// The envelope returned for every calculation.
///
/// # Example
///
/// ```
/// use beneficios_engine::models::{AuditTrace, CalculationResult};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let result = CalculationResult {
///     calculation_id: Uuid::new_v4(),
///     timestamp: Utc::now(),
///     engine_version: "0.1.0".to_string(),
///     calculator: "cts".to_string(),
///     result: serde_json::json!({"amount": "370.00"}),
///     audit_trace: AuditTrace {
///         steps: vec![],
///         warnings: vec![],
///         duration_us: 0,
///     },
/// };
/// assert_eq!(result.calculator, "cts");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult<T> {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Which calculator produced the result (e.g. "cts").
    pub calculator: String,
    /// The calculator-specific output.
    pub result: T,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl<T> CalculationResult<T> {
    /// Builds the envelope from an audited calculator output.
    pub fn from_audited(calculator: &str, audited: Audited<T>, duration_us: u64) -> Self {
        Self {
            calculation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            calculator: calculator.to_string(),
            result: audited.value,
            audit_trace: AuditTrace {
                steps: audited.steps,
                warnings: audited.warnings,
                duration_us,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(number: u32, rule_id: &str) -> AuditStep {
        AuditStep {
            step_number: number,
            rule_id: rule_id.to_string(),
            rule_name: rule_id.to_string(),
            clause_ref: "-".to_string(),
            input: serde_json::json!({}),
            output: serde_json::json!({}),
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_absorb_renumbers_nested_steps() {
        let mut outer = Audited::new((), vec![step(1, "a"), step(2, "b")]);
        let inner = Audited::new(42, vec![step(1, "c"), step(2, "d")]);

        let value = outer.absorb(inner);

        assert_eq!(value, 42);
        let numbers: Vec<u32> = outer.steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(outer.steps[2].rule_id, "c");
    }

    #[test]
    fn test_absorb_carries_warnings() {
        let mut outer = Audited::new((), vec![]);
        let inner = Audited::new((), vec![]).with_warning(AuditWarning::info("X", "note"));

        outer.absorb(inner);

        assert_eq!(outer.warnings.len(), 1);
        assert_eq!(outer.warnings[0].severity, "info");
    }

    #[test]
    fn test_map_keeps_trace() {
        let audited = Audited::new(2, vec![step(1, "a")]).with_warning(AuditWarning::info("W", "w"));
        let mapped = audited.map(|v| v * 10);
        assert_eq!(mapped.value, 20);
        assert_eq!(mapped.steps.len(), 1);
        assert_eq!(mapped.warnings.len(), 1);
    }

    #[test]
    fn test_next_step_follows_recorded_steps() {
        let audited = Audited::new((), vec![step(1, "a")]);
        assert_eq!(audited.next_step(), 2);
    }

    #[test]
    fn test_envelope_from_audited() {
        let audited = Audited::new("ok", vec![step(1, "a")]);
        let result = CalculationResult::from_audited("igv", audited, 15);

        assert_eq!(result.calculator, "igv");
        assert_eq!(result.result, "ok");
        assert_eq!(result.audit_trace.steps.len(), 1);
        assert_eq!(result.audit_trace.duration_us, 15);
        assert_eq!(result.engine_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_audit_step_serialization() {
        let json = serde_json::to_value(step(3, "window_resolution")).unwrap();
        assert_eq!(json["step_number"], 3);
        assert_eq!(json["rule_id"], "window_resolution");
    }
}
