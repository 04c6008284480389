//! Journal-entry template models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of a journal template; debit and credit are formulas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// Account code from the Plan Contable General Empresarial (e.g. "40111").
    pub account: String,
    /// Account description.
    pub description: String,
    /// Debit formula, e.g. `{{total}}` or `0`.
    pub debit: String,
    /// Credit formula.
    pub credit: String,
}

/// A named journal-entry template.
///
/// # Example
///
/// ```
/// use beneficios_engine::models::{JournalTemplate, TemplateEntry};
///
/// let template = JournalTemplate {
///     name: "Pago de Servicios".to_string(),
///     value: "pago_servicios".to_string(),
///     entries: vec![TemplateEntry {
///         account: "6361".to_string(),
///         description: "Energía eléctrica".to_string(),
///         debit: "{{base}}".to_string(),
///         credit: "0".to_string(),
///     }],
/// };
/// assert_eq!(template.entries.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTemplate {
    /// Display name; unique case-insensitively within a catalog.
    pub name: String,
    /// Machine identifier; unique within a catalog.
    pub value: String,
    /// Template lines.
    pub entries: Vec<TemplateEntry>,
}

/// A journal line with its formulas evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account code.
    pub account: String,
    /// Account description.
    pub description: String,
    /// Evaluated debit amount.
    pub debit: Decimal,
    /// Evaluated credit amount.
    pub credit: Decimal,
}
