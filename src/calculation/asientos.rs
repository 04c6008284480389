//! Journal entries generated from templates.
//!
//! A template's debit and credit formulas are evaluated against the amounts
//! derived from a single operation amount: `base`, `igv`, `total` and
//! `costo` (half the base).

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, Audited, JournalLine, JournalTemplate};

use super::checked::{CheckedAmount, try_sum};
use super::formula;
use super::remuneration::require_non_negative;
use super::round_currency;

/// The default templates plus any custom ones, keyed by `value`.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<JournalTemplate>,
}

impl TemplateCatalog {
    /// Builds a catalog from the defaults and custom templates.
    ///
    /// # Errors
    ///
    /// `DuplicateTemplate` when a custom template repeats the name
    /// (case-insensitive) or value of a template already in the catalog.
    pub fn with_custom(defaults: &[JournalTemplate], custom: Vec<JournalTemplate>) -> EngineResult<Self> {
        let mut templates = defaults.to_vec();
        for template in custom {
            if template.name.trim().is_empty() || template.value.trim().is_empty() {
                return Err(EngineError::invalid_input(
                    "custom_templates",
                    "name and value are required",
                ));
            }
            let name = template.name.to_lowercase();
            if let Some(existing) = templates
                .iter()
                .find(|t| t.name.to_lowercase() == name || t.value == template.value)
            {
                let clash = if existing.value == template.value {
                    template.value
                } else {
                    template.name
                };
                return Err(EngineError::DuplicateTemplate { name: clash });
            }
            templates.push(template);
        }
        Ok(Self { templates })
    }

    /// Looks up a template by value.
    pub fn get(&self, value: &str) -> EngineResult<&JournalTemplate> {
        self.templates
            .iter()
            .find(|t| t.value == value)
            .ok_or_else(|| EngineError::TemplateNotFound {
                value: value.to_string(),
            })
    }

    /// All templates, defaults first.
    pub fn templates(&self) -> &[JournalTemplate] {
        &self.templates
    }
}

/// Whether the operation amount includes IGV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountType {
    /// The amount is the total, IGV included.
    #[default]
    ConIgv,
    /// The amount is the base.
    SinIgv,
}

/// Input to [`generate_asiento`].
#[derive(Debug, Clone, Deserialize)]
pub struct AsientoInput {
    /// Template value, e.g. `venta_mercaderia`.
    pub template: String,
    /// Operation amount.
    pub amount: Decimal,
    /// Whether `amount` includes IGV.
    #[serde(default)]
    pub amount_type: AmountType,
    /// Templates to add to the defaults for this request.
    #[serde(default)]
    pub custom_templates: Vec<JournalTemplate>,
}

/// A generated journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsientoResult {
    /// Template value.
    pub template: String,
    /// Template display name.
    pub name: String,
    /// Amounts available to the formulas, rounded.
    pub variables: BTreeMap<String, Decimal>,
    /// Evaluated lines.
    pub lines: Vec<JournalLine>,
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub balanced: bool,
}

/// Derives `base`, `igv`, `total` and `costo` from an operation amount.
pub fn template_variables(
    amount: Decimal,
    amount_type: AmountType,
    igv_rate: Decimal,
) -> EngineResult<HashMap<String, Decimal>> {
    let (base, igv, total) = match amount_type {
        AmountType::SinIgv => {
            let igv = amount.try_mul(igv_rate)?;
            (amount, igv, amount.try_add(igv)?)
        }
        AmountType::ConIgv => {
            let base = amount.try_div(Decimal::ONE.try_add(igv_rate)?)?;
            (base, amount - base, amount)
        }
    };
    Ok(HashMap::from([
        ("base".to_string(), base),
        ("igv".to_string(), igv),
        ("total".to_string(), total),
        ("costo".to_string(), base / Decimal::TWO),
    ]))
}

/// Evaluates a template into journal lines.
///
/// # Example
///
/// ```no_run
/// use beneficios_engine::calculation::{AmountType, AsientoInput, generate_asiento};
/// use beneficios_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::load("./config/peru").unwrap();
/// let input = AsientoInput {
///     template: "compra_mercaderia".to_string(),
///     amount: Decimal::from(1000),
///     amount_type: AmountType::SinIgv,
///     custom_templates: Vec::new(),
/// };
///
/// let result = generate_asiento(&input, &config).unwrap();
/// assert!(result.value.balanced);
/// ```
pub fn generate_asiento(input: &AsientoInput, config: &ConfigLoader) -> EngineResult<Audited<AsientoResult>> {
    require_non_negative("amount", input.amount)?;
    let catalog = TemplateCatalog::with_custom(config.templates(), input.custom_templates.clone())?;
    let template = catalog.get(&input.template)?;

    let variables = template_variables(input.amount, input.amount_type, config.tax().igv_rate)?;

    let mut lines = Vec::with_capacity(template.entries.len());
    for entry in &template.entries {
        lines.push(JournalLine {
            account: entry.account.clone(),
            description: entry.description.clone(),
            debit: round_currency(formula::evaluate(&entry.debit, &variables)?),
            credit: round_currency(formula::evaluate(&entry.credit, &variables)?),
        });
    }

    let total_debit = try_sum(lines.iter().map(|l| l.debit))?;
    let total_credit = try_sum(lines.iter().map(|l| l.credit))?;
    let balanced = total_debit == total_credit;

    let rounded: BTreeMap<String, Decimal> = variables
        .iter()
        .map(|(k, v)| (k.clone(), round_currency(*v)))
        .collect();

    let step = AuditStep {
        step_number: 1,
        rule_id: "asiento_template".to_string(),
        rule_name: "Journal Entry From Template".to_string(),
        clause_ref: "PCGE 2019".to_string(),
        input: serde_json::json!({
            "template": template.value,
            "amount": input.amount.normalize().to_string(),
            "amount_type": input.amount_type,
        }),
        output: serde_json::json!({
            "lines": lines.len(),
            "total_debit": total_debit.to_string(),
            "total_credit": total_credit.to_string(),
            "balanced": balanced,
        }),
        reasoning: format!(
            "{}: debe S/ {} / haber S/ {}",
            template.name, total_debit, total_credit
        ),
    };

    let mut audited = Audited::new(
        AsientoResult {
            template: template.value.clone(),
            name: template.name.clone(),
            variables: rounded,
            lines,
            total_debit,
            total_credit,
            balanced,
        },
        vec![step],
    );
    if !balanced {
        audited.warnings.push(AuditWarning {
            code: "UNBALANCED_ENTRY".to_string(),
            message: "El asiento está descuadrado. Revisa las fórmulas de la plantilla.".to_string(),
            severity: "warning".to_string(),
        });
    }
    Ok(audited)
}
