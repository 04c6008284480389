//! Configuration types for the benefits and tax engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{Benefit, JournalTemplate, LaborRegime, RegimeFactor};

/// Metadata about the parameter set.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineMetadata {
    /// Identifier of the parameter set (e.g., "PE-2026").
    pub code: String,
    /// The human-readable name of the parameter set.
    pub name: String,
    /// The version or effective date of the parameters.
    pub version: String,
    /// URL to the official source of the parameters.
    pub source_url: String,
}

/// How a labour regime treats each statutory benefit.
#[derive(Debug, Clone, Deserialize)]
pub struct LaborRegimeConfig {
    /// The human-readable name of the regime.
    pub name: String,
    /// Reference to the law establishing the regime.
    pub clause: String,
    /// Factor applied to CTS.
    pub cts: RegimeFactor,
    /// Factor applied to gratificaciones.
    pub gratificacion: RegimeFactor,
    /// Factor applied to vacaciones.
    pub vacaciones: RegimeFactor,
    /// Informational notes shown when a benefit is not separately payable.
    #[serde(default)]
    pub notes: HashMap<Benefit, String>,
}

impl LaborRegimeConfig {
    /// Returns the factor for a benefit.
    pub fn factor(&self, benefit: Benefit) -> RegimeFactor {
        match benefit {
            Benefit::Cts => self.cts,
            Benefit::Gratificacion => self.gratificacion,
            Benefit::Vacaciones => self.vacaciones,
        }
    }
}

/// Extraordinary bonus rates paid on gratificaciones (Ley 30334).
#[derive(Debug, Clone, Deserialize)]
pub struct BonusRates {
    /// Rate when the worker is insured with EsSalud.
    pub essalud: Decimal,
    /// Rate when the worker is insured with an EPS.
    pub eps: Decimal,
}

/// Labour configuration from labor.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct LaborConfig {
    /// Map of regime to its benefit factors.
    pub regimes: HashMap<LaborRegime, LaborRegimeConfig>,
    /// Gratificación bonus rates.
    pub gratificacion_bonus: BonusRates,
}

/// Effective-dated rates (UIT, minimum wage, family allowance, TIM).
#[derive(Debug, Clone, Deserialize)]
pub struct RateConfig {
    /// The effective date for these rates.
    pub effective_date: NaiveDate,
    /// Unidad Impositiva Tributaria.
    pub uit: Decimal,
    /// Remuneración mínima vital.
    pub minimum_wage: Decimal,
    /// Asignación familiar (10% of the minimum wage).
    pub family_allowance: Decimal,
    /// Monthly late-payment interest rate (TIM), as a fraction.
    pub tim_monthly: Decimal,
}

/// One entry in the detracción rate catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct DetraccionRate {
    /// Percentage (e.g. 12 for 12%).
    pub rate: Decimal,
    /// Goods or services the rate applies to.
    pub label: String,
}

/// Detracción (SPOT) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DetraccionConfig {
    /// Operations must exceed this amount to be subject.
    pub threshold: Decimal,
    /// Catalog of common percentages.
    pub rates: Vec<DetraccionRate>,
}

/// A progressive income-tax bracket.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxBracket {
    /// Upper bound of the bracket in UIT; `None` for the top bracket.
    pub up_to_uit: Option<Decimal>,
    /// Marginal rate, as a fraction.
    pub rate: Decimal,
    /// Display label.
    pub label: String,
}

/// Income-tax configuration for work income (4ta and 5ta categoría).
#[derive(Debug, Clone, Deserialize)]
pub struct IncomeTaxConfig {
    /// Fixed deduction, in UIT.
    pub personal_deduction_uit: Decimal,
    /// Deduction rate on 4ta categoría fees.
    pub fees_deduction_rate: Decimal,
    /// Cap on the fees deduction, in UIT.
    pub fees_deduction_cap_uit: Decimal,
    /// Extraordinary bonus rate added to projected gratificaciones.
    pub gratificacion_bonus_rate: Decimal,
    /// Progressive brackets, lowest first.
    pub brackets: Vec<TaxBracket>,
}

/// Nuevo RUS limits and fees.
#[derive(Debug, Clone, Deserialize)]
pub struct NrusConfig {
    /// Maximum annual income or purchases.
    pub max_income: Decimal,
    /// Maximum fixed-asset value.
    pub max_assets: Decimal,
    /// Monthly average at or below which the low fee applies.
    pub fee_threshold: Decimal,
    /// Low monthly fee.
    pub low_monthly_fee: Decimal,
    /// High monthly fee.
    pub high_monthly_fee: Decimal,
}

/// Régimen Especial de Renta limits and rate.
#[derive(Debug, Clone, Deserialize)]
pub struct RerConfig {
    /// Maximum annual income or purchases.
    pub max_income: Decimal,
    /// Maximum fixed-asset value.
    pub max_assets: Decimal,
    /// Maximum workers per shift.
    pub max_workers_per_shift: u32,
    /// Income-tax rate on net income.
    pub rate: Decimal,
}

/// Régimen MYPE Tributario limits and rates.
#[derive(Debug, Clone, Deserialize)]
pub struct RmtConfig {
    /// Maximum annual income, in UIT.
    pub max_income_uit: Decimal,
    /// Profit tier boundary, in UIT.
    pub tier_uit: Decimal,
    /// Rate on profit up to the tier.
    pub low_rate: Decimal,
    /// Rate on profit above the tier.
    pub high_rate: Decimal,
}

/// Régimen General rates.
#[derive(Debug, Clone, Deserialize)]
pub struct RgConfig {
    /// Income-tax rate on profit.
    pub rate: Decimal,
    /// Asset value exempt from ITAN.
    pub itan_exempt_assets: Decimal,
    /// ITAN rate on assets above the exemption.
    pub itan_rate: Decimal,
}

/// Tax-regime simulation parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxRegimesConfig {
    /// Nuevo RUS.
    pub nrus: NrusConfig,
    /// Régimen Especial.
    pub rer: RerConfig,
    /// Régimen MYPE Tributario.
    pub rmt: RmtConfig,
    /// Régimen General.
    pub rg: RgConfig,
}

/// How the base fine for an infraction is computed.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FineBasis {
    /// A percentage of annual net income.
    NetIncome {
        /// Rate, as a fraction.
        rate: Decimal,
    },
    /// A percentage of the omitted tax.
    OmittedTax {
        /// Rate, as a fraction.
        rate: Decimal,
    },
    /// A percentage of net income bounded in UIT once income exceeds a
    /// threshold; a flat UIT amount below it.
    BoundedNetIncome {
        /// Rate, as a fraction.
        rate: Decimal,
        /// Income threshold, in UIT.
        threshold_uit: Decimal,
        /// Minimum fine, in UIT (also the flat fine below the threshold).
        floor_uit: Decimal,
        /// Maximum fine, in UIT.
        cap_uit: Decimal,
    },
}

/// Discount rates under the gradualidad regime.
#[derive(Debug, Clone, Deserialize)]
pub struct GradualityConfig {
    /// Discount when the infraction is cured voluntarily.
    pub voluntary: Decimal,
    /// Discount when the cure is induced by SUNAT.
    pub induced: Decimal,
}

/// A tax infraction from the Código Tributario.
#[derive(Debug, Clone, Deserialize)]
pub struct InfractionConfig {
    /// Description of the infraction.
    pub title: String,
    /// Article reference.
    pub clause: String,
    /// Base fine rule.
    pub basis: FineBasis,
    /// Gradualidad discounts.
    pub graduality: GradualityConfig,
}

/// Tax configuration from tax.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxConfig {
    /// IGV rate, as a fraction (0.18).
    pub igv_rate: Decimal,
    /// Detracción configuration.
    pub detraccion: DetraccionConfig,
    /// Work-income tax configuration.
    pub income_tax: IncomeTaxConfig,
    /// Tax-regime simulation parameters.
    pub tax_regimes: TaxRegimesConfig,
    /// Infractions keyed by code (e.g. "176_1").
    pub infractions: BTreeMap<String, InfractionConfig>,
}

/// Journal templates file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesConfig {
    /// Default templates.
    pub templates: Vec<JournalTemplate>,
}

/// The complete configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    metadata: EngineMetadata,
    labor: LaborConfig,
    /// Rate configurations by effective date (sorted oldest first).
    rates: Vec<RateConfig>,
    tax: TaxConfig,
    templates: Vec<JournalTemplate>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        metadata: EngineMetadata,
        labor: LaborConfig,
        rates: Vec<RateConfig>,
        tax: TaxConfig,
        templates: Vec<JournalTemplate>,
    ) -> Self {
        let mut sorted_rates = rates;
        sorted_rates.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            metadata,
            labor,
            rates: sorted_rates,
            tax,
            templates,
        }
    }

    /// Returns the metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    /// Returns the labour configuration.
    pub fn labor(&self) -> &LaborConfig {
        &self.labor
    }

    /// Returns all rate configurations, oldest first.
    pub fn rates(&self) -> &[RateConfig] {
        &self.rates
    }

    /// Returns the tax configuration.
    pub fn tax(&self) -> &TaxConfig {
        &self.tax
    }

    /// Returns the default journal templates.
    pub fn templates(&self) -> &[JournalTemplate] {
        &self.templates
    }
}
