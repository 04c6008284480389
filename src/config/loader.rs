//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the Peruvian
//! labour and tax parameter set from YAML files.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::{Benefit, HealthInsurance, JournalTemplate, LaborRegime, RegimeFactor};

use super::types::{
    EngineConfig, EngineMetadata, LaborConfig, LaborRegimeConfig, RateConfig, TaxConfig,
    TemplatesConfig,
};

/// Loads and provides access to the engine configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query regimes, effective-dated rates, and tax
/// parameters.
///
/// # Directory Structure
///
/// ```text
/// config/peru/
/// ├── engine.yaml      # Parameter-set metadata
/// ├── labor.yaml       # Labour regimes and gratificación bonus
/// ├── tax.yaml         # IGV, detracciones, renta, regímenes, multas
/// ├── templates.yaml   # Default journal-entry templates
/// └── rates/
///     └── 2026-01-01.yaml  # UIT, RMV, asignación familiar, TIM
/// ```
///
/// # Example
///
/// ```no_run
/// use beneficios_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/peru").unwrap();
/// let uit = loader.uit_for_year(2026).unwrap();
/// println!("UIT 2026: S/ {}", uit);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any required file is missing, contains invalid
    /// YAML, or lacks a required field.
    ///
    /// ```no_run
    /// use beneficios_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/peru")?;
    /// # Ok::<(), beneficios_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<EngineMetadata>(&path.join("engine.yaml"))?;
        let labor = Self::load_yaml::<LaborConfig>(&path.join("labor.yaml"))?;
        let tax = Self::load_yaml::<TaxConfig>(&path.join("tax.yaml"))?;
        let templates = Self::load_yaml::<TemplatesConfig>(&path.join("templates.yaml"))?;
        let rates = Self::load_rates(&path.join("rates"))?;

        let config = EngineConfig::new(metadata, labor, rates, tax, templates.templates);

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rate files from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<RateConfig>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut rates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                rates.push(Self::load_yaml::<RateConfig>(&path)?);
            }
        }

        if rates.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(rates)
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the parameter-set metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        self.config.metadata()
    }

    /// Returns the configuration of a labour regime.
    pub fn regime(&self, regime: LaborRegime) -> EngineResult<&LaborRegimeConfig> {
        self.config
            .labor()
            .regimes
            .get(&regime)
            .ok_or_else(|| EngineError::RegimeNotFound {
                regime: regime.to_string(),
            })
    }

    /// Returns the factor a regime applies to a benefit.
    ///
    /// ```no_run
    /// use beneficios_engine::config::ConfigLoader;
    /// use beneficios_engine::models::{Benefit, LaborRegime, RegimeFactor};
    ///
    /// let loader = ConfigLoader::load("./config/peru")?;
    /// let factor = loader.regime_factor(LaborRegime::MypePequena, Benefit::Cts)?;
    /// assert_eq!(factor, RegimeFactor::Half);
    /// # Ok::<(), beneficios_engine::error::EngineError>(())
    /// ```
    pub fn regime_factor(&self, regime: LaborRegime, benefit: Benefit) -> EngineResult<RegimeFactor> {
        Ok(self.regime(regime)?.factor(benefit))
    }

    /// Returns the informational note a regime attaches to a benefit, if any.
    pub fn regime_note(&self, regime: LaborRegime, benefit: Benefit) -> Option<&str> {
        self.config
            .labor()
            .regimes
            .get(&regime)
            .and_then(|r| r.notes.get(&benefit))
            .map(String::as_str)
    }

    /// Returns the gratificación bonus rate for a health insurer.
    pub fn gratificacion_bonus_rate(&self, insurance: HealthInsurance) -> Decimal {
        let bonus = &self.config.labor().gratificacion_bonus;
        match insurance {
            HealthInsurance::Essalud => bonus.essalud,
            HealthInsurance::Eps => bonus.eps,
        }
    }

    /// Returns the rate configuration in effect on a date.
    ///
    /// The most recent file whose effective date is on or before `date` wins.
    pub fn rates_for(&self, date: NaiveDate) -> EngineResult<&RateConfig> {
        self.config
            .rates()
            .iter()
            .rev()
            .find(|rc| rc.effective_date <= date)
            .ok_or(EngineError::RateNotFound { date })
    }

    /// Returns the UIT for a fiscal year.
    ///
    /// The UIT is fixed yearly, so a rate file effective within that year must
    /// exist; the previous year's value is never carried forward.
    pub fn uit_for_year(&self, year: i32) -> EngineResult<Decimal> {
        let january_first =
            NaiveDate::from_ymd_opt(year, 1, 1).ok_or(EngineError::UitNotFound { year })?;

        match self.rates_for(january_first) {
            Ok(rc) if rc.effective_date.year() == year => Ok(rc.uit),
            _ => Err(EngineError::UitNotFound { year }),
        }
    }

    /// Returns the tax configuration.
    pub fn tax(&self) -> &TaxConfig {
        self.config.tax()
    }

    /// Returns the default journal templates.
    pub fn templates(&self) -> &[JournalTemplate] {
        self.config.templates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/peru"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.metadata().code, "PE-2026");
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_regime_factors_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let cases = [
            (LaborRegime::General, Benefit::Cts, RegimeFactor::Full),
            (LaborRegime::Hogar, Benefit::Gratificacion, RegimeFactor::Half),
            (LaborRegime::Hogar, Benefit::Vacaciones, RegimeFactor::Full),
            (LaborRegime::MypePequena, Benefit::Cts, RegimeFactor::Half),
            (LaborRegime::MypePequena, Benefit::Vacaciones, RegimeFactor::Half),
            (LaborRegime::Micro, Benefit::Cts, RegimeFactor::None),
            (LaborRegime::Micro, Benefit::Gratificacion, RegimeFactor::None),
            (LaborRegime::Agrario, Benefit::Cts, RegimeFactor::None),
        ];

        for (regime, benefit, expected) in cases {
            assert_eq!(
                loader.regime_factor(regime, benefit).unwrap(),
                expected,
                "{:?} / {:?}",
                regime,
                benefit
            );
        }
    }

    #[test]
    fn test_agrarian_notes_present() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let note = loader.regime_note(LaborRegime::Agrario, Benefit::Cts).unwrap();
        assert!(note.contains("31110"));
        assert!(loader.regime_note(LaborRegime::General, Benefit::Cts).is_none());
    }

    #[test]
    fn test_gratificacion_bonus_rates() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        assert_eq!(
            loader.gratificacion_bonus_rate(HealthInsurance::Essalud),
            dec("0.09")
        );
        assert_eq!(
            loader.gratificacion_bonus_rate(HealthInsurance::Eps),
            dec("0.0675")
        );
    }

    #[test]
    fn test_uit_by_year() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let cases = [
            (2021, "4400"),
            (2022, "4600"),
            (2023, "4950"),
            (2024, "5150"),
            (2025, "5350"),
            (2026, "5500"),
        ];

        for (year, expected) in cases {
            assert_eq!(loader.uit_for_year(year).unwrap(), dec(expected), "{}", year);
        }
    }

    #[test]
    fn test_uit_missing_year_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        for year in [2019, 2030] {
            match loader.uit_for_year(year) {
                Err(EngineError::UitNotFound { year: y }) => assert_eq!(y, year),
                other => panic!("Expected UitNotFound error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_family_allowance_changes_mid_2022() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        assert_eq!(
            loader.rates_for(date(2022, 4, 30)).unwrap().family_allowance,
            dec("93.00")
        );
        assert_eq!(
            loader.rates_for(date(2022, 5, 1)).unwrap().family_allowance,
            dec("102.50")
        );
        assert_eq!(
            loader.rates_for(date(2025, 6, 30)).unwrap().family_allowance,
            dec("113.00")
        );
    }

    #[test]
    fn test_rate_not_found_for_date_before_effective() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let before = date(2020, 1, 1);
        match loader.rates_for(before) {
            Err(EngineError::RateNotFound { date: d }) => assert_eq!(d, before),
            _ => panic!("Expected RateNotFound error"),
        }
    }

    #[test]
    fn test_tax_parameters_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let tax = loader.tax();

        assert_eq!(tax.igv_rate, dec("0.18"));
        assert_eq!(tax.detraccion.threshold, dec("700"));
        assert_eq!(tax.income_tax.brackets.len(), 5);
        assert!(tax.income_tax.brackets.last().unwrap().up_to_uit.is_none());
        assert!(tax.infractions.contains_key("176_1"));
        assert!(tax.infractions.contains_key("178_1"));
    }

    #[test]
    fn test_default_templates_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let values: Vec<&str> = loader.templates().iter().map(|t| t.value.as_str()).collect();
        assert!(values.contains(&"venta_mercaderia"));
        assert!(values.contains(&"compra_mercaderia"));
    }
}
