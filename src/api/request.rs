//! Request types for the engine API.
//!
//! Most endpoints deserialize the calculator input directly. The proration
//! endpoint takes raw dates and a regime, which are resolved into a
//! [`ProrationInput`] here.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::ProrationInput;
use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::models::{Benefit, EmploymentInterval, LaborRegime, RegimeFactor, WindowScheme};

/// Request body for the `/proration` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProrationRequest {
    /// Computable remuneration.
    pub base: Decimal,
    /// First day of employment.
    pub start_date: NaiveDate,
    /// Last day of employment, or the cut-off date.
    pub end_date: NaiveDate,
    /// Which semester cutoffs apply.
    pub scheme: WindowScheme,
    /// Date that selects the window. Defaults to `end_date`.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
    /// Labour regime, used to look up the factor.
    #[serde(default)]
    pub regime: LaborRegime,
    /// Benefit whose factor applies. Defaults to gratificación for the
    /// calendar scheme and CTS for the offset scheme.
    #[serde(default)]
    pub benefit: Option<Benefit>,
    /// Explicit factor, bypassing the regime lookup.
    #[serde(default)]
    pub factor: Option<RegimeFactor>,
}

impl ProrationRequest {
    /// Resolves the request against the configuration.
    pub fn into_input(self, config: &ConfigLoader) -> EngineResult<ProrationInput> {
        let interval = EmploymentInterval::new(self.start_date, self.end_date)?;
        let factor = match self.factor {
            Some(factor) => factor,
            None => {
                let benefit = self.benefit.unwrap_or(match self.scheme {
                    WindowScheme::SemiannualCalendar => Benefit::Gratificacion,
                    WindowScheme::SemiannualOffset => Benefit::Cts,
                });
                config.regime_factor(self.regime, benefit)?
            }
        };

        Ok(ProrationInput {
            base: self.base,
            interval,
            reference: self.reference_date.unwrap_or(self.end_date),
            scheme: self.scheme,
            factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn load_config() -> ConfigLoader {
        ConfigLoader::load("./config/peru").expect("Failed to load config")
    }

    #[test]
    fn test_proration_request_deserialization() {
        let json = r#"{
            "base": "1800",
            "start_date": "2025-01-01",
            "end_date": "2025-03-15",
            "scheme": "semiannual_calendar"
        }"#;

        let request: ProrationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.regime, LaborRegime::General);
        assert!(request.reference_date.is_none());
        assert!(request.benefit.is_none());
    }

    #[test]
    fn test_benefit_defaults_by_scheme() {
        let config = load_config();
        let request = ProrationRequest {
            base: Decimal::from(1800),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 3, 15),
            scheme: WindowScheme::SemiannualCalendar,
            reference_date: None,
            regime: LaborRegime::Hogar,
            benefit: None,
            factor: None,
        };

        // Hogar: gratificación is half, CTS is full
        let calendar = request.clone().into_input(&config).unwrap();
        assert_eq!(calendar.factor, RegimeFactor::Half);
        assert_eq!(calendar.reference, date(2025, 3, 15));

        let offset = ProrationRequest {
            scheme: WindowScheme::SemiannualOffset,
            ..request
        }
        .into_input(&config)
        .unwrap();
        assert_eq!(offset.factor, RegimeFactor::Full);
    }

    #[test]
    fn test_explicit_factor_and_reference() {
        let config = load_config();
        let request = ProrationRequest {
            base: Decimal::from(1800),
            start_date: date(2025, 8, 1),
            end_date: date(2025, 12, 31),
            scheme: WindowScheme::SemiannualCalendar,
            reference_date: Some(date(2025, 3, 1)),
            regime: LaborRegime::Micro,
            benefit: None,
            factor: Some(RegimeFactor::Full),
        };

        let input = request.into_input(&config).unwrap();
        assert_eq!(input.factor, RegimeFactor::Full);
        assert_eq!(input.reference, date(2025, 3, 1));
    }

    #[test]
    fn test_reversed_dates_rejected() {
        let config = load_config();
        let request = ProrationRequest {
            base: Decimal::from(1800),
            start_date: date(2025, 3, 15),
            end_date: date(2025, 1, 1),
            scheme: WindowScheme::SemiannualCalendar,
            reference_date: None,
            regime: LaborRegime::General,
            benefit: None,
            factor: None,
        };

        let result = request.into_input(&config);
        assert!(matches!(result, Err(EngineError::InvalidInterval { .. })));
    }
}
