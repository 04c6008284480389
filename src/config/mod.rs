//! Configuration loading and management for the benefits and tax engine.
//!
//! This module loads the Peruvian parameter set from YAML files: labour
//! regimes, effective-dated rates (UIT, RMV, asignación familiar, TIM), tax
//! parameters, and default journal templates.
//!
//! # Example
//!
//! ```no_run
//! use beneficios_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/peru").unwrap();
//! println!("Loaded parameters: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BonusRates, DetraccionConfig, DetraccionRate, EngineConfig, EngineMetadata, FineBasis,
    GradualityConfig, IncomeTaxConfig, InfractionConfig, LaborConfig, LaborRegimeConfig,
    NrusConfig, RateConfig, RerConfig, RgConfig, RmtConfig, TaxBracket, TaxConfig,
    TaxRegimesConfig, TemplatesConfig,
};
