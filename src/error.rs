//! Error types for the benefits and tax engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing labour benefits
//! and tax figures.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the engine.
///
/// All fallible operations in the engine return this error type, making it
/// easy to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use beneficios_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Labour regime was not found in the configuration.
    #[error("Labour regime not found: {regime}")]
    RegimeNotFound {
        /// The regime code that was not found.
        regime: String,
    },

    /// No UIT value is configured for the requested fiscal year.
    #[error("UIT not configured for year {year}")]
    UitNotFound {
        /// The fiscal year requested.
        year: i32,
    },

    /// No effective-dated rate file covers the given date.
    #[error("No rate configuration effective on {date}")]
    RateNotFound {
        /// The date for which rates were requested.
        date: NaiveDate,
    },

    /// A date interval had its start after its end.
    #[error("Invalid interval: {start} is after {end}")]
    InvalidInterval {
        /// The start of the interval.
        start: NaiveDate,
        /// The end of the interval.
        end: NaiveDate,
    },

    /// A calculator input was out of range.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A journal template formula could not be evaluated.
    #[error("Formula error in '{formula}': {message}")]
    FormulaError {
        /// The formula text as written in the template.
        formula: String,
        /// A description of the failure.
        message: String,
    },

    /// A custom journal template clashes with an existing one.
    #[error("Template already exists: {name}")]
    DuplicateTemplate {
        /// The clashing template name or value.
        name: String,
    },

    /// A journal template value was not found in the catalog.
    #[error("Template not found: {value}")]
    TemplateNotFound {
        /// The template value that was requested.
        value: String,
    },

    /// The tax infraction code is not configured.
    #[error("Unknown infraction: {code}")]
    UnknownInfraction {
        /// The infraction code requested.
        code: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
