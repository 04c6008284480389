//! Response types for the engine API.
//!
//! This module defines the error body returned by every endpoint and the
//! mapping from engine errors to HTTP status codes.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Maps a JSON extractor rejection. Missing fields are validation
    /// errors; everything else is malformed input.
    pub fn from_rejection(rejection: &JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let body_text = err.body_text();
                if body_text.contains("missing field") {
                    Self::validation_error(body_text)
                } else {
                    Self::malformed_json(body_text)
                }
            }
            JsonRejection::JsonSyntaxError(err) => {
                Self::malformed_json(format!("Invalid JSON syntax: {}", err))
            }
            JsonRejection::MissingJsonContentType(_) => {
                Self::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
            }
            _ => Self::malformed_json("Failed to parse request body"),
        }
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

fn bad_request(error: ApiError) -> ApiErrorResponse {
    ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
}

fn config_error(message: &str, details: String) -> ApiErrorResponse {
    ApiErrorResponse {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        error: ApiError::with_details("CONFIG_ERROR", message, details),
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { path } => config_error(
                "Configuration error",
                format!("Configuration file not found: {}", path),
            ),
            EngineError::ConfigParseError { path, message } => config_error(
                "Configuration parse error",
                format!("Failed to parse {}: {}", path, message),
            ),
            EngineError::RegimeNotFound { regime } => config_error(
                "Configuration error",
                format!("Labour regime '{}' is not configured", regime),
            ),
            EngineError::RateNotFound { date } => bad_request(ApiError::with_details(
                "RATE_NOT_FOUND",
                message,
                format!("No rate file is effective on or before {}", date),
            )),
            EngineError::UitNotFound { year } => bad_request(ApiError::with_details(
                "UIT_NOT_FOUND",
                message,
                format!("Provide a UIT override or a year with a configured UIT (got {})", year),
            )),
            EngineError::InvalidInterval { .. } => {
                bad_request(ApiError::new("INVALID_INTERVAL", message))
            }
            EngineError::InvalidInput { .. } => bad_request(ApiError::new("INVALID_INPUT", message)),
            EngineError::FormulaError { formula, .. } => bad_request(ApiError::with_details(
                "FORMULA_ERROR",
                message,
                formula,
            )),
            EngineError::DuplicateTemplate { .. } => {
                bad_request(ApiError::new("DUPLICATE_TEMPLATE", message))
            }
            EngineError::TemplateNotFound { .. } => {
                bad_request(ApiError::new("TEMPLATE_NOT_FOUND", message))
            }
            EngineError::UnknownInfraction { .. } => {
                bad_request(ApiError::new("UNKNOWN_INFRACTION", message))
            }
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // Should be skipped when None
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_engine_error_codes() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let cases = [
            (
                EngineError::InvalidInterval {
                    start: date,
                    end: date,
                },
                StatusCode::BAD_REQUEST,
                "INVALID_INTERVAL",
            ),
            (
                EngineError::invalid_input("salary", "must be greater than zero"),
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
            ),
            (EngineError::UitNotFound { year: 2019 }, StatusCode::BAD_REQUEST, "UIT_NOT_FOUND"),
            (
                EngineError::FormulaError {
                    formula: "{{x}}".to_string(),
                    message: "unknown variable 'x'".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "FORMULA_ERROR",
            ),
            (
                EngineError::DuplicateTemplate {
                    name: "venta".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "DUPLICATE_TEMPLATE",
            ),
            (
                EngineError::TemplateNotFound {
                    value: "x".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "TEMPLATE_NOT_FOUND",
            ),
            (
                EngineError::UnknownInfraction {
                    code: "999".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "UNKNOWN_INFRACTION",
            ),
            (
                EngineError::ConfigNotFound {
                    path: "labor.yaml".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
            ),
            (
                EngineError::RegimeNotFound {
                    regime: "micro".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            let response: ApiErrorResponse = error.into();
            assert_eq!(response.status, status, "status for {}", code);
            assert_eq!(response.error.code, code);
        }
    }

    #[test]
    fn test_formula_error_carries_formula_in_details() {
        let response: ApiErrorResponse = EngineError::FormulaError {
            formula: "base /".to_string(),
            message: "unexpected end of formula".to_string(),
        }
        .into();
        assert_eq!(response.error.details.as_deref(), Some("base /"));
    }
}
