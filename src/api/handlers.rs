//! HTTP request handlers for the engine API.
//!
//! Every endpoint accepts a JSON body, runs one calculator and returns the
//! result inside a [`CalculationResult`] envelope with its audit trace.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    AsientoInput, AsientoResult, CtsInput, CtsResult, DetraccionInput, DetraccionResult,
    GratificacionInput, GratificacionResult, IgvInput, IgvResult, InteresesInput,
    InteresesResult, LiquidacionInput, LiquidacionResult, MultaInput, MultaResult,
    NumeroALetrasInput, NumeroALetrasResult, PrestamoInput, PrestamoResult, ProrationResult,
    RegimenesInput, RegimenesResult, RentaInput, RentaResult, VacacionesInput, VacacionesResult,
    calculate_cts, calculate_detraccion, calculate_gratificacion, calculate_igv,
    calculate_intereses, calculate_liquidacion, calculate_multa, calculate_prestamo,
    calculate_proration, calculate_renta, calculate_vacaciones, convert_numero_a_letras,
    generate_asiento, simulate_regimenes,
};
use crate::error::EngineResult;
use crate::models::{Audited, CalculationResult};

use super::request::ProrationRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/proration", post(proration_handler))
        .route("/cts", post(cts_handler))
        .route("/gratificacion", post(gratificacion_handler))
        .route("/vacaciones", post(vacaciones_handler))
        .route("/liquidacion", post(liquidacion_handler))
        .route("/igv", post(igv_handler))
        .route("/detraccion", post(detraccion_handler))
        .route("/intereses", post(intereses_handler))
        .route("/renta", post(renta_handler))
        .route("/regimenes", post(regimenes_handler))
        .route("/multas", post(multas_handler))
        .route("/asientos", post(asientos_handler))
        .route("/prestamos", post(prestamos_handler))
        .route("/numero-a-letras", post(numero_a_letras_handler))
        .with_state(state)
}

/// The figure logged when a calculation completes.
trait Headline {
    fn headline(&self) -> Decimal;
}

impl Headline for ProrationResult {
    fn headline(&self) -> Decimal {
        self.amount
    }
}

impl Headline for CtsResult {
    fn headline(&self) -> Decimal {
        self.amount
    }
}

impl Headline for GratificacionResult {
    fn headline(&self) -> Decimal {
        self.total
    }
}

impl Headline for VacacionesResult {
    fn headline(&self) -> Decimal {
        self.amount
    }
}

impl Headline for LiquidacionResult {
    fn headline(&self) -> Decimal {
        self.total
    }
}

impl Headline for IgvResult {
    fn headline(&self) -> Decimal {
        self.total
    }
}

impl Headline for DetraccionResult {
    fn headline(&self) -> Decimal {
        self.detraccion
    }
}

impl Headline for InteresesResult {
    fn headline(&self) -> Decimal {
        self.total
    }
}

impl Headline for RentaResult {
    fn headline(&self) -> Decimal {
        self.annual_tax
    }
}

impl Headline for RegimenesResult {
    fn headline(&self) -> Decimal {
        self.best_option
            .and_then(|best| self.options.iter().find(|o| o.regime == best))
            .map(|o| o.total)
            .unwrap_or(Decimal::ZERO)
    }
}

impl Headline for MultaResult {
    fn headline(&self) -> Decimal {
        self.final_fine
    }
}

impl Headline for AsientoResult {
    fn headline(&self) -> Decimal {
        self.total_debit
    }
}

impl Headline for PrestamoResult {
    fn headline(&self) -> Decimal {
        self.installment
    }
}

impl Headline for NumeroALetrasResult {
    fn headline(&self) -> Decimal {
        self.amount
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Extracts the body, runs the calculator and wraps the outcome.
fn run<I, T, F>(calculator: &'static str, payload: Result<Json<I>, JsonRejection>, calculate: F) -> Response
where
    T: Serialize + Headline,
    F: FnOnce(I) -> EngineResult<Audited<T>>,
{
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, calculator, "Processing calculation request");

    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            warn!(
                correlation_id = %correlation_id,
                calculator,
                error = %rejection.body_text(),
                "Request rejected"
            );
            return json_response(StatusCode::BAD_REQUEST, ApiError::from_rejection(&rejection));
        }
    };

    let start_time = Instant::now();
    match calculate(input) {
        Ok(audited) => {
            let duration_us = start_time.elapsed().as_micros() as u64;
            info!(
                correlation_id = %correlation_id,
                calculator,
                amount = %audited.value.headline(),
                steps = audited.steps.len(),
                duration_us,
                "Calculation completed successfully"
            );
            json_response(
                StatusCode::OK,
                CalculationResult::from_audited(calculator, audited, duration_us),
            )
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                calculator,
                error = %err,
                "Calculation failed"
            );
            let api_error: ApiErrorResponse = err.into();
            api_error.into_response()
        }
    }
}

/// Handler for POST /proration.
async fn proration_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProrationRequest>, JsonRejection>,
) -> Response {
    run("proration", payload, |request| {
        let input = request.into_input(state.config())?;
        calculate_proration(&input)
    })
}

/// Handler for POST /cts.
async fn cts_handler(
    State(state): State<AppState>,
    payload: Result<Json<CtsInput>, JsonRejection>,
) -> Response {
    run("cts", payload, |input| calculate_cts(&input, state.config()))
}

/// Handler for POST /gratificacion.
async fn gratificacion_handler(
    State(state): State<AppState>,
    payload: Result<Json<GratificacionInput>, JsonRejection>,
) -> Response {
    run("gratificacion", payload, |input| {
        calculate_gratificacion(&input, state.config())
    })
}

/// Handler for POST /vacaciones.
async fn vacaciones_handler(
    State(state): State<AppState>,
    payload: Result<Json<VacacionesInput>, JsonRejection>,
) -> Response {
    run("vacaciones", payload, |input| {
        calculate_vacaciones(&input, state.config())
    })
}

/// Handler for POST /liquidacion.
async fn liquidacion_handler(
    State(state): State<AppState>,
    payload: Result<Json<LiquidacionInput>, JsonRejection>,
) -> Response {
    run("liquidacion", payload, |input| {
        calculate_liquidacion(&input, state.config())
    })
}

/// Handler for POST /igv.
async fn igv_handler(
    State(state): State<AppState>,
    payload: Result<Json<IgvInput>, JsonRejection>,
) -> Response {
    run("igv", payload, |input| calculate_igv(&input, state.config()))
}

/// Handler for POST /detraccion.
async fn detraccion_handler(
    State(state): State<AppState>,
    payload: Result<Json<DetraccionInput>, JsonRejection>,
) -> Response {
    run("detraccion", payload, |input| {
        calculate_detraccion(&input, state.config())
    })
}

/// Handler for POST /intereses.
async fn intereses_handler(
    State(state): State<AppState>,
    payload: Result<Json<InteresesInput>, JsonRejection>,
) -> Response {
    run("intereses", payload, |input| {
        calculate_intereses(&input, state.config())
    })
}

/// Handler for POST /renta.
async fn renta_handler(
    State(state): State<AppState>,
    payload: Result<Json<RentaInput>, JsonRejection>,
) -> Response {
    run("renta", payload, |input| calculate_renta(&input, state.config()))
}

/// Handler for POST /regimenes.
async fn regimenes_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegimenesInput>, JsonRejection>,
) -> Response {
    run("regimenes", payload, |input| {
        simulate_regimenes(&input, state.config())
    })
}

/// Handler for POST /multas.
async fn multas_handler(
    State(state): State<AppState>,
    payload: Result<Json<MultaInput>, JsonRejection>,
) -> Response {
    run("multas", payload, |input| calculate_multa(&input, state.config()))
}

/// Handler for POST /asientos.
async fn asientos_handler(
    State(state): State<AppState>,
    payload: Result<Json<AsientoInput>, JsonRejection>,
) -> Response {
    run("asientos", payload, |input| {
        generate_asiento(&input, state.config())
    })
}

/// Handler for POST /prestamos.
async fn prestamos_handler(payload: Result<Json<PrestamoInput>, JsonRejection>) -> Response {
    run("prestamos", payload, |input| calculate_prestamo(&input))
}

/// Handler for POST /numero-a-letras.
async fn numero_a_letras_handler(
    payload: Result<Json<NumeroALetrasInput>, JsonRejection>,
) -> Response {
    run("numero_a_letras", payload, |input| {
        convert_numero_a_letras(&input)
    })
}
