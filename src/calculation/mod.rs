//! Calculation logic for the benefits and tax engine.
//!
//! The proration pipeline (window resolution, intersection, decomposition
//! and proportional amount) underlies the labour benefit calculators: CTS,
//! gratificación, vacaciones truncas and the liquidación on cessation. The
//! tax calculators cover IGV, detracciones, late-payment interest, work
//! income tax, regime comparison and fines. Journal entries are generated
//! from templates whose formulas go through a sandboxed parser. Loan
//! schedules and amounts in words round out the toolkit.

mod asientos;
mod checked;
mod cts;
mod decompose;
mod detraccion;
pub mod formula;
mod gratificacion;
mod igv;
mod intereses;
mod intersect;
mod liquidacion;
mod multas;
mod numero_letras;
mod prestamos;
mod proration;
mod regimenes;
mod remuneration;
mod renta;
mod vacaciones;
mod window;

pub use asientos::{
    AmountType, AsientoInput, AsientoResult, TemplateCatalog, generate_asiento, template_variables,
};
pub use cts::{CtsInput, CtsResult, calculate_cts};
pub use decompose::{DAYS_PER_MONTH, FullMonths, count_full_months, decompose, decompose_days};
pub use detraccion::{DetraccionInput, DetraccionResult, calculate_detraccion};
pub use gratificacion::{GratificacionInput, GratificacionResult, calculate_gratificacion};
pub use igv::{IgvInput, IgvMode, IgvResult, calculate_igv};
pub use intereses::{InteresesInput, InteresesResult, calculate_intereses};
pub use intersect::intersect;
pub use liquidacion::{LiquidacionInput, LiquidacionLine, LiquidacionResult, calculate_liquidacion};
pub use multas::{CureType, MultaInput, MultaResult, calculate_multa};
pub use numero_letras::{
    Currency, MAX_AMOUNT, NumeroALetrasInput, NumeroALetrasResult, amount_in_words,
    convert_numero_a_letras,
};
pub use prestamos::{
    AmortizationRow, MAX_TERM_MONTHS, PrestamoInput, PrestamoResult, calculate_prestamo,
};
pub use proration::{
    ProrationInput, ProrationResult, calculate_proration, compute_proration, round_currency,
};
pub use regimenes::{RegimeOption, RegimenesInput, RegimenesResult, TaxRegime, simulate_regimenes};
pub use renta::{BracketTax, IncomeKind, RentaInput, RentaResult, calculate_renta};
pub use vacaciones::{VacacionesInput, VacacionesResult, calculate_vacaciones};
pub use window::{is_november_deposit, resolve_window};
