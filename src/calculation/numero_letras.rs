//! Amounts in words, as printed on comprobantes de pago.
//!
//! `1180.50` in soles reads "MIL CIENTO OCHENTA CON 50/100 SOLES".

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Audited};

/// Largest amount that can be written out.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

const UNITS: [&str; 10] = [
    "", "UN", "DOS", "TRES", "CUATRO", "CINCO", "SEIS", "SIETE", "OCHO", "NUEVE",
];
const TEENS: [&str; 6] = ["DIEZ", "ONCE", "DOCE", "TRECE", "CATORCE", "QUINCE"];
const TENS: [&str; 10] = [
    "", "", "VEINTE", "TREINTA", "CUARENTA", "CINCUENTA", "SESENTA", "SETENTA", "OCHENTA",
    "NOVENTA",
];
const HUNDREDS: [&str; 10] = [
    "",
    "CIENTO",
    "DOSCIENTOS",
    "TRESCIENTOS",
    "CUATROCIENTOS",
    "QUINIENTOS",
    "SEISCIENTOS",
    "SETECIENTOS",
    "OCHOCIENTOS",
    "NOVECIENTOS",
];

/// Currency named after the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Soles.
    #[default]
    Pen,
    /// US dollars.
    Usd,
    /// Euros.
    Eur,
    /// Brazilian reais.
    Brl,
    /// Mexican pesos.
    Mxn,
    /// Chilean pesos.
    Clp,
    /// Colombian pesos.
    Cop,
    /// Argentine pesos.
    Ars,
}

impl Currency {
    fn names(self) -> (&'static str, &'static str) {
        match self {
            Currency::Pen => ("SOL", "SOLES"),
            Currency::Usd => ("DÓLAR AMERICANO", "DÓLARES AMERICANOS"),
            Currency::Eur => ("EURO", "EUROS"),
            Currency::Brl => ("REAL BRASILEÑO", "REALES BRASILEÑOS"),
            Currency::Mxn => ("PESO MEXICANO", "PESOS MEXICANOS"),
            Currency::Clp => ("PESO CHILENO", "PESOS CHILENOS"),
            Currency::Cop => ("PESO COLOMBIANO", "PESOS COLOMBIANOS"),
            Currency::Ars => ("PESO ARGENTINO", "PESOS ARGENTINOS"),
        }
    }
}

fn join(head: String, tail: String) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail,
        (_, true) => head,
        _ => format!("{} {}", head, tail),
    }
}

fn tens(n: u64) -> String {
    let (ten, unit) = ((n / 10) as usize, (n % 10) as usize);
    match ten {
        0 => UNITS[unit].to_string(),
        1 if unit <= 5 => TEENS[unit].to_string(),
        1 => format!("DIECI{}", UNITS[unit]),
        2 if unit == 0 => TENS[2].to_string(),
        2 => format!("VEINTI{}", UNITS[unit]),
        _ if unit == 0 => TENS[ten].to_string(),
        _ => format!("{} Y {}", TENS[ten], UNITS[unit]),
    }
}

fn hundreds(n: u64) -> String {
    let (hundred, rest) = ((n / 100) as usize, n % 100);
    match (hundred, rest) {
        (0, _) => tens(rest),
        (1, 0) => "CIEN".to_string(),
        _ => join(HUNDREDS[hundred].to_string(), tens(rest)),
    }
}

fn thousands(n: u64) -> String {
    let (thousand, rest) = (n / 1_000, n % 1_000);
    let head = match thousand {
        0 => String::new(),
        1 => "MIL".to_string(),
        _ => format!("{} MIL", hundreds(thousand)),
    };
    join(head, hundreds(rest))
}

fn millions(n: u64) -> String {
    let (million, rest) = (n / 1_000_000, n % 1_000_000);
    let head = match million {
        0 => String::new(),
        1 => "UN MILLON".to_string(),
        _ => format!("{} MILLONES", thousands(million)),
    };
    join(head, thousands(rest))
}

/// Writes `amount` out in Spanish words followed by the céntimos and the
/// currency name.
///
/// The amount is rounded to two places first. Zero reads "CERO".
///
/// # Errors
///
/// `InvalidInput` when the amount is negative or exceeds [`MAX_AMOUNT`].
pub fn amount_in_words(amount: Decimal, currency: Currency) -> EngineResult<String> {
    if amount < Decimal::ZERO {
        return Err(EngineError::invalid_input("amount", "must not be negative"));
    }
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded > MAX_AMOUNT {
        return Err(EngineError::invalid_input(
            "amount",
            format!("must not exceed {}", MAX_AMOUNT),
        ));
    }

    let whole = rounded.trunc();
    let units = whole.to_u64().unwrap_or(0);
    let cents = ((rounded - whole) * Decimal::ONE_HUNDRED).to_u64().unwrap_or(0);

    let words = if units == 0 {
        "CERO".to_string()
    } else {
        millions(units)
    };
    let (singular, plural) = currency.names();
    let name = if units == 1 { singular } else { plural };

    Ok(format!("{} CON {:02}/100 {}", words, cents, name))
}

/// Input to [`convert_numero_a_letras`].
#[derive(Debug, Clone, Deserialize)]
pub struct NumeroALetrasInput {
    /// Amount to write out.
    pub amount: Decimal,
    /// Defaults to soles.
    #[serde(default)]
    pub currency: Currency,
}

/// An amount and its reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumeroALetrasResult {
    /// Amount rounded to céntimos.
    pub amount: Decimal,
    /// Currency named in the text.
    pub currency: Currency,
    /// The amount in words.
    pub text: String,
}

/// Converts an amount to words inside an audit envelope.
pub fn convert_numero_a_letras(
    input: &NumeroALetrasInput,
) -> EngineResult<Audited<NumeroALetrasResult>> {
    let text = amount_in_words(input.amount, input.currency)?;
    let amount = super::round_currency(input.amount);

    let step = AuditStep {
        step_number: 1,
        rule_id: "amount_in_words".to_string(),
        rule_name: "Amount in Words".to_string(),
        clause_ref: "R.S. 007-99/SUNAT, Art. 8".to_string(),
        input: serde_json::json!({
            "amount": amount.to_string(),
            "currency": input.currency,
        }),
        output: serde_json::json!({ "text": text }),
        reasoning: format!("{} reads \"{}\"", amount, text),
    };

    Ok(Audited::new(
        NumeroALetrasResult {
            amount,
            currency: input.currency,
            text,
        },
        vec![step],
    ))
}
