//! Overflow-checked decimal arithmetic.
//!
//! `Decimal`'s operators panic once a value leaves its 96-bit range, which a
//! request body can trigger. Calculators on user amounts go through
//! [`CheckedAmount`] instead and fail with `CalculationError`.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

pub(crate) trait CheckedAmount: Sized {
    fn try_add(self, rhs: Decimal) -> EngineResult<Decimal>;
    fn try_sub(self, rhs: Decimal) -> EngineResult<Decimal>;
    fn try_mul(self, rhs: Decimal) -> EngineResult<Decimal>;
    fn try_div(self, rhs: Decimal) -> EngineResult<Decimal>;
}

impl CheckedAmount for Decimal {
    fn try_add(self, rhs: Decimal) -> EngineResult<Decimal> {
        self.checked_add(rhs).ok_or_else(|| out_of_range("addition", self, rhs))
    }

    fn try_sub(self, rhs: Decimal) -> EngineResult<Decimal> {
        self.checked_sub(rhs)
            .ok_or_else(|| out_of_range("subtraction", self, rhs))
    }

    fn try_mul(self, rhs: Decimal) -> EngineResult<Decimal> {
        self.checked_mul(rhs)
            .ok_or_else(|| out_of_range("multiplication", self, rhs))
    }

    fn try_div(self, rhs: Decimal) -> EngineResult<Decimal> {
        self.checked_div(rhs).ok_or_else(|| out_of_range("division", self, rhs))
    }
}

/// Sums amounts, failing on overflow.
pub(crate) fn try_sum(values: impl IntoIterator<Item = Decimal>) -> EngineResult<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.try_add(value))
}

fn out_of_range(operation: &str, lhs: Decimal, rhs: Decimal) -> EngineError {
    EngineError::CalculationError {
        message: format!("{} of {} and {} is out of range", operation, lhs, rhs),
    }
}
