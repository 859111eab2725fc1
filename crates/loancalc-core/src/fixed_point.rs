//! Checked decimal arithmetic used by the amortization recurrence.
//!
//! `Decimal` operators panic on overflow; every helper here reports an
//! overflow as `LoanCalcError::NumericOverflow` tagged with the caller's
//! context instead, so long or degenerate schedules fail soft.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanCalcError;
use crate::LoanCalcResult;

/// Half a cent. A closing balance within this of zero counts as repaid.
pub const SETTLEMENT_TOLERANCE: Decimal = dec!(0.005);

fn overflow(context: &str) -> LoanCalcError {
    LoanCalcError::NumericOverflow {
        context: context.to_string(),
    }
}

pub fn add(a: Decimal, b: Decimal, context: &str) -> LoanCalcResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(context))
}

pub fn sub(a: Decimal, b: Decimal, context: &str) -> LoanCalcResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(context))
}

pub fn mul(a: Decimal, b: Decimal, context: &str) -> LoanCalcResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

pub fn div(a: Decimal, b: Decimal, context: &str) -> LoanCalcResult<Decimal> {
    if b.is_zero() {
        return Err(LoanCalcError::DivisionByZero {
            context: context.to_string(),
        });
    }
    a.checked_div(b).ok_or_else(|| overflow(context))
}

/// `base` raised to a whole number of periods.
pub fn pow(base: Decimal, exponent: u32, context: &str) -> LoanCalcResult<Decimal> {
    base.checked_powu(u64::from(exponent))
        .ok_or_else(|| overflow(context))
}

/// Three-way comparison with `tolerance` treated as equality.
pub fn compare(a: Decimal, b: Decimal, tolerance: Decimal) -> Ordering {
    match a.checked_sub(b) {
        Some(diff) if diff.abs() <= tolerance => Ordering::Equal,
        _ => a.cmp(&b),
    }
}

pub fn approx_eq(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    compare(a, b, tolerance) == Ordering::Equal
}

/// Clamp negatives to zero.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
