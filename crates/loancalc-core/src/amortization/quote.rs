//! Closed-form payment quote without a schedule: the level payment, what
//! it adds up to over the full term, and the interest inside that total.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::loan::{TermUnit, MONTHS_PER_YEAR};
use crate::error::LoanCalcError;
use crate::fixed_point;
use crate::time_value::{periodic_rate_from_annual_pct, solve_periodic_payment};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::LoanCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteInput {
    pub principal: Money,
    pub annual_rate_pct: Decimal,
    pub term: u32,
    #[serde(default)]
    pub term_unit: TermUnit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentQuote {
    pub monthly_payment: Money,
    pub num_payments: u32,
    /// monthly_payment × num_payments.
    pub total_payment: Money,
    pub total_interest: Money,
}

pub fn quote_payment(input: &QuoteInput) -> LoanCalcResult<ComputationOutput<PaymentQuote>> {
    let start = Instant::now();

    let num_payments = input
        .term_unit
        .to_months(input.term)
        .filter(|n| *n > 0)
    .ok_or_else(|| LoanCalcError::InvalidInput {
        field: "term".into(),
        reason: "Term must be at least 1 month and fit in 32 bits".into(),
    })?;

    if input.annual_rate_pct < Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }

    let periodic_rate = periodic_rate_from_annual_pct(input.annual_rate_pct, MONTHS_PER_YEAR)?;
    let monthly_payment = solve_periodic_payment(input.principal, periodic_rate, num_payments)?;
    let total_payment = fixed_point::mul(
        monthly_payment,
        Decimal::from(num_payments),
        "total of payments",
    )?;
    let total_interest = fixed_point::sub(total_payment, input.principal, "total interest")?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level payment quote (annuity formula, monthly compounding)",
        input,
        Vec::new(),
        elapsed,
        PaymentQuote {
            monthly_payment,
            num_payments,
            total_payment,
            total_interest,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_thirty_year_mortgage() {
        let out = quote_payment(&QuoteInput {
            principal: dec!(200000),
            annual_rate_pct: dec!(6.5),
            term: 30,
            term_unit: TermUnit::Years,
        })
        .unwrap();
        let q = &out.result;
        assert_eq!(q.num_payments, 360);
        // 200k at 6.5% over 30 years ≈ 1264.14 a month
        assert!((q.monthly_payment - dec!(1264.14)).abs() < dec!(0.01));
        assert_eq!(q.total_payment, q.monthly_payment * dec!(360));
        assert_eq!(q.total_interest, q.total_payment - dec!(200000));
    }

    #[test]
    fn test_quote_zero_rate_has_no_interest() {
        let out = quote_payment(&QuoteInput {
            principal: dec!(6000),
            annual_rate_pct: Decimal::ZERO,
            term: 24,
            term_unit: TermUnit::Months,
        })
        .unwrap();
        assert_eq!(out.result.monthly_payment, dec!(250));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_quote_rejects_bad_inputs() {
        let base = QuoteInput {
            principal: dec!(1000),
            annual_rate_pct: dec!(5),
            term: 0,
            term_unit: TermUnit::Years,
        };
        assert!(quote_payment(&base).is_err());
        assert!(quote_payment(&QuoteInput { term: u32::MAX, ..base.clone() }).is_err());
        assert!(quote_payment(&QuoteInput { term: 1, annual_rate_pct: dec!(-1), ..base.clone() }).is_err());
        assert!(quote_payment(&QuoteInput { term: 1, principal: dec!(-1), ..base }).is_err());
    }
}
