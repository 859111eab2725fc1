use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::LoanCalcError;
use crate::fixed_point;
use crate::types::{Money, Rate};
use crate::LoanCalcResult;

const PERCENT: Decimal = dec!(100);

/// Periodic rate from an annual percentage (5.5 = 5.5%) compounded
/// `periods_per_year` times.
pub fn periodic_rate_from_annual_pct(
    annual_rate_pct: Decimal,
    periods_per_year: u32,
) -> LoanCalcResult<Rate> {
    if periods_per_year == 0 {
        return Err(LoanCalcError::InvalidInput {
            field: "periods_per_year".into(),
            reason: "Must compound at least once a year".into(),
        });
    }
    let annual = fixed_point::div(annual_rate_pct, PERCENT, "annual rate")?;
    fixed_point::div(annual, Decimal::from(periods_per_year), "periodic rate")
}

/// Level payment that retires `principal` over `num_periods` at
/// `periodic_rate`: P·r·(1+r)^n / ((1+r)^n − 1), or P/n at a zero rate.
pub fn solve_periodic_payment(
    principal: Money,
    periodic_rate: Rate,
    num_periods: u32,
) -> LoanCalcResult<Money> {
    if principal < Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: "principal".into(),
            reason: "Principal cannot be negative".into(),
        });
    }
    if periodic_rate < Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: "periodic_rate".into(),
            reason: "Rate cannot be negative".into(),
        });
    }
    if num_periods == 0 {
        return Err(LoanCalcError::InvalidInput {
            field: "num_periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    let n = Decimal::from(num_periods);
    if periodic_rate.is_zero() {
        return fixed_point::div(principal, n, "level payment");
    }

    let one_plus_r = fixed_point::add(Decimal::ONE, periodic_rate, "growth base")?;
    let growth = match fixed_point::pow(one_plus_r, num_periods, "compound growth factor") {
        Ok(g) => g,
        Err(LoanCalcError::NumericOverflow { .. }) => {
            // (1+r)^n beyond range: the payment has converged to interest-only.
            tracing::debug!(%periodic_rate, num_periods, "growth factor overflow, using P*r");
            return fixed_point::mul(principal, periodic_rate, "interest-only payment");
        }
        Err(e) => return Err(e),
    };

    // Rearranged as P·r / (1 − (1+r)^−n) so P·r·(1+r)^n is never formed.
    let discount = Decimal::ONE - Decimal::ONE / growth;
    if discount.is_zero() {
        tracing::debug!(%periodic_rate, num_periods, "growth factor indistinguishable from 1");
        return fixed_point::div(principal, n, "level payment");
    }

    let interest = fixed_point::mul(principal, periodic_rate, "first period interest")?;
    fixed_point::div(interest, discount, "annuity payment")
}

/// Outstanding balance after `periods` level payments, in closed form:
/// P·(1+r)^k − pmt·((1+r)^k − 1)/r. May be negative once overpaid.
#[cfg(test)]
pub(crate) fn balance_after_periods(
    principal: Money,
    periodic_rate: Rate,
    payment: Money,
    periods: u32,
) -> LoanCalcResult<Money> {
    if periodic_rate.is_zero() {
        let paid = fixed_point::mul(payment, Decimal::from(periods), "payments to date")?;
        return fixed_point::sub(principal, paid, "remaining balance");
    }

    let one_plus_r = fixed_point::add(Decimal::ONE, periodic_rate, "growth base")?;
    let growth = fixed_point::pow(one_plus_r, periods, "compound growth factor")?;
    let grown = fixed_point::mul(principal, growth, "grown principal")?;
    let annuity_factor = fixed_point::div(growth - Decimal::ONE, periodic_rate, "annuity factor")?;
    let paid = fixed_point::mul(payment, annuity_factor, "grown payments")?;
    fixed_point::sub(grown, paid, "remaining balance")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_periodic_rate_monthly() {
        let r = periodic_rate_from_annual_pct(dec!(6), 12).unwrap();
        assert_eq!(r, dec!(0.005));
        assert!(periodic_rate_from_annual_pct(dec!(6), 0).is_err());
    }

    #[test]
    fn test_payment_standard_mortgage() {
        let r = periodic_rate_from_annual_pct(dec!(5.5), 12).unwrap();
        let pmt = solve_periodic_payment(dec!(100000), r, 360).unwrap();
        // 100k at 5.5% over 30 years ≈ 567.79
        assert!((pmt - dec!(567.79)).abs() < dec!(0.01), "pmt = {pmt}");
    }

    #[test]
    fn test_payment_zero_rate() {
        let pmt = solve_periodic_payment(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(pmt, dec!(100));
    }

    #[test]
    fn test_payment_zero_principal() {
        let pmt = solve_periodic_payment(Decimal::ZERO, dec!(0.01), 12).unwrap();
        assert_eq!(pmt, Decimal::ZERO);
    }

    #[test]
    fn test_payment_rejects_invalid_inputs() {
        assert!(solve_periodic_payment(dec!(-1), dec!(0.01), 12).is_err());
        assert!(solve_periodic_payment(dec!(1000), dec!(-0.01), 12).is_err());
        assert!(solve_periodic_payment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_payment_converges_to_interest_only_when_growth_overflows() {
        // 10% a month over 1,000 months overflows (1+r)^n
        let pmt = solve_periodic_payment(dec!(1000), dec!(0.10), 1000).unwrap();
        assert_eq!(pmt, dec!(100));
    }

    #[test]
    fn test_balance_after_full_term_is_zero() {
        let r = dec!(0.005);
        let pmt = solve_periodic_payment(dec!(20000), r, 60).unwrap();
        let bal = balance_after_periods(dec!(20000), r, pmt, 60).unwrap();
        assert!(bal.abs() < dec!(0.000001), "balance = {bal}");
        let halfway = balance_after_periods(dec!(20000), r, pmt, 30).unwrap();
        assert!(halfway > Decimal::ZERO && halfway < dec!(20000));
    }

    #[test]
    fn test_balance_after_zero_rate() {
        let bal = balance_after_periods(dec!(1200), Decimal::ZERO, dec!(100), 5).unwrap();
        assert_eq!(bal, dec!(700));
    }
}
