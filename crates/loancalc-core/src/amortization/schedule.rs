//! Month-by-month amortization recurrence.
//!
//! Each period accrues interest on the opening balance, applies the level
//! payment plus any extra principal, and records the split. The recurrence
//! stops when the balance reaches zero, when `nominal_term_periods +
//! SAFETY_MARGIN_PERIODS` periods have been produced, or when checked
//! arithmetic runs out of range.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::fixed_point;
use crate::types::{Money, Rate};
use crate::LoanCalcResult;

/// Periods allowed past the nominal term before the recurrence is cut off.
pub const SAFETY_MARGIN_PERIODS: u32 = 100;

/// One period of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// 1-based period index.
    pub period: u32,
    pub payment_date: NaiveDate,
    /// principal_portion + interest_portion.
    pub total_payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// Balance after this payment, never negative.
    pub remaining_balance: Money,
    /// Interest paid from period 1 through this one.
    pub cumulative_interest: Money,
}

/// Why the recurrence stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Balance reached zero.
    PaidOff,
    /// The payment did not amortize the loan within the period cap.
    SafetyCap,
    /// An amount or date left the representable range.
    NumericLimit,
}

/// Inputs to the recurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTerms {
    pub principal: Money,
    pub periodic_rate: Rate,
    pub periodic_payment: Money,
    /// Added to the principal portion of every payment.
    pub extra_payment: Money,
    pub start_date: NaiveDate,
    pub nominal_term_periods: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub records: Vec<PaymentRecord>,
    pub termination: Termination,
}

impl Schedule {
    /// True when the schedule stopped before the balance reached zero.
    pub fn is_truncated(&self) -> bool {
        self.termination != Termination::PaidOff
    }

    pub fn last(&self) -> Option<&PaymentRecord> {
        self.records.last()
    }
}

/// Date of `period` (1-based): the start date advanced by `period - 1`
/// calendar months, clamped to the end of shorter months.
pub fn payment_date(start_date: NaiveDate, period: u32) -> LoanCalcResult<NaiveDate> {
    start_date
        .checked_add_months(Months::new(period.saturating_sub(1)))
        .ok_or_else(|| {
            LoanCalcError::DateError(format!("payment date for period {period} is out of range"))
        })
}

/// Run the recurrence until paid off or capped.
pub fn generate_schedule(terms: &ScheduleTerms) -> Schedule {
    let cap = terms
        .nominal_term_periods
        .saturating_add(SAFETY_MARGIN_PERIODS);

    let mut records: Vec<PaymentRecord> = Vec::new();
    let mut balance = terms.principal;
    let mut cumulative_interest = Decimal::ZERO;
    let mut termination = Termination::SafetyCap;

    for period in 1..=cap {
        let (record, new_balance) =
            match accrue_period(terms, period, balance, cumulative_interest) {
                Ok(step) => step,
                Err(e) => {
                    tracing::warn!(period, error = %e, "amortization stopped at numeric limit");
                    termination = Termination::NumericLimit;
                    break;
                }
            };

        cumulative_interest = record.cumulative_interest;
        records.push(record);

        if new_balance <= Decimal::ZERO {
            termination = Termination::PaidOff;
            break;
        }
        balance = new_balance;
    }

    if termination == Termination::SafetyCap {
        tracing::warn!(
            periods = cap,
            %balance,
            "payment does not amortize the loan within the period cap"
        );
    }

    Schedule {
        records,
        termination,
    }
}

/// One step of the recurrence. Returns the record and the unclamped
/// closing balance.
fn accrue_period(
    terms: &ScheduleTerms,
    period: u32,
    balance: Money,
    cumulative_interest: Money,
) -> LoanCalcResult<(PaymentRecord, Money)> {
    let interest = fixed_point::mul(balance, terms.periodic_rate, "period interest")?;
    let scheduled_principal =
        fixed_point::sub(terms.periodic_payment, interest, "scheduled principal")?;
    let with_extra = fixed_point::add(scheduled_principal, terms.extra_payment, "extra principal")?;

    let mut principal_portion = balance.min(with_extra);
    let mut new_balance = fixed_point::sub(balance, principal_portion, "closing balance")?;
    if new_balance > Decimal::ZERO
        && fixed_point::approx_eq(new_balance, Decimal::ZERO, fixed_point::SETTLEMENT_TOLERANCE)
    {
        principal_portion = balance;
        new_balance = Decimal::ZERO;
    }

    let cumulative_interest =
        fixed_point::add(cumulative_interest, interest, "cumulative interest")?;
    let total_payment = fixed_point::add(principal_portion, interest, "total payment")?;

    let record = PaymentRecord {
        period,
        payment_date: payment_date(terms.start_date, period)?,
        total_payment,
        principal_portion,
        interest_portion: interest,
        remaining_balance: fixed_point::non_negative(new_balance),
        cumulative_interest,
    };
    Ok((record, new_balance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::{balance_after_periods, solve_periodic_payment};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn terms(principal: Decimal, rate: Decimal, payment: Decimal, extra: Decimal, n: u32) -> ScheduleTerms {
        ScheduleTerms {
            principal,
            periodic_rate: rate,
            periodic_payment: payment,
            extra_payment: extra,
            start_date: date(2024, 1, 15),
            nominal_term_periods: n,
        }
    }

    #[test]
    fn test_zero_rate_pays_off_in_term() {
        let s = generate_schedule(&terms(dec!(1200), dec!(0), dec!(100), dec!(0), 12));
        assert_eq!(s.termination, Termination::PaidOff);
        assert_eq!(s.records.len(), 12);
        assert!(s.records.iter().all(|r| r.interest_portion.is_zero()));
        assert!(s.records.iter().all(|r| r.total_payment == dec!(100)));
        assert_eq!(s.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_recurrence_matches_closed_form_balance() {
        let r = dec!(0.005);
        let pmt = solve_periodic_payment(dec!(20000), r, 60).unwrap();
        let s = generate_schedule(&terms(dec!(20000), r, pmt, dec!(0), 60));
        assert_eq!(s.records.len(), 60);
        for rec in s.records.iter().take(59) {
            let expected = balance_after_periods(dec!(20000), r, pmt, rec.period).unwrap();
            assert!(
                (rec.remaining_balance - expected).abs() < dec!(0.000001),
                "period {} balance {} vs {}",
                rec.period,
                rec.remaining_balance,
                expected
            );
        }
    }

    #[test]
    fn test_first_period_split() {
        let s = generate_schedule(&terms(dec!(10000), dec!(0.01), dec!(500), dec!(0), 24));
        let first = &s.records[0];
        assert_eq!(first.period, 1);
        assert_eq!(first.interest_portion, dec!(100));
        assert_eq!(first.principal_portion, dec!(400));
        assert_eq!(first.remaining_balance, dec!(9600));
        assert_eq!(first.cumulative_interest, dec!(100));
        assert_eq!(first.payment_date, date(2024, 1, 15));
    }

    #[test]
    fn test_extra_payment_final_period_is_capped_at_balance() {
        let s = generate_schedule(&terms(dec!(1000), dec!(0), dec!(100), dec!(50), 10));
        assert_eq!(s.termination, Termination::PaidOff);
        assert_eq!(s.records.len(), 7);
        let last = s.last().unwrap();
        assert_eq!(last.principal_portion, dec!(100));
        assert_eq!(last.total_payment, dec!(100));
        assert_eq!(last.remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_division_residue_does_not_add_a_period() {
        let pmt = dec!(1000) / dec!(3);
        let s = generate_schedule(&terms(dec!(1000), dec!(0), pmt, dec!(0), 3));
        assert_eq!(s.records.len(), 3);
        let paid: Decimal = s.records.iter().map(|r| r.principal_portion).sum();
        assert_eq!(paid, dec!(1000));
    }

    #[test]
    fn test_residue_on_large_principal_is_settled() {
        // 1e24 / 3 keeps only a few fractional digits, leaving ~1e-5 behind.
        let principal: Decimal = "1000000000000000000000000".parse().unwrap();
        let pmt = principal / dec!(3);
        let s = generate_schedule(&terms(principal, dec!(0), pmt, dec!(0), 3));
        assert_eq!(s.termination, Termination::PaidOff);
        assert_eq!(s.records.len(), 3);
        let paid: Decimal = s.records.iter().map(|r| r.principal_portion).sum();
        assert_eq!(paid, principal);
    }

    #[test]
    fn test_balance_above_half_cent_is_not_settled() {
        let s = generate_schedule(&terms(dec!(100.01), dec!(0), dec!(50), dec!(0), 2));
        assert_eq!(s.records.len(), 3);
        assert_eq!(s.last().unwrap().principal_portion, dec!(0.01));
    }

    #[test]
    fn test_payment_below_interest_hits_safety_cap() {
        let s = generate_schedule(&terms(dec!(1000), dec!(0.01), dec!(5), dec!(0), 12));
        assert_eq!(s.termination, Termination::SafetyCap);
        assert!(s.is_truncated());
        assert_eq!(s.records.len(), 112);
        // Negative amortization: the balance grows every period.
        assert!(s.last().unwrap().remaining_balance > dec!(1000));
    }

    #[test]
    fn test_overflow_stops_schedule() {
        let huge = dec!(1_000_000_000_000_000_000_000_000_000);
        let s = generate_schedule(&terms(huge, dec!(10), dec!(0), dec!(0), 12));
        assert_eq!(s.termination, Termination::NumericLimit);
        assert_eq!(s.records.len(), 1);
    }

    #[test]
    fn test_zero_principal_is_single_empty_period() {
        let s = generate_schedule(&terms(dec!(0), dec!(0.01), dec!(0), dec!(25), 12));
        assert_eq!(s.termination, Termination::PaidOff);
        assert_eq!(s.records.len(), 1);
        assert_eq!(s.records[0].total_payment, Decimal::ZERO);
    }

    #[test]
    fn test_payment_dates_clamp_to_month_end() {
        let start = date(2024, 1, 31);
        assert_eq!(payment_date(start, 1).unwrap(), date(2024, 1, 31));
        assert_eq!(payment_date(start, 2).unwrap(), date(2024, 2, 29));
        assert_eq!(payment_date(start, 3).unwrap(), date(2024, 3, 31));
        assert_eq!(payment_date(start, 4).unwrap(), date(2024, 4, 30));
        assert_eq!(payment_date(start, 14).unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn test_payment_dates_roll_over_year() {
        let start = date(2023, 11, 15);
        assert_eq!(payment_date(start, 3).unwrap(), date(2024, 1, 15));
    }
}
