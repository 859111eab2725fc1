//! Top-level loan amortization: parameter validation, payment solving,
//! schedule generation and yearly aggregation.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::schedule::{generate_schedule, PaymentRecord, ScheduleTerms};
use super::yearly::{aggregate_by_year, YearlySummary};
use crate::currency::Currency;
use crate::error::LoanCalcError;
use crate::time_value::{periodic_rate_from_annual_pct, solve_periodic_payment};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MONTHS_PER_YEAR: u32 = 12;
/// Terms beyond this are accepted but flagged by `analyze_loan`.
pub const LONG_TERM_WARNING_MONTHS: u32 = 1_200;

const PERCENT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermUnit {
    #[default]
    Years,
    Months,
}

impl TermUnit {
    /// `term` expressed in months, `None` if it does not fit in a `u32`.
    pub fn to_months(self, term: u32) -> Option<u32> {
        match self {
            TermUnit::Years => term.checked_mul(MONTHS_PER_YEAR),
            TermUnit::Months => Some(term),
        }
    }
}

impl FromStr for TermUnit {
    type Err = LoanCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "years" | "year" | "y" => Ok(TermUnit::Years),
            "months" | "month" | "m" => Ok(TermUnit::Months),
            _ => Err(LoanCalcError::InvalidInput {
                field: "term_unit".into(),
                reason: format!("Unknown term unit '{s}'. Use: years, months"),
            }),
        }
    }
}

/// Purpose of the loan. Carried through for display only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    #[default]
    Home,
    Car,
    Personal,
    Education,
    Business,
}

impl LoanType {
    pub fn label(&self) -> &'static str {
        match self {
            LoanType::Home => "Home Loan",
            LoanType::Car => "Car Loan",
            LoanType::Personal => "Personal Loan",
            LoanType::Education => "Education Loan",
            LoanType::Business => "Business Loan",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LoanType {
    type Err = LoanCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" | "mortgage" => Ok(LoanType::Home),
            "car" | "auto" => Ok(LoanType::Car),
            "personal" => Ok(LoanType::Personal),
            "education" | "student" => Ok(LoanType::Education),
            "business" => Ok(LoanType::Business),
            _ => Err(LoanCalcError::InvalidInput {
                field: "loan_type".into(),
                reason: format!(
                    "Unknown loan type '{s}'. Use: home, car, personal, education, business"
                ),
            }),
        }
    }
}

/// Loan as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Amount borrowed.
    pub principal: Money,
    /// Nominal annual rate in percent (5.5 = 5.5%), compounded monthly.
    pub annual_rate_pct: Decimal,
    pub term: u32,
    #[serde(default)]
    pub term_unit: TermUnit,
    /// Added to the principal portion of every monthly payment.
    #[serde(default)]
    pub extra_monthly_payment: Money,
    /// Date of the first payment.
    pub start_date: NaiveDate,
    #[serde(default)]
    pub loan_type: LoanType,
    #[serde(default)]
    pub currency: Currency,
}

impl LoanParameters {
    /// Term converted to months, `None` if it does not fit in a `u32`.
    pub fn term_months(&self) -> Option<u32> {
        self.term_unit.to_months(self.term)
    }

    /// Check the parameters and return the term in months.
    pub fn validate(&self) -> LoanCalcResult<u32> {
        if self.principal < Decimal::ZERO {
            return Err(LoanCalcError::InvalidInput {
                field: "principal".into(),
                reason: "Loan amount cannot be negative".into(),
            });
        }
        if self.annual_rate_pct < Decimal::ZERO {
            return Err(LoanCalcError::InvalidInput {
                field: "annual_rate_pct".into(),
                reason: "Interest rate cannot be negative".into(),
            });
        }
        if self.extra_monthly_payment < Decimal::ZERO {
            return Err(LoanCalcError::InvalidInput {
                field: "extra_monthly_payment".into(),
                reason: "Extra payment cannot be negative".into(),
            });
        }
        match self.term_months() {
            Some(0) => Err(LoanCalcError::InvalidInput {
                field: "term".into(),
                reason: "Term must be at least 1 month".into(),
            }),
            Some(months) => Ok(months),
            None => Err(LoanCalcError::InvalidInput {
                field: "term".into(),
                reason: format!("Term of {} years does not fit in 32-bit months", self.term),
            }),
        }
    }
}

/// Split of lifetime payments between principal and interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub principal: Money,
    pub interest: Money,
    /// Share of total payments going to principal, in percent.
    pub principal_pct: Decimal,
    pub interest_pct: Decimal,
}

/// Everything the caller renders for one set of parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationResult {
    /// Level payment before any extra principal.
    pub monthly_payment: Money,
    pub total_interest: Money,
    /// principal + total_interest.
    pub total_payment: Money,
    pub schedule: Vec<PaymentRecord>,
    pub yearly_summaries: Vec<YearlySummary>,
    /// The schedule stopped before the balance reached zero.
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

impl AmortizationResult {
    /// Result shown while the inputs are invalid.
    pub fn zeroed() -> Self {
        AmortizationResult {
            monthly_payment: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            total_payment: Decimal::ZERO,
            schedule: Vec::new(),
            yearly_summaries: Vec::new(),
            truncated: false,
            payoff_date: None,
        }
    }

    pub fn num_payments(&self) -> usize {
        self.schedule.len()
    }

    pub fn breakdown(&self) -> PaymentBreakdown {
        let principal = self.total_payment - self.total_interest;
        let (principal_pct, interest_pct) = if self.total_payment.is_zero() {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            (
                principal / self.total_payment * PERCENT,
                self.total_interest / self.total_payment * PERCENT,
            )
        };
        PaymentBreakdown {
            principal,
            interest: self.total_interest,
            principal_pct,
            interest_pct,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Amortize `params`. Invalid parameters yield [`AmortizationResult::zeroed`]
/// instead of an error, so a half-filled form always renders.
pub fn compute_amortization(params: &LoanParameters) -> AmortizationResult {
    match amortize(params) {
        Ok(amortized) => amortized.result,
        Err(e) => {
            tracing::debug!(error = %e, "loan parameters rejected, returning zeroed result");
            AmortizationResult::zeroed()
        }
    }
}

/// Amortize `params`, reporting invalid parameters as errors and a
/// non-amortizing schedule as a warning.
pub fn analyze_loan(
    params: &LoanParameters,
) -> LoanCalcResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let Amortized {
        term_months,
        periodic_rate,
        result,
    } = amortize(params)?;

    if result.truncated {
        warnings.push(format!(
            "Schedule stopped after {} payments with a balance outstanding; \
             the payment does not amortize the loan",
            result.num_payments()
        ));
    }
    if term_months > LONG_TERM_WARNING_MONTHS {
        warnings.push(format!(
            "Term of {term_months} months exceeds {LONG_TERM_WARNING_MONTHS} months"
        ));
    }
    if params.principal.is_zero() {
        warnings.push("Loan amount is zero; nothing to amortize".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization with monthly compounding and extra principal",
        &serde_json::json!({
            "principal": params.principal.to_string(),
            "annual_rate_pct": params.annual_rate_pct.to_string(),
            "periodic_rate": periodic_rate.to_string(),
            "term_months": term_months,
            "extra_monthly_payment": params.extra_monthly_payment.to_string(),
            "start_date": params.start_date.to_string(),
            "loan_type": params.loan_type.label(),
            "currency": params.currency.code(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// A computed result together with the derived terms it was built from.
struct Amortized {
    term_months: u32,
    periodic_rate: Rate,
    result: AmortizationResult,
}

fn amortize(params: &LoanParameters) -> LoanCalcResult<Amortized> {
    let term_months = params.validate()?;
    let periodic_rate = periodic_rate_from_annual_pct(params.annual_rate_pct, MONTHS_PER_YEAR)?;
    let monthly_payment = solve_periodic_payment(params.principal, periodic_rate, term_months)?;

    let schedule = generate_schedule(&ScheduleTerms {
        principal: params.principal,
        periodic_rate,
        periodic_payment: monthly_payment,
        extra_payment: params.extra_monthly_payment,
        start_date: params.start_date,
        nominal_term_periods: term_months,
    });

    let total_interest = schedule
        .last()
        .map(|r| r.cumulative_interest)
        .unwrap_or(Decimal::ZERO);
    // Saturating: a principal near Decimal::MAX still returns its schedule.
    let total_payment = params.principal.saturating_add(total_interest);
    let truncated = schedule.is_truncated();
    let payoff_date = if truncated {
        None
    } else {
        schedule.last().map(|r| r.payment_date)
    };
    let yearly_summaries = aggregate_by_year(&schedule.records);

    Ok(Amortized {
        term_months,
        periodic_rate,
        result: AmortizationResult {
            monthly_payment,
            total_interest,
            total_payment,
            schedule: schedule.records,
            yearly_summaries,
            truncated,
            payoff_date,
        },
    })
}
