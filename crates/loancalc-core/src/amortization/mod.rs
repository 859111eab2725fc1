//! Loan amortization: level-payment schedules with extra principal
//! payments, yearly aggregation and quick payment quotes.

pub mod loan;
pub mod quote;
pub mod schedule;
pub mod yearly;

pub use loan::{
    analyze_loan, compute_amortization, AmortizationResult, LoanParameters, LoanType, TermUnit,
};
pub use schedule::{generate_schedule, PaymentRecord, Schedule, ScheduleTerms, Termination};
pub use yearly::{aggregate_by_year, YearlySummary};
