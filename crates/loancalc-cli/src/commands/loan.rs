use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use colored::Colorize;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::Value;

use loancalc_core::amortization::{
    self, AmortizationResult, LoanParameters, LoanType, PaymentRecord, TermUnit, YearlySummary,
};
use loancalc_core::export;
use loancalc_core::Currency;

use crate::input;

/// Loan definition shared by the amortize, schedule and yearly commands
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long, alias = "principal")]
    pub amount: Option<Decimal>,

    /// Annual interest rate in percent (5.5 = 5.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term, counted in --term-unit
    #[arg(long)]
    pub term: Option<u32>,

    /// Term unit: years, months
    #[arg(long, default_value = "years")]
    pub term_unit: String,

    /// Date of the first payment (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Extra principal paid with every monthly payment
    #[arg(long, default_value = "0")]
    pub extra_payment: Decimal,

    /// Loan type: home, car, personal, education, business
    #[arg(long, default_value = "home")]
    pub loan_type: String,

    /// Currency code used to format amounts (USD, EUR, GBP, JPY, INR, BDT)
    #[arg(long, default_value = "USD")]
    pub currency: String,
}

/// Arguments for a full amortization analysis
#[derive(Args)]
pub struct AmortizeArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Number of schedule rows to show (default 12, 0 hides the schedule)
    #[arg(long, default_value = "12")]
    pub rows: usize,
}

/// Arguments for the payment schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Only emit the first N payments
    #[arg(long)]
    pub rows: Option<usize>,

    /// Also write the full schedule as CSV to this path
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Arguments for yearly principal/interest totals
#[derive(Args)]
pub struct YearlyArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// A schedule row rounded to cents for display.
#[derive(Debug, Serialize)]
struct ScheduleRow {
    month: u32,
    date: NaiveDate,
    payment: Decimal,
    principal: Decimal,
    interest: Decimal,
    remaining_balance: Decimal,
    total_interest_paid: Decimal,
}

#[derive(Debug, Serialize)]
struct YearlyRow {
    year: i32,
    principal: Decimal,
    interest: Decimal,
    total: Decimal,
}

#[derive(Debug, Serialize)]
struct AmortizeSummary {
    loan_type: &'static str,
    currency: String,
    monthly_payment: Decimal,
    monthly_payment_display: String,
    total_interest: Decimal,
    total_interest_display: String,
    total_payment: Decimal,
    total_payment_display: String,
    num_payments: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    payoff_date: Option<NaiveDate>,
    principal_pct: Decimal,
    interest_pct: Decimal,
    truncated: bool,
}

fn cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn schedule_row(record: &PaymentRecord) -> ScheduleRow {
    ScheduleRow {
        month: record.period,
        date: record.payment_date,
        payment: cents(record.total_payment),
        principal: cents(record.principal_portion),
        interest: cents(record.interest_portion),
        remaining_balance: cents(record.remaining_balance),
        total_interest_paid: cents(record.cumulative_interest),
    }
}

fn yearly_row(summary: &YearlySummary) -> YearlyRow {
    YearlyRow {
        year: summary.year,
        principal: cents(summary.principal_paid),
        interest: cents(summary.interest_paid),
        total: cents(summary.total_paid()),
    }
}

fn summarize(params: &LoanParameters, result: &AmortizationResult) -> AmortizeSummary {
    let currency = &params.currency;
    let breakdown = result.breakdown();
    AmortizeSummary {
        loan_type: params.loan_type.label(),
        currency: currency.code().to_string(),
        monthly_payment: cents(result.monthly_payment),
        monthly_payment_display: currency.format_amount(result.monthly_payment),
        total_interest: cents(result.total_interest),
        total_interest_display: currency.format_amount(result.total_interest),
        total_payment: cents(result.total_payment),
        total_payment_display: currency.format_amount(result.total_payment),
        num_payments: result.num_payments(),
        payoff_date: result.payoff_date,
        principal_pct: breakdown.principal_pct.round_dp(2),
        interest_pct: breakdown.interest_pct.round_dp(2),
        truncated: result.truncated,
    }
}

/// Build loan parameters from --input, piped stdin, or individual flags.
fn resolve_params(args: &LoanArgs) -> Result<LoanParameters, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_input(path);
    }
    if args.amount.is_none() {
        if let Some(data) = input::stdin::read_stdin()? {
            return Ok(serde_json::from_value(data)?);
        }
    }

    let term_unit: TermUnit = args.term_unit.parse()?;
    let loan_type: LoanType = args.loan_type.parse()?;
    let currency: Currency = args.currency.parse()?;

    Ok(LoanParameters {
        principal: args
            .amount
            .ok_or("--amount is required (or provide --input)")?,
        annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
        term: args.term.ok_or("--term is required (or provide --input)")?,
        term_unit,
        extra_monthly_payment: args.extra_payment,
        start_date: args
            .start_date
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        loan_type,
        currency,
    })
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve_params(&args.loan)?;
    let output = amortization::analyze_loan(&params)?;
    let result = &output.result;

    let schedule: Vec<ScheduleRow> = result
        .schedule
        .iter()
        .take(args.rows)
        .map(schedule_row)
        .collect();
    let yearly: Vec<YearlyRow> = result.yearly_summaries.iter().map(yearly_row).collect();

    Ok(serde_json::json!({
        "result": summarize(&params, result),
        "yearly": yearly,
        "schedule": schedule,
        "methodology": output.methodology,
        "assumptions": output.assumptions,
        "warnings": output.warnings,
        "metadata": output.metadata,
    }))
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve_params(&args.loan)?;
    let output = amortization::analyze_loan(&params)?;
    let schedule = &output.result.schedule;

    if let Some(ref path) = args.export {
        export::export_schedule_csv(schedule, path)?;
        eprintln!(
            "{} {} payments to {}",
            "exported".green().bold(),
            schedule.len(),
            path.display()
        );
    }

    let limit = args.rows.unwrap_or(schedule.len());
    let rows: Vec<ScheduleRow> = schedule.iter().take(limit).map(schedule_row).collect();

    Ok(serde_json::json!({
        "results": rows,
        "warnings": output.warnings,
    }))
}

pub fn run_yearly(args: YearlyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve_params(&args.loan)?;
    let output = amortization::analyze_loan(&params)?;
    let rows: Vec<YearlyRow> = output
        .result
        .yearly_summaries
        .iter()
        .map(yearly_row)
        .collect();

    Ok(serde_json::json!({
        "results": rows,
        "warnings": output.warnings,
    }))
}
