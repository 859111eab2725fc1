use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loancalc_core::amortization::loan::TermUnit;
use loancalc_core::amortization::quote::{self, QuoteInput};

use crate::input;

/// Arguments for a quick monthly payment quote
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PaymentArgs {
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
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let quote_input: QuoteInput = match (&args.input, args.amount) {
        (Some(path), _) => input::file::read_input(path)?,
        (None, None) => match input::stdin::read_stdin()? {
            Some(data) => serde_json::from_value(data)?,
            None => return Err("--amount is required (or provide --input)".into()),
        },
        (None, Some(principal)) => QuoteInput {
            principal,
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            term: args.term.ok_or("--term is required (or provide --input)")?,
            term_unit: args.term_unit.parse::<TermUnit>()?,
        },
    };
    let result = quote::quote_payment(&quote_input)?;
    Ok(serde_json::to_value(result)?)
}
