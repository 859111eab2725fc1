use napi::Result as NapiResult;
use napi_derive::napi;

use loancalc_core::amortization::{self, LoanParameters};
use loancalc_core::Currency;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_params(input_json: &str) -> NapiResult<LoanParameters> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

/// Forgiving entry point for live forms: invalid parameters produce a zeroed
/// result rather than an exception. Malformed JSON is still an error.
#[napi]
pub fn compute_amortization(input_json: String) -> NapiResult<String> {
    let params = parse_params(&input_json)?;
    let result = amortization::compute_amortization(&params);
    serde_json::to_string(&result).map_err(to_napi_error)
}

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let params = parse_params(&input_json)?;
    let output = amortization::analyze_loan(&params).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn quote_payment(input_json: String) -> NapiResult<String> {
    let input: amortization::quote::QuoteInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::quote::quote_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Export & formatting
// ---------------------------------------------------------------------------

/// Schedule for `input_json` as CSV text, ready for download.
#[napi]
pub fn export_schedule_csv(input_json: String) -> NapiResult<String> {
    let params = parse_params(&input_json)?;
    let result = amortization::compute_amortization(&params);
    loancalc_core::export::schedule_to_csv_string(&result.schedule).map_err(to_napi_error)
}

/// Format `amount` (a decimal string) in `currency_code`, e.g. "$1,234.56".
#[napi]
pub fn format_currency(amount: String, currency_code: String) -> NapiResult<String> {
    let amount: rust_decimal::Decimal = amount.trim().parse().map_err(to_napi_error)?;
    let currency: Currency = currency_code.parse().map_err(to_napi_error)?;
    Ok(currency.format_amount(amount))
}
