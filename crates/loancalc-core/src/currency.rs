//! Currency codes and display formatting for monetary amounts.
//!
//! Formatting is purely presentational: amounts are rounded to two
//! fractional digits (half away from zero) and grouped in thousands with
//! en-US separators. The numeric contract of the engine never depends on it.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::types::Money;

/// Fractional digits shown for every currency.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Currency code
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    INR,
    BDT,
    Other(String),
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(&self) -> &str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::INR => "INR",
            Currency::BDT => "BDT",
            Currency::Other(code) => code,
        }
    }

    /// Display symbol. Unknown codes have none and render with the code.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Currency::USD => Some("$"),
            Currency::EUR => Some("€"),
            Currency::GBP => Some("£"),
            Currency::JPY => Some("¥"),
            Currency::INR => Some("₹"),
            Currency::BDT => Some("৳"),
            Currency::Other(_) => None,
        }
    }

    /// Render `amount` as e.g. `$1,234.56`, `-€12.00` or `CHF 1,000.00`.
    pub fn format_amount(&self, amount: Money) -> String {
        let rounded =
            amount.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        let grouped = group_thousands(whole);

        match self.symbol() {
            Some(symbol) => format!("{sign}{symbol}{grouped}.{fraction}"),
            None => format!("{sign}{} {grouped}.{fraction}", self.code()),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = LoanCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        match code.as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "INR" => Ok(Currency::INR),
            "BDT" => Ok(Currency::BDT),
            other if other.len() == 3 && other.chars().all(|c| c.is_ascii_alphabetic()) => {
                Ok(Currency::Other(other.to_string()))
            }
            _ => Err(LoanCalcError::InvalidInput {
                field: "currency".into(),
                reason: format!("'{s}' is not a three-letter currency code"),
            }),
        }
    }
}

/// Insert `,` every three digits from the right.
fn group_thousands(whole: &str) -> String {
    let len = whole.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format `amount` with two fractional digits and no symbol or grouping,
/// as used in exported files.
pub fn plain_amount(amount: Decimal) -> String {
    let rounded =
        amount.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        return "0.00".to_string();
    }
    format!("{:.2}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_usd_groups_thousands() {
        assert_eq!(Currency::USD.format_amount(dec!(1234567.891)), "$1,234,567.89");
    }

    #[test]
    fn test_format_pads_fraction() {
        assert_eq!(Currency::EUR.format_amount(dec!(100)), "€100.00");
        assert_eq!(Currency::JPY.format_amount(dec!(0.5)), "¥0.50");
    }

    #[test]
    fn test_format_negative_and_half_away_from_zero() {
        assert_eq!(Currency::GBP.format_amount(dec!(-12.345)), "-£12.35");
        assert_eq!(Currency::USD.format_amount(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn test_format_unknown_code_uses_code() {
        let chf: Currency = "chf".parse().unwrap();
        assert_eq!(chf, Currency::Other("CHF".into()));
        assert_eq!(chf.format_amount(dec!(1000)), "CHF 1,000.00");
    }

    #[test]
    fn test_parse_known_and_invalid_codes() {
        assert_eq!("inr".parse::<Currency>().unwrap(), Currency::INR);
        assert_eq!(" BDT ".parse::<Currency>().unwrap().symbol(), Some("৳"));
        assert!("dollars".parse::<Currency>().is_err());
    }

    #[test]
    fn test_plain_amount() {
        assert_eq!(plain_amount(dec!(567.7871)), "567.79");
        assert_eq!(plain_amount(dec!(0)), "0.00");
        assert_eq!(plain_amount(dec!(2.005)), "2.01");
        assert_eq!(plain_amount(dec!(-0.004)), "0.00");
    }
}
