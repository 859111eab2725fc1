//! CSV export of an amortization schedule, one row per payment.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::amortization::PaymentRecord;
use crate::currency::plain_amount;
use crate::error::LoanCalcError;
use crate::LoanCalcResult;

pub const SCHEDULE_HEADERS: [&str; 7] = [
    "Month",
    "Date",
    "Payment",
    "Principal",
    "Interest",
    "Remaining Balance",
    "Total Interest Paid",
];

/// Write `schedule` as CSV with amounts rounded to two decimals.
pub fn write_schedule_csv<W: io::Write>(schedule: &[PaymentRecord], writer: W) -> LoanCalcResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SCHEDULE_HEADERS)?;

    for record in schedule {
        wtr.write_record([
            record.period.to_string(),
            record.payment_date.format("%Y-%m-%d").to_string(),
            plain_amount(record.total_payment),
            plain_amount(record.principal_portion),
            plain_amount(record.interest_portion),
            plain_amount(record.remaining_balance),
            plain_amount(record.cumulative_interest),
        ])?;
    }

    wtr.flush().map_err(|e| LoanCalcError::Export(e.to_string()))
}

pub fn schedule_to_csv_string(schedule: &[PaymentRecord]) -> LoanCalcResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    write_schedule_csv(schedule, &mut buf)?;
    String::from_utf8(buf).map_err(|e| LoanCalcError::Export(e.to_string()))
}

/// Write the schedule to `path`, replacing any existing file.
pub fn export_schedule_csv(schedule: &[PaymentRecord], path: &Path) -> LoanCalcResult<()> {
    let file = File::create(path).map_err(|e| {
        LoanCalcError::Export(format!("Failed to create '{}': {}", path.display(), e))
    })?;
    write_schedule_csv(schedule, io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_csv_rows_rounded_to_cents() {
        let schedule = vec![PaymentRecord {
            period: 1,
            payment_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            total_payment: dec!(567.78900134),
            principal_portion: dec!(109.4556680),
            interest_portion: dec!(458.3333333),
            remaining_balance: dec!(99890.544332),
            cumulative_interest: dec!(458.3333333),
        }];
        let csv = schedule_to_csv_string(&schedule).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Month,Date,Payment,Principal,Interest,Remaining Balance,Total Interest Paid"
        );
        assert_eq!(lines[1], "1,2025-01-31,567.79,109.46,458.33,99890.54,458.33");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_empty_schedule_has_header_only() {
        let csv = schedule_to_csv_string(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let err = export_schedule_csv(&[], Path::new("/nonexistent-dir/loan.csv")).unwrap_err();
        assert!(matches!(err, LoanCalcError::Export(_)));
    }
}
