use serde_json::{Map, Value};
use std::io;

/// Write output as CSV to stdout.
///
/// A `results` array becomes one line per row. Any other envelope prints its
/// `result` object as field,value pairs; nested rows such as the amortize
/// `schedule` are not expanded (`schedule --output csv` prints those).
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => write_object(&mut wtr, map),
        Value::Array(arr) => write_rows(&mut wtr, arr),
        other => {
            let _ = wtr.write_record([format_csv_value(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_object<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) {
    if let Some(Value::Array(rows)) = map.get("results") {
        write_rows(wtr, rows);
        return;
    }

    let summary = match map.get("result") {
        Some(Value::Object(result)) => result,
        _ => map,
    };
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in summary {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([format_csv_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        match value {
            Value::Object(map) => write_object(&mut wtr, map),
            Value::Array(arr) => write_rows(&mut wtr, arr),
            _ => {}
        }
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_results_rows_become_lines() {
        let value = json!({
            "results": [
                { "year": 2025, "principal": "1200.50", "interest": "300.25" },
                { "year": 2026, "principal": "1300.00", "interest": "200.75" }
            ],
            "warnings": []
        });
        let out = render(&value);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2025,1200.50,300.25");
    }

    #[test]
    fn test_result_object_becomes_field_value_pairs() {
        let value = json!({ "result": { "monthly_payment": "567.79" }, "warnings": [] });
        let out = render(&value);
        assert!(out.starts_with("field,value\n"));
        assert!(out.contains("monthly_payment,567.79"));
    }

    #[test]
    fn test_amortize_envelope_prints_summary_only() {
        let value = json!({
            "result": { "monthly_payment": "567.79", "num_payments": 360 },
            "schedule": [
                { "period": 1, "payment": "567.79" },
                { "period": 2, "payment": "567.79" }
            ],
            "warnings": []
        });
        let out = render(&value);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["field,value", "monthly_payment,567.79", "num_payments,360"]);
    }
}
