use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Sections printed after the summary, in order.
const ROW_SECTIONS: [(&str, &str); 3] = [
    ("yearly", "Yearly totals"),
    ("schedule", "Schedule"),
    ("results", ""),
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    let Value::Object(map) = value else {
        println!("{}", value);
        return;
    };

    if let Some(result) = map.get("result") {
        print_field_table(result);
    }

    for (key, title) in ROW_SECTIONS {
        if let Some(Value::Array(rows)) = map.get(key) {
            if !title.is_empty() {
                println!("\n{}:", title);
            }
            print_array_table(rows);
        }
    }

    print_notes(map);
}

/// Two-column field/value table for a summary object.
fn print_field_table(value: &Value) {
    match value {
        Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in map {
                builder.push_record([key.as_str(), &format_value(val)]);
            }
            println!("{}", Table::from(builder));
        }
        other => println!("{}", format_value(other)),
    }
}

fn print_array_table(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        if arr.is_empty() {
            println!("(empty)");
        }
        for item in arr {
            println!("{}", format_value(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}

fn print_notes(map: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = map.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = map.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_value_variants() {
        assert_eq!(format_value(&json!("567.79")), "567.79");
        assert_eq!(format_value(&json!(360)), "360");
        assert_eq!(format_value(&json!(null)), "-");
        assert_eq!(format_value(&json!(["a", 1])), "a, 1");
    }
}
