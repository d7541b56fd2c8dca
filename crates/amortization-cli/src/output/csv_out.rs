use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// Row sets (comparison table, amortization schedule) are written one line
/// per row; anything else falls back to a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let result = map.get("result").unwrap_or(value);
            if let Some(rows) = find_rows(result) {
                write_array_csv(&mut wtr, rows);
            } else if let Value::Object(fields) = result {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in fields {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

/// Comparison rows win over schedule rows; a strategy result carries its
/// schedule one level down.
fn find_rows(result: &Value) -> Option<&[Value]> {
    const CANDIDATES: [&str; 2] = ["/table/rows", "/schedule/rows"];
    CANDIDATES
        .iter()
        .find_map(|ptr| result.pointer(ptr))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
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
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
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

    #[test]
    fn test_find_rows_prefers_comparison_table() {
        let result = json!({
            "table": { "rows": [ { "scenario": "Baseline" } ] },
            "schedule": { "rows": [ { "period": 0 } ] },
        });
        let rows = find_rows(&result).unwrap();
        assert_eq!(rows[0]["scenario"], "Baseline");
    }

    #[test]
    fn test_schedule_rows_written_with_header() {
        let rows = vec![
            json!({ "period": 0, "ending_balance": "1000" }),
            json!({ "period": 1, "ending_balance": "0" }),
        ];
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_array_csv(&mut wtr, &rows);
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("period"));
        assert!(lines[2].split(',').any(|field| field == "1"));
    }
}
