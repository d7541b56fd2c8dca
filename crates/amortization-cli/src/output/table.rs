use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables: scalar fields first, then one table per row set
/// (amortization rows, comparison rows).
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    if let Value::Object(res_map) = result {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        let mut sections: Vec<(String, &[Value])> = Vec::new();
        collect_fields("", res_map, &mut builder, &mut sections);
        println!("{}", Table::from(builder));

        for (title, rows) in sections {
            println!("\n{}:", title);
            print_array_table(rows);
        }
    } else {
        print_flat_object(&Value::Object(envelope.clone()));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Flatten nested objects into dotted field names; arrays of flat objects
/// become their own sections.
fn collect_fields<'a>(
    prefix: &str,
    map: &'a Map<String, Value>,
    builder: &mut Builder,
    sections: &mut Vec<(String, &'a [Value])>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Array(arr) if !arr.is_empty() && arr.iter().all(Value::is_object) => {
                if arr.iter().any(has_nested) {
                    for (i, item) in arr.iter().enumerate() {
                        if let Value::Object(inner) = item {
                            collect_fields(&format!("{name}[{i}]"), inner, builder, sections);
                        }
                    }
                } else {
                    sections.push((name, arr));
                }
            }
            Value::Object(inner) => collect_fields(&name, inner, builder, sections),
            _ => builder.push_record([name, format_value(val)]),
        }
    }
}

fn has_nested(item: &Value) -> bool {
    match item {
        Value::Object(map) => map.values().any(|v| v.is_object() || v.is_array()),
        _ => false,
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
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
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

/// Decimal strings are shown rounded to cents.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => match s.parse::<rust_decimal::Decimal>() {
            Ok(d) if d.scale() > 2 => d.round_dp(2).to_string(),
            _ => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
