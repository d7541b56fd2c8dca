use serde_json::Value;

/// Headline figure of each command, in lookup order.
const PRIORITY_POINTERS: [&str; 7] = [
    "/interest_saved",
    "/reduce_term/interest_saved",
    "/total_credit_paid",
    "/payment",
    "/summary/total_periodic_payment",
    "/period_rate_pct",
    "/table/rows/0/total_paid",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match headline(result_obj) {
        Some(val) => println!("{}", format_minimal(val)),
        None => println!("{}", format_minimal(result_obj)),
    }
}

fn headline(result: &Value) -> Option<&Value> {
    PRIORITY_POINTERS
        .iter()
        .filter_map(|ptr| result.pointer(ptr))
        .find(|v| !v.is_null())
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
