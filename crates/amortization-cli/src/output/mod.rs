pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Render a command result. Decimals arrive as strings and are only rounded
/// by the table view.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}
