pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Structured input from `--input <file>` or piped stdin, in that order.
/// Returns `None` when neither is present so the caller can fall back to flags.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => file::read_structured(path).map(Some),
        None => stdin::read_piped(),
    }
}
