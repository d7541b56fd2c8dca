use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Typed document piped on stdin, JSON first and YAML otherwise.
/// An interactive terminal or blank input yields `None`.
pub fn read_piped<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_document(&buffer)
}

fn parse_document<T: DeserializeOwned>(
    text: &str,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| format!("Failed to parse JSON from stdin: {e}").into());
    }
    serde_yaml::from_str(trimmed)
        .map(Some)
        .map_err(|e| format!("Failed to parse YAML from stdin: {e}").into())
}
