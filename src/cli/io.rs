//! JSON I/O handling for CLI
//!
//! - Input: a single JSON object via stdin (may span lines)
//! - Output: a single JSON object via stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::{Map, Value};

use super::errors::{CliError, CliResult};

/// Read the JSON filter object from stdin
pub fn read_request() -> CliResult<Map<String, Value>> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

/// Parse a filter object
pub fn parse_request(input: &str) -> CliResult<Map<String, Value>> {
    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    match serde_json::from_str::<Value>(input)? {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::invalid_input("Input must be a JSON object")),
    }
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
