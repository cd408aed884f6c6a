//! JSON output for the CLI
//!
//! - One JSON object per command on stdout
//! - Logs go to stderr and never mix with responses

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::CliResult;

fn write_line<W: Write>(out: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, response)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Success envelope around `data`
pub fn ok_response(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

/// Error envelope
pub fn error_response(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&mut io::stdout().lock(), &ok_response(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&mut io::stdout().lock(), &error_response(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopes() {
        let mut out = Vec::new();
        write_line(&mut out, &ok_response(json!([1, 2]))).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"data\":[1,2],\"status\":\"ok\"}\n");

        let err = error_response("APPY_CLI_IO_ERROR", "boom");
        assert_eq!(err["status"], "error");
        assert_eq!(err["code"], "APPY_CLI_IO_ERROR");
    }
}
