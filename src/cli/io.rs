//! JSON output for CLI commands
//!
//! Each command writes exactly one JSON object followed by a newline.

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_response_to(&mut io::stdout(), data)
}

/// Write a success response to `writer`
pub fn write_response_to<W: Write>(writer: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_error_to(&mut io::stdout(), code, message)
}

/// Write an error response to `writer`
pub fn write_error_to<W: Write>(writer: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let mut buf = Vec::new();
        write_response_to(&mut buf, serde_json::json!({"allocation_id": "eipalloc-1"})).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["data"]["allocation_id"], "eipalloc-1");
    }

    #[test]
    fn test_error_shape() {
        let mut buf = Vec::new();
        write_error_to(&mut buf, "CLUSTERWARD_CLI_IO_ERROR", "disk full").unwrap();

        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["code"], "CLUSTERWARD_CLI_IO_ERROR");
        assert_eq!(parsed["message"], "disk full");
    }
}
