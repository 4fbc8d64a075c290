//! Text input and NDJSON output for the CLI
//!
//! - Input: the whole input file, or stdin until EOF
//! - Output: one JSON object per line on stdout, flushed per line

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::audit::AuditLine;

use super::errors::{CliError, CliResult};

/// Read the text to audit from `path`, or stdin when absent.
pub fn read_text(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
        }),
        None => {
            let mut text = String::new();
            io::stdin().lock().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Write one result line and flush so readers see it immediately.
pub fn write_line<W: Write>(out: &mut W, line: &AuditLine) -> CliResult<()> {
    out.write_all(line.to_ndjson().as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Write `value` as a single JSON line.
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)
        .map_err(|e| CliError::io_error(format!("Failed to write result: {}", e)))?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_text_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("essay.txt");
        fs::write(&path, "As shown by Smith (2020), ...").unwrap();
        assert_eq!(
            read_text(Some(&path)).unwrap(),
            "As shown by Smith (2020), ..."
        );
    }

    #[test]
    fn test_read_text_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(Some(&dir.path().join("nope.txt"))).unwrap_err();
        assert_eq!(err.code_str(), "CITEAUDIT_IO_ERROR");
    }

    #[test]
    fn test_write_line_is_newline_terminated() {
        let mut out = Vec::new();
        write_line(&mut out, &AuditLine::error("boom")).unwrap();
        write_line(&mut out, &AuditLine::no_citations()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"error":"boom"}"#);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_write_json_single_line() {
        let mut out = Vec::new();
        write_json(&mut out, &serde_json::json!({"verdict": "True"})).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"verdict\":\"True\"}\n");
    }
}
