use crate::domain::{EngineError, EngineResult};
use std::fs;
use std::path::Path;

const EXPONENT_BELOW: f64 = 1.0e-5;
const EXPONENT_FROM: f64 = 1.0e15;

/// Shortest representation that parses back to the same `f64`, always
/// spelled as a real literal.
pub fn format_real(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(EXPONENT_BELOW..EXPONENT_FROM).contains(&magnitude) {
        return format!("{value:e}");
    }

    let mut text = value.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

pub fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

pub fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = normalize_line_endings(content);
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> EngineResult<()> {
    fs::write(path, normalize_text_artifact(content))
        .map_err(|source| EngineError::io(format!("failed to write '{}'", path.display()), &source))
}

#[cfg(test)]
mod tests {
    use super::{format_real, normalize_text_artifact, quote_text, write_text_artifact};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reals_always_carry_a_decimal_point() {
        assert_eq!(format_real(50.0), "50.0");
        assert_eq!(format_real(0.65), "0.65");
        assert_eq!(format_real(-1.25), "-1.25");
        assert_eq!(format_real(0.0), "0.0");
        assert_eq!(format_real(137.03599), "137.03599");
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        assert_eq!(format_real(1.5e-7), "1.5e-7");
        assert_eq!(format_real(2.0e20), "2e20");
        assert_eq!("1.5e-7".parse::<f64>(), Ok(1.5e-7));
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quote_text("58Ni"), "'58Ni'");
        assert_eq!(quote_text("it's"), "'it''s'");
    }

    #[test]
    fn normalize_text_artifact_uses_canonical_line_endings() {
        let normalized = normalize_text_artifact("alpha\r\nbeta\rgamma");
        assert_eq!(normalized, "alpha\nbeta\ngamma\n");
    }

    #[test]
    fn repeated_text_writes_produce_identical_bytes() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("generated.in");
        let input = "title\r\nNAMELIST\r &FRESCO hcm=0.1 /";

        write_text_artifact(&path, input).expect("first write should succeed");
        let first = fs::read(&path).expect("artifact should be readable");

        write_text_artifact(&path, input).expect("second write should succeed");
        let second = fs::read(&path).expect("artifact should be readable");

        assert_eq!(first, second);
        assert_eq!(second, b"title\nNAMELIST\n &FRESCO hcm=0.1 /\n");
    }

    #[test]
    fn write_failures_are_reported_as_io_errors() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("missing").join("generated.in");

        let error = write_text_artifact(&path, "x").expect_err("write should fail");
        assert_eq!(error.placeholder(), "IO.FILESYSTEM");
        assert_eq!(error.exit_code(), 3);
    }
}
