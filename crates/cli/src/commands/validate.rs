//! `validate` command implementation.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use recipients::{RecipientSource, TabularFormat};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Numbers shown in the sample
const SAMPLE_SIZE: usize = 5;

/// Validation result for JSON output
#[derive(Debug, Serialize)]
struct ValidationResult {
    valid: bool,
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<RecipientSummary>,
}

#[derive(Debug, Serialize)]
struct RecipientSummary {
    format: String,
    total: usize,
    unique: usize,
    duplicates: usize,
    sample: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(file = %args.file.display(), "Validating recipient file");

    let result = validate_file(&args.file);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Recipient file validation failed")
    }
}

fn validate_file(path: &Path) -> ValidationResult {
    let file = path.display().to_string();

    let format = match TabularFormat::from_path(path) {
        Ok(format) => format,
        Err(e) => return invalid(file, e.to_string()),
    };

    match RecipientSource::load_from_path(path) {
        Ok(recipients) => {
            let mut seen = HashSet::new();
            let unique = recipients
                .iter()
                .filter(|r| seen.insert(r.normalized_number.as_str()))
                .count();
            let duplicates = recipients.len() - unique;

            let mut warnings = Vec::new();
            if duplicates > 0 {
                warnings.push(format!(
                    "{duplicates} repeated number(s), removed at send time unless --keep-duplicates"
                ));
            }
            let short = recipients
                .iter()
                .filter(|r| r.normalized_number.chars().filter(char::is_ascii_digit).count() < 8)
                .count();
            if short > 0 {
                warnings.push(format!("{short} value(s) look too short to be phone numbers"));
            }

            ValidationResult {
                valid: true,
                file,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(RecipientSummary {
                    format: format!("{format:?}"),
                    total: recipients.len(),
                    unique,
                    duplicates,
                    sample: recipients
                        .iter()
                        .take(SAMPLE_SIZE)
                        .map(|r| r.normalized_number.clone())
                        .collect(),
                }),
            }
        }
        Err(e) => invalid(file, e.to_string()),
    }
}

fn invalid(file: String, error: String) -> ValidationResult {
    ValidationResult {
        valid: false,
        file,
        error: Some(error),
        warnings: None,
        summary: None,
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Recipient file is valid: {}", result.file);

        if let Some(ref summary) = result.summary {
            println!("\n  Format: {}", summary.format);
            println!("  Numbers: {}", summary.total);
            println!("  Unique: {}", summary.unique);
            println!("  Sample: {}", summary.sample.join(", "));
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Recipient file is invalid: {}", result.file);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_valid_file_with_duplicates() {
        let file = write_temp(
            ".csv",
            b"phone\n5511999990001\n5511999990002\n5511999990001\n",
        );
        let result = validate_file(file.path());

        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unique, 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.sample.len(), 3);
        assert_eq!(result.warnings.unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_extension() {
        let file = write_temp(".ods", b"whatever");
        let result = validate_file(file.path());
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("invalid recipient file format"));
    }

    #[test]
    fn test_header_only_is_invalid() {
        let file = write_temp(".csv", b"phone\n");
        let result = validate_file(file.path());
        assert!(!result.valid);
        assert!(result.summary.is_none());
    }

    #[test]
    fn test_json_shape() {
        let file = write_temp(".csv", b"phone\n123\n");
        let json = serde_json::to_value(validate_file(file.path())).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["summary"]["format"], "Csv");
        assert!(json.get("error").is_none());
    }
}
