//! Failure export - `number,error` CSV

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::Local;
use contracts::{ContractError, FailureRecord};

const HEADER: [&str; 2] = ["number", "error"];

/// Suffixes tried before giving up on a free file name
const MAX_NAME_SUFFIX: u32 = 999;

/// `failures_<YYYYmmdd_HHMMSS>.csv` inside `directory`
pub fn default_export_path(directory: &Path) -> PathBuf {
    directory.join(format!("{}.csv", export_stem()))
}

fn export_stem() -> String {
    format!("failures_{}", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write (or overwrite) `path` with the header and one row per failure
pub fn write_failures_csv(path: &Path, failures: &[FailureRecord]) -> Result<(), ContractError> {
    let file = File::create(path)
        .map_err(|e| ContractError::export(format!("cannot create {}: {e}", path.display())))?;
    write_records(file, failures)
}

/// Write the failures to a new timestamped file inside `directory`
///
/// Never replaces an existing file: a taken name gets a `_<n>` suffix.
pub fn write_failures_csv_new(
    directory: &Path,
    failures: &[FailureRecord],
) -> Result<PathBuf, ContractError> {
    let stem = export_stem();
    for suffix in 0..=MAX_NAME_SUFFIX {
        let path = match suffix {
            0 => directory.join(format!("{stem}.csv")),
            n => directory.join(format!("{stem}_{n}.csv")),
        };
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                write_records(file, failures)?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(ContractError::export(format!(
                    "cannot create {}: {e}",
                    path.display()
                )))
            }
        }
    }
    Err(ContractError::export(format!(
        "no free export file name for {stem} in {}",
        directory.display()
    )))
}

fn write_records<W: io::Write>(sink: W, failures: &[FailureRecord]) -> Result<(), ContractError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(sink);

    writer
        .write_record(HEADER)
        .map_err(|e| ContractError::export(e.to_string()))?;
    for failure in failures {
        writer
            .write_record([&failure.number, &failure.last_error_message])
            .map_err(|e| ContractError::export(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| ContractError::export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_export_path_shape() {
        let path = default_export_path(Path::new("/tmp/out"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("failures_"));
        assert!(name.ends_with(".csv"));
        // failures_ + YYYYmmdd_HHMMSS + .csv
        assert_eq!(name.len(), "failures_".len() + 15 + ".csv".len());
        assert_eq!(path.parent(), Some(Path::new("/tmp/out")));
    }

    #[test]
    fn test_write_quotes_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.csv");
        let failures = vec![FailureRecord {
            number: "5511".into(),
            last_error_message: "send failed: bad, \"number\"".into(),
        }];

        write_failures_csv(&path, &failures).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "number,error\n5511,\"send failed: bad, \"\"number\"\"\"\n"
        );
    }

    #[test]
    fn test_write_empty_list_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_failures_csv(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "number,error\n");
    }

    #[test]
    fn test_new_export_never_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let first = vec![FailureRecord {
            number: "111".into(),
            last_error_message: "run1".into(),
        }];
        let second = vec![FailureRecord {
            number: "222".into(),
            last_error_message: "run2".into(),
        }];

        let first_path = write_failures_csv_new(dir.path(), &first).unwrap();
        let second_path = write_failures_csv_new(dir.path(), &second).unwrap();

        assert_ne!(first_path, second_path);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        assert_eq!(
            std::fs::read_to_string(&first_path).unwrap(),
            "number,error\n111,run1\n"
        );
        assert_eq!(
            std::fs::read_to_string(&second_path).unwrap(),
            "number,error\n222,run2\n"
        );
    }

    #[test]
    fn test_new_export_missing_directory() {
        let err = write_failures_csv_new(Path::new("/nonexistent/dir"), &[]).unwrap_err();
        assert!(matches!(err, ContractError::Export { .. }));
    }

    #[test]
    fn test_unwritable_path() {
        let err = write_failures_csv(Path::new("/nonexistent/dir/f.csv"), &[]).unwrap_err();
        assert!(matches!(err, ContractError::Export { .. }));
    }
}
