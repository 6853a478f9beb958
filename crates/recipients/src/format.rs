//! Recipient file format detection

use contracts::ContractError;
use std::path::Path;

/// Recognized recipient file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    /// Comma separated values
    Csv,
    /// Excel workbook (`.xlsx`, `.xlsm`, `.xls`)
    Spreadsheet,
}

impl TabularFormat {
    /// Format from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xls" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Format from a path, `InvalidFormat` when unrecognized
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| {
            ContractError::invalid_format(format!(
                "unsupported file '{}': expected .csv, .xlsx or .xls",
                path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(TabularFormat::from_extension("csv"), Some(TabularFormat::Csv));
        assert_eq!(TabularFormat::from_extension("CSV"), Some(TabularFormat::Csv));
        assert_eq!(
            TabularFormat::from_extension("xlsx"),
            Some(TabularFormat::Spreadsheet)
        );
        assert_eq!(
            TabularFormat::from_extension("xls"),
            Some(TabularFormat::Spreadsheet)
        );
        assert_eq!(TabularFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_from_path_without_extension() {
        let err = TabularFormat::from_path(Path::new("numbers")).unwrap_err();
        assert!(matches!(err, ContractError::InvalidFormat { .. }));
    }
}
