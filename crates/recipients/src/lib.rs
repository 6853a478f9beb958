//! # Recipients
//!
//! Recipient Source: turns a spreadsheet into an ordered recipient list.
//!
//! Responsibilities:
//! - Detect the tabular format (CSV / Excel)
//! - Read the first column, skipping the header row
//! - Normalize cells and drop blanks
//! - Reject inputs with no usable values
//!
//! Deduplication is a separate step (`dedupe`) left to the caller.

mod csv_reader;
mod format;
mod normalize;
mod spreadsheet;

pub use format::TabularFormat;
pub use normalize::{dedupe, normalize_number};

use contracts::{ContractError, Recipient};
use std::path::Path;
use tracing::{debug, instrument};

/// Recipient Source
pub struct RecipientSource;

impl RecipientSource {
    /// Load recipients from a file, format inferred from the extension
    ///
    /// # Errors
    /// - `InvalidFormat`: unknown extension or undecodable content
    /// - `EmptyInput`: no non-blank value in the first column
    /// - `Io`: file cannot be read
    #[instrument(name = "recipients_load", skip_all, fields(path = %path.display()))]
    pub fn load_from_path(path: &Path) -> Result<Vec<Recipient>, ContractError> {
        let format = TabularFormat::from_path(path)?;
        let bytes = std::fs::read(path)?;
        let recipients = Self::parse(&bytes, format)?;
        debug!(count = recipients.len(), ?format, "recipients loaded");
        Ok(recipients)
    }

    /// Parse raw bytes of a known format
    pub fn parse(bytes: &[u8], format: TabularFormat) -> Result<Vec<Recipient>, ContractError> {
        let recipients = match format {
            TabularFormat::Csv => csv_reader::read_first_column(bytes)?,
            TabularFormat::Spreadsheet => spreadsheet::read_first_column(bytes)?,
        };
        if recipients.is_empty() {
            return Err(ContractError::EmptyInput);
        }
        Ok(recipients)
    }
}
