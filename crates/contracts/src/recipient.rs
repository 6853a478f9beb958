//! Recipient and Attachment - Recipient Source / job inputs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ContractError;

/// One target phone number derived from an input row
///
/// Immutable once the run starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    /// Cell text as read from the spreadsheet
    pub raw_input: String,

    /// Number handed to the gateway
    pub normalized_number: String,
}

impl Recipient {
    pub fn new(raw_input: impl Into<String>, normalized_number: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            normalized_number: normalized_number.into(),
        }
    }

    /// Recipient whose raw and normalized forms coincide
    pub fn from_number(number: impl Into<String>) -> Self {
        let number = number.into();
        Self {
            raw_input: number.clone(),
            normalized_number: number,
        }
    }
}

/// File attachment handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Location on disk
    pub path: PathBuf,

    /// File name sent in the multipart part
    pub file_name: String,
}

impl Attachment {
    /// Create a handle without touching the filesystem
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("attachment")
            .to_string();
        Self { path, file_name }
    }

    /// Create a handle, checking that the file exists
    ///
    /// # Errors
    /// `AttachmentNotFound` when the path is missing or not a regular file
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        if !path.is_file() {
            return Err(ContractError::AttachmentNotFound {
                path: path.display().to_string(),
            });
        }
        Ok(Self::new(path))
    }
}
