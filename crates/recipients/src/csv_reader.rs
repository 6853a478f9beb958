//! CSV first-column reader

use contracts::{ContractError, Recipient};

use crate::normalize::recipient_from_cell;

/// Read the first column of every data row; the header row is skipped
pub fn read_first_column(bytes: &[u8]) -> Result<Vec<Recipient>, ContractError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut recipients = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            ContractError::invalid_format(format!("csv row {}: {e}", row + 2))
        })?;
        if let Some(recipient) = record.get(0).and_then(recipient_from_cell) {
            recipients.push(recipient);
        }
    }
    Ok(recipients)
}
