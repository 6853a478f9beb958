//! Excel first-sheet reader

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use contracts::{ContractError, Recipient};
use std::io::Cursor;

use crate::normalize::recipient_from_cell;

/// Largest float that still converts to an exact integer string
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Read the first column of the first worksheet; the header row is skipped
pub fn read_first_column(bytes: &[u8]) -> Result<Vec<Recipient>, ContractError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ContractError::invalid_format(format!("cannot open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ContractError::invalid_format("workbook has no worksheets"))?
        .map_err(|e| ContractError::invalid_format(format!("cannot read first worksheet: {e}")))?;

    let recipients = range
        .rows()
        .skip(1)
        .filter_map(|row| row.first())
        .filter_map(cell_text)
        .filter_map(|text| recipient_from_cell(&text))
        .collect();
    Ok(recipients)
}

/// Coerce one cell to text, `None` for empty and error cells
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT => {
            Some(format!("{}", *f as i64))
        }
        other => Some(other.to_string()),
    }
}
