//! Command implementations.

mod analyze;
mod send;
mod send_batch;
mod session;
mod status;
mod validate;

pub use analyze::{run_analyze, run_analyze_batch};
pub use send::{run_send_file, run_send_text};
pub use send_batch::run_send_batch;
pub use session::{run_qrcode, run_reset};
pub use status::run_status;
pub use validate::run_validate;

use std::path::Path;

use contracts::Recipient;
use recipients::RecipientSource;

use crate::error::CliError;

/// Read a recipient file, keeping the path in the error
fn load_recipients(path: &Path) -> Result<Vec<Recipient>, CliError> {
    RecipientSource::load_from_path(path).map_err(|e| CliError::recipient_file(path, e.to_string()))
}
