//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the batch messenger.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Run Model
//! - A `DispatchJob` is consumed by exactly one run
//! - Every attempt produces one `AttemptResult`
//! - Every finalized recipient produces exactly one `RecipientOutcome`

mod config;
mod error;
mod gateway;
mod job;
mod outcome;
mod recipient;
mod run;

pub use config::*;
pub use error::*;
pub use gateway::{GatewayClient, LocalGatewayClient, SendReceipt};
pub use job::*;
pub use outcome::*;
pub use recipient::*;
pub use run::*;
