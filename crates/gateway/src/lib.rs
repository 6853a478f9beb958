//! # Gateway
//!
//! Messaging gateway clients.
//!
//! - `HttpGateway`: REST client (`/status`, `/send-message`, `/send-file`, session and
//!   number-analysis endpoints)
//! - `MockGateway`: scriptable in-memory client for tests
//!
//! Both implement `contracts::GatewayClient`, the only surface the dispatch engine uses.

mod error;
mod http;
mod mock;
mod types;

pub use error::{GatewayError, Result};
pub use http::HttpGateway;
pub use mock::{GatewayCall, MockConfig, MockGateway};
pub use types::{BatchAnalysis, BatchStats, CountryInfo, GatewayStatus, NumberAnalysis, QrCode};
