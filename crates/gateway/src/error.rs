//! Gateway error types

use contracts::{ContractError, SendError};
use thiserror::Error;

/// Errors of the auxiliary (non-dispatch) gateway calls
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP client could not be built
    #[error("failed to build HTTP client: {message}")]
    ClientBuild { message: String },

    /// Call failed at transport level or gateway answered with an error
    #[error(transparent)]
    Send(#[from] SendError),

    /// Response body did not match the expected shape
    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl GatewayError {
    /// Create decode error
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

impl From<GatewayError> for ContractError {
    fn from(err: GatewayError) -> Self {
        ContractError::Other(err.to_string())
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, GatewayError>;
