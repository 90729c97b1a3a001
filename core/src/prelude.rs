use serde::{Deserialize, Serialize};

/// Error type shared by every data-gateway operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("no active session")]
    NotAuthenticated,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected payload: {0}")]
    Decode(String),
    #[error("backend returned {status}: {message}")]
    Remote { status: u16, message: String },
}

impl GatewayError {
    /// Whether the failure means the caller has to sign in again.
    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::NotAuthenticated)
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Raw textual form used when no address can be resolved.
    pub fn to_address_fallback(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lng)
    }
}
