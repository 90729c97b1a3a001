//! Wire types shared by the serverless functions and their clients.

pub mod holds;
pub mod secrets;

pub use holds::{DetectHoldsRequest, DetectHoldsResponse, FunctionError};
pub use secrets::{SecretsRequest, SecretsResponse};
