//! Hosted-backend side of the bouldering tracker: the REST data gateway and
//! clients for the hold-detection, secrets and geocoding services.

pub mod config;
pub mod functions;
pub mod geocode;
pub mod rest;
pub mod rows;

pub use config::ClientConfig;
pub use functions::{FunctionsClient, HoldDetector, SecretsClient};
pub use geocode::Geocoder;
pub use rest::RestGateway;
