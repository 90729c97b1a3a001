pub mod config;
pub mod server;

pub use config::FunctionsConfig;
pub use server::{routes, FunctionsState};
