pub mod annotate;
pub mod client;

pub use client::VisionClient;
