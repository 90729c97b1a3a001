use serde::{Deserialize, Serialize};

use crate::grips::HoldDetection;

/// Body of `POST /detect-holds`; `image` is base64 without a data-URL prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectHoldsRequest {
    pub image: String,
}

impl DetectHoldsRequest {
    /// Accepts either raw base64 or a `data:image/...;base64,` URL.
    pub fn new(image: impl Into<String>) -> Self {
        let image = image.into();
        let image = match image.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data.to_string(),
            _ => image,
        };
        Self { image }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectHoldsResponse {
    #[serde(default)]
    pub holds: Vec<HoldDetection>,
}

/// Error body returned by both functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionError {
    pub error: String,
}
