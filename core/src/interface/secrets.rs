use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of `POST /get-secrets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsRequest {
    pub keys: Vec<String>,
}

/// Only the requested keys that the server actually holds.
pub type SecretsResponse = BTreeMap<String, String>;
