use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeocodeConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://maps.googleapis.com/maps/api/geocode/json".into(),
            api_key: None,
        }
    }
}

/// Where the hosted backend and its functions live.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub anon_key: String,
    /// Defaults to `{base_url}/functions/v1`.
    pub functions_url: Option<String>,
    pub geocode: GeocodeConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".into(),
            anon_key: String::new(),
            functions_url: None,
            geocode: GeocodeConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading client config {}", path_ref.display()))?;
        let config: ClientConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing client config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url.trim_end_matches('/'))
    }

    pub fn functions_url(&self) -> String {
        match &self.functions_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("{}/functions/v1", self.base_url.trim_end_matches('/')),
        }
    }
}
