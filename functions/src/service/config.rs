use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Environment variables with this prefix become secrets, prefix stripped.
pub const SECRET_ENV_PREFIX: &str = "CRAG_SECRET_";

/// Secret consulted when `vision.api_key` is not set.
pub const VISION_KEY_SECRET: &str = "VISION_API_KEY";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisionConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_results: u32,
    pub min_confidence: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".into(),
            api_key: None,
            max_results: 50,
            min_confidence: 0.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FunctionsConfig {
    pub bind: SocketAddr,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: u64,
    pub vision: VisionConfig,
    pub secrets: BTreeMap<String, String>,
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            max_body_bytes: 8 * 1024 * 1024,
            vision: VisionConfig::default(),
            secrets: BTreeMap::new(),
        }
    }
}

impl FunctionsConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading functions config {}", path_ref.display()))?;
        let config: FunctionsConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing functions config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Adds `CRAG_SECRET_*` variables; file entries win on conflict.
    pub fn with_env_secrets<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            if let Some(key) = name.strip_prefix(SECRET_ENV_PREFIX) {
                if !key.is_empty() {
                    self.secrets.entry(key.to_string()).or_insert(value);
                }
            }
        }
        self
    }

    pub fn vision_api_key(&self) -> Option<&str> {
        self.vision
            .api_key
            .as_deref()
            .or_else(|| self.secrets.get(VISION_KEY_SECRET).map(String::as_str))
    }

    /// The requested keys that are configured, nothing else.
    pub fn select_secrets(&self, keys: &[String]) -> BTreeMap<String, String> {
        keys.iter()
            .filter_map(|key| {
                self.secrets
                    .get(key)
                    .map(|value| (key.clone(), value.clone()))
            })
            .collect()
    }
}
