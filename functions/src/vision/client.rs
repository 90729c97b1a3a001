use anyhow::{anyhow, bail, Context};
use cragcore::grips::HoldDetection;

use crate::service::config::VisionConfig;
use crate::vision::annotate::{AnnotateRequest, AnnotateResponse};

/// Calls the object-localization API and turns objects into hold points.
#[derive(Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    config: VisionConfig,
    api_key: Option<String>,
}

impl VisionClient {
    pub fn new(config: VisionConfig, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            api_key,
        }
    }

    pub async fn detect(&self, image_base64: &str) -> anyhow::Result<Vec<HoldDetection>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("vision API key is not configured"))?;

        let body = AnnotateRequest::object_localization(image_base64, self.config.max_results);
        let response = self
            .http
            .post(&self.config.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .context("calling vision API")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("vision API returned {}: {}", status, text);
        }

        let parsed: AnnotateResponse = response
            .json()
            .await
            .context("decoding vision API response")?;
        if let Some(err) = parsed.error() {
            bail!("vision API error {}: {}", err.code, err.message);
        }
        Ok(parsed.into_holds(self.config.min_confidence))
    }
}
