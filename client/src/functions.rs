//! Calls into the serverless functions, plus the clients built on them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cragcore::gateway::SessionStore;
use cragcore::grips::HoldDetection;
use cragcore::interface::{
    DetectHoldsRequest, DetectHoldsResponse, FunctionError, SecretsRequest, SecretsResponse,
};
use cragcore::telemetry::LogManager;
use cragcore::{GatewayError, GatewayResult};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;

/// Posts JSON to `{functions_url}/{name}` with the project key and,
/// when signed in, the user's token.
#[derive(Clone)]
pub struct FunctionsClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: SessionStore,
}

impl FunctionsClient {
    pub fn new(config: &ClientConfig, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.functions_url(),
            anon_key: config.anon_key.clone(),
            session,
        }
    }

    pub async fn invoke<B, T>(&self, name: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self
            .session
            .current()
            .map(|session| session.access_token)
            .unwrap_or_else(|| self.anon_key.clone());
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, name))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<FunctionError>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(if status == StatusCode::UNAUTHORIZED {
                GatewayError::NotAuthenticated
            } else {
                GatewayError::Remote {
                    status: status.as_u16(),
                    message,
                }
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|err| GatewayError::Decode(err.to_string()))
    }
}

/// Client of `detect-holds`. Never fails: any error yields no holds so the
/// editor falls back to manual marking.
pub struct HoldDetector {
    functions: FunctionsClient,
    logger: LogManager,
}

impl HoldDetector {
    pub fn new(functions: FunctionsClient) -> Self {
        Self {
            functions,
            logger: LogManager::new("detect-holds"),
        }
    }

    /// `image` is base64 JPEG, optionally as a data URL.
    pub async fn detect(&self, image: &str) -> Vec<HoldDetection> {
        let request = DetectHoldsRequest::new(image);
        match self
            .functions
            .invoke::<_, DetectHoldsResponse>("detect-holds", &request)
            .await
        {
            Ok(response) => {
                self.logger
                    .record(&format!("{} holds detected", response.holds.len()));
                response.holds
            }
            Err(err) => {
                self.logger
                    .warn(&format!("hold detection unavailable: {}", err));
                Vec::new()
            }
        }
    }

    pub async fn detect_jpeg(&self, jpeg: &[u8]) -> Vec<HoldDetection> {
        self.detect(&STANDARD.encode(jpeg)).await
    }
}

/// Client of `get-secrets`.
pub struct SecretsClient {
    functions: FunctionsClient,
}

impl SecretsClient {
    pub fn new(functions: FunctionsClient) -> Self {
        Self { functions }
    }

    /// Only the keys the server holds come back.
    pub async fn fetch<S: AsRef<str>>(&self, keys: &[S]) -> GatewayResult<SecretsResponse> {
        let request = SecretsRequest {
            keys: keys.iter().map(|key| key.as_ref().to_string()).collect(),
        };
        self.functions.invoke("get-secrets", &request).await
    }

    pub async fn fetch_one(&self, key: &str) -> GatewayResult<Option<String>> {
        let mut secrets = self.fetch(&[key]).await?;
        Ok(secrets.remove(key))
    }
}
