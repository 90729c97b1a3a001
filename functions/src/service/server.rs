use std::convert::Infallible;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cragcore::interface::{
    DetectHoldsRequest, DetectHoldsResponse, FunctionError, SecretsRequest, SecretsResponse,
};
use cragcore::telemetry::{LogManager, MetricsRecorder};
use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::service::config::FunctionsConfig;
use crate::vision::VisionClient;

/// Shared state behind every function route.
pub struct FunctionsState {
    config: FunctionsConfig,
    vision: VisionClient,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl FunctionsState {
    pub fn new(config: FunctionsConfig) -> Self {
        let vision = VisionClient::new(
            config.vision.clone(),
            config.vision_api_key().map(str::to_string),
        );
        Self {
            config,
            vision,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("functions"),
        }
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }
}

pub fn routes(
    state: Arc<FunctionsState>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let body_limit = state.config.max_body_bytes;
    let state_filter = warp::any().map(move || state.clone());

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["authorization", "x-client-info", "apikey", "content-type"])
        .allow_methods(vec!["POST", "GET", "OPTIONS"]);

    let detect_route = warp::path("detect-holds")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(body_limit))
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(detect_holds);

    let secrets_route = warp::path("get-secrets")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(body_limit))
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(get_secrets);

    let metrics_route = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter)
        .map(|state: Arc<FunctionsState>| warp::reply::json(&state.metrics.snapshot()));

    detect_route
        .or(secrets_route)
        .or(metrics_route)
        .recover(handle_rejection)
        .with(cors)
        .recover(handle_rejection)
}

async fn detect_holds(
    request: DetectHoldsRequest,
    state: Arc<FunctionsState>,
) -> Result<Response, Infallible> {
    let request = DetectHoldsRequest::new(request.image);
    if request.image.trim().is_empty() || STANDARD.decode(request.image.as_bytes()).is_err() {
        state.metrics.record_failed();
        state.logger.warn("detect-holds: rejected image that is not base64");
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            "image must be base64 encoded",
        ));
    }

    match state.vision.detect(&request.image).await {
        Ok(holds) => {
            state.metrics.record_handled();
            state
                .logger
                .record(&format!("detect-holds: {} holds", holds.len()));
            Ok(json_reply(&DetectHoldsResponse { holds }, StatusCode::OK))
        }
        Err(err) => {
            state.metrics.record_failed();
            state.logger.warn(&format!("detect-holds: {:#}", err));
            Ok(error_reply(StatusCode::BAD_GATEWAY, &format!("{:#}", err)))
        }
    }
}

async fn get_secrets(
    request: SecretsRequest,
    state: Arc<FunctionsState>,
) -> Result<Response, Infallible> {
    let secrets: SecretsResponse = state.config.select_secrets(&request.keys);
    state.metrics.record_handled();
    state.logger.record(&format!(
        "get-secrets: {} of {} keys",
        secrets.len(),
        request.keys.len()
    ));
    Ok(json_reply(&secrets, StatusCode::OK))
}

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn error_reply(status: StatusCode, message: &str) -> Response {
    json_reply(
        &FunctionError {
            error: message.to_string(),
        },
        status,
    )
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(body) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, body.to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "request body too large".to_string())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "content-length required".to_string())
    } else if err.find::<warp::cors::CorsForbidden>().is_some() {
        (StatusCode::FORBIDDEN, "origin or header not allowed".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err))
    };
    Ok(error_reply(status, &message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::net::SocketAddr;

    fn spawn_vision(reply: Value) -> SocketAddr {
        let route = warp::post().map(move || warp::reply::json(&reply));
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn state_with(endpoint: Option<String>) -> Arc<FunctionsState> {
        let mut config = FunctionsConfig::default();
        config
            .secrets
            .insert("GOOGLE_MAPS_API_KEY".into(), "maps".into());
        if let Some(endpoint) = endpoint {
            config.vision.endpoint = endpoint;
            config.vision.api_key = Some("vision".into());
        }
        Arc::new(FunctionsState::new(config))
    }

    #[tokio::test]
    async fn detect_holds_returns_centers() {
        let addr = spawn_vision(json!({"responses": [{"localizedObjectAnnotations": [
            {"name": "Hold", "score": 0.7, "boundingPoly": {"normalizedVertices": [
                {"x": 0.4, "y": 0.4}, {"x": 0.6, "y": 0.6}]}}
        ]}]}));
        let state = state_with(Some(format!("http://{}/v1/images:annotate", addr)));
        let api = routes(state.clone());

        let response = warp::test::request()
            .method("POST")
            .path("/detect-holds")
            .json(&json!({"image": "data:image/jpeg;base64,/9j/4AAQ"}))
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: DetectHoldsResponse = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body.holds.len(), 1);
        assert!((body.holds[0].x - 0.5).abs() < 1e-6);
        assert_eq!(state.metrics().snapshot().handled, 1);
    }

    #[tokio::test]
    async fn invalid_image_is_a_bad_request() {
        let state = state_with(None);
        let api = routes(state.clone());
        let response = warp::test::request()
            .method("POST")
            .path("/detect-holds")
            .json(&json!({"image": "not base64 at all!"}))
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.metrics().snapshot().failed, 1);
    }

    #[tokio::test]
    async fn missing_image_field_is_a_bad_request() {
        let api = routes(state_with(None));
        let response = warp::test::request()
            .method("POST")
            .path("/detect-holds")
            .json(&json!({}))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn vision_failure_is_a_bad_gateway() {
        let api = routes(state_with(None));
        let response = warp::test::request()
            .method("POST")
            .path("/detect-holds")
            .json(&json!({"image": "AAAA"}))
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: FunctionError = serde_json::from_slice(response.body()).unwrap();
        assert!(body.error.contains("API key"));
    }

    #[tokio::test]
    async fn secrets_only_returns_known_keys() {
        let api = routes(state_with(None));
        let response = warp::test::request()
            .method("POST")
            .path("/get-secrets")
            .json(&json!({"keys": ["GOOGLE_MAPS_API_KEY", "STRIPE_KEY"]}))
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({"GOOGLE_MAPS_API_KEY": "maps"}));
    }

    #[tokio::test]
    async fn preflight_allows_client_headers() {
        let api = routes(state_with(None));
        let response = warp::test::request()
            .method("OPTIONS")
            .path("/get-secrets")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "authorization, apikey, content-type")
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn metrics_report_counts() {
        let state = state_with(None);
        let api = routes(state.clone());
        state.metrics().record_handled();

        let response = warp::test::request()
            .method("GET")
            .path("/metrics")
            .reply(&api)
            .await;
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({"handled": 1, "failed": 0}));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let api = routes(state_with(None));
        let response = warp::test::request()
            .method("POST")
            .path("/nope")
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn error_replies_carry_cors_headers() {
        let api = routes(state_with(None));
        let missing = warp::test::request()
            .method("POST")
            .path("/nope")
            .header("origin", "http://localhost:5173")
            .reply(&api)
            .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert!(missing.headers().contains_key("access-control-allow-origin"));

        let malformed = warp::test::request()
            .method("POST")
            .path("/get-secrets")
            .header("origin", "http://localhost:5173")
            .json(&json!({"keys": "GOOGLE_MAPS_API_KEY"}))
            .reply(&api)
            .await;
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
        assert!(malformed.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn oversized_bodies_are_refused() {
        let mut config = FunctionsConfig::default();
        config.max_body_bytes = 64;
        let state = Arc::new(FunctionsState::new(config));
        let api = routes(state.clone());

        let response = warp::test::request()
            .method("POST")
            .path("/detect-holds")
            .header("origin", "http://localhost:5173")
            .json(&json!({"image": "A".repeat(256)}))
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.headers().contains_key("access-control-allow-origin"));
        assert_eq!(state.metrics().snapshot().failed, 0);
    }
}
