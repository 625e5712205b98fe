//! HttpBackendGateway - JSON over HTTP implementation of [`BackendGateway`].
//!
//! Each action is POSTed to its own route under the configured base URL.
//! Besides the camelCase request fields, the body repeats the problem, the
//! user's message and the skill level under the snake_case names the mentor
//! backend's request models declare.

use async_trait::async_trait;
use coach_core::gateway::{
    BackendGateway, GatewayAction, GatewayError, GatewayRequest, GatewayResponse,
};
use coach_core::skill::SkillLevel;
use coach_infrastructure::config::BackendConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Gateway that talks to the mentor backend over HTTP.
#[derive(Clone)]
pub struct HttpBackendGateway {
    client: Client,
    base_url: String,
    routes: HashMap<GatewayAction, String>,
}

impl HttpBackendGateway {
    /// Creates a gateway from the `[backend]` configuration section.
    pub fn new(config: &BackendConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| GatewayError::Transport(format!("Failed to build HTTP client: {err}")))?;

        let routes = GatewayAction::ALL
            .into_iter()
            .map(|action| (action, config.route(action).to_string()))
            .collect();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            routes,
        })
    }

    /// Creates a gateway with default routes against `base_url`.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let config = BackendConfig {
            base_url: base_url.into(),
            timeout_secs: timeout.as_secs(),
            ..BackendConfig::default()
        };
        Self::new(&config)
    }

    /// Full URL the given action is sent to.
    pub fn endpoint(&self, action: GatewayAction) -> String {
        let route = self
            .routes
            .get(&action)
            .map(String::as_str)
            .unwrap_or_default();
        if route.starts_with('/') {
            format!("{}{}", self.base_url, route)
        } else {
            format!("{}/{}", self.base_url, route)
        }
    }

    async fn send_request(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let url = self.endpoint(request.action);
        tracing::debug!(
            "[HttpGateway] POST {} (problem: {})",
            url,
            request.problem_id
        );

        let response = self
            .client
            .post(&url)
            .json(&WireRequest::from(request))
            .send()
            .await
            .map_err(|err| {
                let kind = if err.is_timeout() { "timed out" } else { "failed" };
                GatewayError::Transport(format!("request to {url} {kind}: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read backend error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let body_text = response
            .text()
            .await
            .map_err(|err| GatewayError::Transport(format!("Failed to read backend reply: {err}")))?;

        decode_reply(&body_text)
    }
}

#[async_trait]
impl BackendGateway for HttpBackendGateway {
    async fn send(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let result = self.send_request(request).await;
        if let Err(e) = &result {
            tracing::warn!("[HttpGateway] {} request failed: {}", request.action, e);
        }
        result
    }
}

/// Request body as sent over the wire.
#[derive(Serialize)]
struct WireRequest<'a> {
    #[serde(flatten)]
    request: &'a GatewayRequest,
    problem_description: &'a str,
    user_input: &'a str,
    skill_level: SkillLevel,
}

impl<'a> From<&'a GatewayRequest> for WireRequest<'a> {
    fn from(request: &'a GatewayRequest) -> Self {
        Self {
            request,
            problem_description: &request.problem_description,
            user_input: request.message.as_deref().unwrap_or_default(),
            skill_level: request.skill_level,
        }
    }
}

/// Error bodies produced by the backend framework or its handlers.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    error: Option<String>,
}

fn decode_reply(body: &str) -> Result<GatewayResponse, GatewayError> {
    if body.trim().is_empty() {
        return Ok(GatewayResponse::default());
    }
    serde_json::from_str(body)
        .map_err(|err| GatewayError::Decode(format!("Failed to parse backend reply: {err}")))
}

fn map_http_error(status: StatusCode, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|wrapper| {
            wrapper.error.or_else(|| {
                wrapper.detail.map(|detail| match detail {
                    serde_json::Value::String(text) => text,
                    other => other.to_string(),
                })
            })
        })
        .unwrap_or_else(|| body.trim().to_string());

    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        message
    };

    GatewayError::Status {
        status: status.as_u16(),
        message,
    }
}
