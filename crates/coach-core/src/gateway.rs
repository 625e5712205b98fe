//! Contract of the external mentor / code-analysis backend.
//!
//! The core never talks to the network itself; it only knows the request and
//! response shapes and how a reply becomes a transcript turn.

use crate::skill::SkillLevel;
use crate::transcript::Turn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Turn text used when a successful reply carries no text at all.
pub const NO_RESPONSE_TEXT: &str = "no response";

/// What the backend is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayAction {
    Analyze,
    Hint,
    Submit,
    Chat,
}

impl GatewayAction {
    pub const ALL: [GatewayAction; 4] = [
        GatewayAction::Analyze,
        GatewayAction::Hint,
        GatewayAction::Submit,
        GatewayAction::Chat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GatewayAction::Analyze => "analyze",
            GatewayAction::Hint => "hint",
            GatewayAction::Submit => "submit",
            GatewayAction::Chat => "chat",
        }
    }
}

impl fmt::Display for GatewayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatewayAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GatewayAction::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    pub action: GatewayAction,
    pub code: String,
    pub language: String,
    pub problem_id: String,
    /// Statement of the problem, for backends that do not know the catalog.
    #[serde(default)]
    pub problem_description: String,
    #[serde(default)]
    pub skill_level: SkillLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Reply body of the backend.
///
/// The individual backend routes answer in `message`, `hint` or `result`
/// instead of `response`; all of them are read, and a reply may carry several.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GatewayResponse {
    /// Text of a successful reply.
    ///
    /// First present of `feedback`, `response`, `message`, `hint`, `result`,
    /// else a placeholder.
    pub fn text(&self) -> &str {
        [
            &self.feedback,
            &self.response,
            &self.message,
            &self.hint,
            &self.result,
        ]
        .into_iter()
        .find_map(|field| field.as_deref())
        .unwrap_or(NO_RESPONSE_TEXT)
    }
}

/// Failure to obtain a usable reply from the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced an HTTP response
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The reply body could not be decoded
    #[error("unreadable backend reply: {0}")]
    Decode(String),

    /// The backend reported an error in the reply body
    #[error("backend error: {0}")]
    Backend(String),
}

/// Request/response access to the mentor backend.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn send(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError>;
}

/// Turns a gateway outcome into the single assistant turn it produces.
///
/// A reply carrying `error` counts as a failure even on HTTP success.
pub fn reply_turn(outcome: Result<GatewayResponse, GatewayError>) -> Turn {
    let outcome = outcome.and_then(|response| match response.error {
        Some(error) => Err(GatewayError::Backend(error)),
        None => Ok(response),
    });

    match outcome {
        Ok(response) => Turn::assistant(response.text()),
        Err(e) => {
            tracing::warn!("[Gateway] Request failed: {}", e);
            Turn::assistant(failure_text(&e))
        }
    }
}

/// Visible text of the turn recorded for a failed request.
pub fn failure_text(error: &GatewayError) -> String {
    format!("Sorry, the mentor is unavailable right now ({}). Please try again.", error)
}
