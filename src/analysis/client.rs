//! Analysis service clients.
//!
//! The orchestrator talks to the service through [`AnalysisClient`], which
//! has two implementations:
//!
//! - [`ClaudeAnalyst`]: calls the Anthropic Messages API over HTTPS. Only
//!   constructed when a credential is configured.
//! - [`NullAnalyst`]: never available. Used when there is no credential, so
//!   the orchestrator decides by capability and never by a failed call.
//!
//! [`detect_client`] picks between them.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;

/// Anthropic API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

// =============================================================================
// Errors
// =============================================================================

/// Failures talking to the analysis service.
///
/// These never reach the caller of the orchestrator; they exist so the
/// fallback path can log what went wrong.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No API key configured.
    #[error("No credential configured (set {env_var})")]
    MissingCredential { env_var: String },

    /// HTTP client could not be constructed.
    #[error("HTTP client setup failed: {message}")]
    ClientSetup { message: String },

    /// Request exceeded the client timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Network/connection error.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Service answered with a non-success status.
    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected shape.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },
}

// =============================================================================
// Client Trait
// =============================================================================

/// A service that turns a prompt into free text.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Whether a call could be attempted at all.
    fn is_available(&self) -> bool;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Send one prompt and return the response text.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable, rejects the request,
    /// times out, or answers with an unreadable body.
    async fn complete(&self, prompt: &str) -> Result<String, AnalysisError>;
}

// =============================================================================
// Claude Analyst
// =============================================================================

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Client for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct ClaudeAnalyst {
    api_key: String,
    model: String,
    max_tokens: u32,
    endpoint: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl ClaudeAnalyst {
    /// Create a client from settings and an API key.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ClientSetup`] if the HTTP client cannot be
    /// built (e.g. no TLS backend).
    pub fn new(api_key: impl Into<String>, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::ClientSetup {
                message: e.to_string(),
            })?;

        Ok(Self {
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            endpoint: config.endpoint.clone(),
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            AnalysisError::Connection {
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl AnalysisClient for ClaudeAnalyst {
    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, AnalysisError> {
        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{
                "role": "user",
                "content": prompt
            }]
        });

        debug!(
            "Requesting analysis from {} ({} chars prompt)",
            self.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse =
            response
                .json()
                .await
                .map_err(|e| AnalysisError::MalformedResponse {
                    message: e.to_string(),
                })?;

        let text: Vec<String> = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(AnalysisError::MalformedResponse {
                message: "response contained no text content".to_string(),
            });
        }

        Ok(text.join("\n"))
    }
}

// =============================================================================
// Null Analyst
// =============================================================================

/// Stand-in client used when no credential is configured.
#[derive(Debug, Clone)]
pub struct NullAnalyst {
    env_var: String,
}

impl NullAnalyst {
    /// `env_var` names the variable that would have held the credential.
    #[must_use]
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }
}

impl Default for NullAnalyst {
    fn default() -> Self {
        Self::new(AnalysisConfig::default().api_key_env)
    }
}

#[async_trait]
impl AnalysisClient for NullAnalyst {
    fn is_available(&self) -> bool {
        false
    }

    fn model_name(&self) -> &str {
        "none"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, AnalysisError> {
        Err(AnalysisError::MissingCredential {
            env_var: self.env_var.clone(),
        })
    }
}

// =============================================================================
// Capability Probe
// =============================================================================

/// Pick a client based on whether a credential is configured.
#[must_use]
pub fn detect_client(config: &AnalysisConfig) -> Box<dyn AnalysisClient> {
    client_for_key(config.api_key(), config)
}

/// Pick a client for an explicit (possibly absent) credential.
#[must_use]
pub fn client_for_key(api_key: Option<String>, config: &AnalysisConfig) -> Box<dyn AnalysisClient> {
    let Some(key) = api_key.filter(|k| !k.trim().is_empty()) else {
        debug!("{} not set, AI analysis disabled", config.api_key_env);
        return Box::new(NullAnalyst::new(&config.api_key_env));
    };

    match ClaudeAnalyst::new(key, config) {
        Ok(analyst) => Box::new(analyst),
        Err(e) => {
            warn!("AI analysis disabled: {}", e);
            Box::new(NullAnalyst::new(&config.api_key_env))
        }
    }
}
