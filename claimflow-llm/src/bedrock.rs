//! Bearer-token invoke-model client for Anthropic-format model endpoints.
//!
//! Requests go to `{endpoint}/model/{model_id}/invoke` with a single user
//! message carrying one text block. The first content block of the reply
//! is returned as the generated text. Deployments that authenticate with
//! the AWS credential chain use [`crate::RuntimeClient`] instead.

use std::fmt;
use std::time::Duration;

use claimflow_core::{ClaimflowError, GenerationRequest, ModelInvoker, Value};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
pub const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Clone)]
pub struct BedrockClient {
    base_url: Url,
    bearer_token: Option<SecretString>,
    http: Client,
}

impl fmt::Debug for BedrockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.bearer_token.is_some() {
            "<redacted>"
        } else {
            "<none>"
        };

        f.debug_struct("BedrockClient")
            .field("base_url", &self.base_url.as_str())
            .field("bearer_token", &token)
            .finish()
    }
}

impl BedrockClient {
    pub fn builder() -> BedrockClientBuilder {
        BedrockClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn invoke_url(&self, model_id: &str) -> Result<Url, ClaimflowError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClaimflowError::InvalidConfig(format!(
                    "endpoint '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["model", model_id, "invoke"]);
        Ok(url)
    }
}

#[derive(Default, Clone)]
pub struct BedrockClientBuilder {
    region: Option<String>,
    endpoint: Option<String>,
    bearer_token: Option<SecretString>,
    timeout: Option<Duration>,
}

impl fmt::Debug for BedrockClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.bearer_token.is_some() {
            "<redacted>"
        } else {
            "<none>"
        };

        f.debug_struct("BedrockClientBuilder")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("bearer_token", &token)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BedrockClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, value: impl Into<String>) -> Self {
        self.region = Some(value.into());
        self
    }

    /// Overrides the regional endpoint, e.g. for a proxy or a mock server.
    pub fn endpoint(mut self, value: impl Into<String>) -> Self {
        self.endpoint = Some(value.into());
        self
    }

    pub fn bearer_token(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.bearer_token = if value.trim().is_empty() {
            None
        } else {
            Some(SecretString::new(value))
        };
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = Some(value);
        self
    }

    pub fn build(self) -> Result<BedrockClient, ClaimflowError> {
        let region = self.region.unwrap_or_else(|| DEFAULT_REGION.to_string());
        if region.trim().is_empty() {
            return Err(ClaimflowError::InvalidConfig(
                "region cannot be empty".to_string(),
            ));
        }

        let endpoint = match self.endpoint {
            Some(endpoint) if endpoint.trim().is_empty() => {
                return Err(ClaimflowError::InvalidConfig(
                    "endpoint cannot be empty".to_string(),
                ))
            }
            Some(endpoint) => endpoint,
            None => format!("https://bedrock-runtime.{}.amazonaws.com", region.trim()),
        };
        let base_url = Url::parse(endpoint.trim()).map_err(|err| {
            ClaimflowError::InvalidConfig(format!("invalid endpoint '{endpoint}': {err}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClaimflowError::InvalidConfig(format!(
                "endpoint '{endpoint}' cannot carry a path"
            )));
        }

        let http = Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
            .build()
            .map_err(|err| ClaimflowError::InvalidConfig(err.to_string()))?;

        Ok(BedrockClient {
            base_url,
            bearer_token: self.bearer_token,
            http,
        })
    }
}

#[derive(Debug, Serialize)]
struct InvokeModelBody<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    temperature: f32,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: [TextBlock<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

impl<'a> InvokeModelBody<'a> {
    fn new(request: &'a GenerationRequest) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: [UserMessage {
                role: "user",
                content: [TextBlock {
                    kind: "text",
                    text: &request.prompt,
                }],
            }],
        }
    }
}

/// Pulls the generated text out of an invoke-model response body.
///
/// Returns `None` when the body does not carry a usable first content block.
pub fn first_text_block(body: &Value) -> Option<String> {
    let first = body.get("content")?.as_array()?.first()?;
    match first {
        Value::Object(block) => block.get("text")?.as_str().map(str::to_string),
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}

fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("Message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Serialized invoke-model request for one generation call.
pub(crate) fn request_body(request: &GenerationRequest) -> Result<Vec<u8>, ClaimflowError> {
    Ok(serde_json::to_vec(&InvokeModelBody::new(request))?)
}

/// Decodes a successful invoke-model body into generated text.
///
/// A body that is not JSON is a provider error. A JSON body without a usable
/// first content block is logged and yields empty text.
pub(crate) fn response_text(model_id: &str, body: &[u8]) -> Result<String, ClaimflowError> {
    let body: Value = serde_json::from_slice(body).map_err(|err| {
        ClaimflowError::provider(model_id, format!("undecodable response body: {err}"))
    })?;

    match first_text_block(&body) {
        Some(text) => Ok(text),
        None => {
            tracing::error!(
                model_id = %model_id,
                response = %body,
                "unexpected response format, returning empty text"
            );
            Ok(String::new())
        }
    }
}

#[async_trait::async_trait]
impl ModelInvoker for BedrockClient {
    async fn invoke(&self, request: GenerationRequest) -> Result<String, ClaimflowError> {
        let url = self.invoke_url(&request.model_id)?;
        let model_id = request.model_id.as_str();

        let mut builder = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(request_body(&request)?);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let response = builder.send().await.map_err(|err| {
            tracing::error!(model_id = %model_id, error = %err, "model invocation failed");
            ClaimflowError::provider(model_id, err.to_string())
        })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ClaimflowError::provider(model_id, err.to_string()))?;

        if !status.is_success() {
            let message = provider_error_message(&String::from_utf8_lossy(&body));
            tracing::error!(
                model_id = %model_id,
                status = status.as_u16(),
                message = %message,
                "model invocation rejected"
            );
            return Err(ClaimflowError::provider(
                model_id,
                format!("HTTP {}: {message}", status.as_u16()),
            ));
        }

        response_text(model_id, &body)
    }
}
