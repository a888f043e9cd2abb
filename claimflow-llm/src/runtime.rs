//! SDK-backed invoke-model client.
//!
//! Credentials come from the standard AWS chain (environment keys, shared
//! profile, container or instance role) and every request is SigV4 signed.

use std::time::Duration;

use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use claimflow_core::{ClaimflowError, GenerationRequest, ModelInvoker};

use crate::bedrock::{request_body, response_text};

#[derive(Clone, Debug)]
pub struct RuntimeClient {
    client: Client,
}

impl RuntimeClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Loads shared AWS configuration for `region`, optionally pointing the
    /// runtime at `endpoint`.
    pub async fn from_env(
        region: &str,
        endpoint: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ClaimflowError> {
        if region.trim().is_empty() {
            return Err(ClaimflowError::InvalidConfig(
                "region cannot be empty".to_string(),
            ));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.trim().to_string()))
            .timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());
        if let Some(endpoint) = endpoint {
            if endpoint.trim().is_empty() {
                return Err(ClaimflowError::InvalidConfig(
                    "endpoint cannot be empty".to_string(),
                ));
            }
            loader = loader.endpoint_url(endpoint.trim());
        }

        let config = loader.load().await;
        tracing::debug!(region = %region, "loaded AWS configuration for model runtime");
        Ok(Self::new(Client::new(&config)))
    }
}

#[async_trait::async_trait]
impl ModelInvoker for RuntimeClient {
    async fn invoke(&self, request: GenerationRequest) -> Result<String, ClaimflowError> {
        let model_id = request.model_id.as_str();

        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_body(&request)?))
            .send()
            .await
            .map_err(|err| {
                let status = err.raw_response().map(|raw| raw.status().as_u16());
                let context = DisplayErrorContext(&err).to_string();
                tracing::error!(
                    model_id = %model_id,
                    status = ?status,
                    error = %context,
                    "model invocation failed"
                );
                let message = match status {
                    Some(status) => format!("HTTP {status}: {context}"),
                    None => context,
                };
                ClaimflowError::provider(model_id, message)
            })?;

        response_text(model_id, output.body().as_ref())
    }
}
