use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ClaimflowError;

/// A single-prompt generation call against one model endpoint.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GenerationRequest {
    pub model_id: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(model_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: prompt.into(),
            temperature: 0.0,
            max_tokens: 1000,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens.max(1);
        self
    }
}

/// Sends a prompt to a named model and returns the generated text.
///
/// Implementations return `Ok(String::new())` when the provider answers with
/// an unexpected body shape and `Err` for transport or provider failures.
#[async_trait::async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, request: GenerationRequest) -> Result<String, ClaimflowError>;
}

#[async_trait::async_trait]
impl<T> ModelInvoker for Arc<T>
where
    T: ModelInvoker + ?Sized,
{
    async fn invoke(&self, request: GenerationRequest) -> Result<String, ClaimflowError> {
        (**self).invoke(request).await
    }
}
