use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaimflowError {
    #[error("Template '{name}' not found. Available templates: {}", available.join(", "))]
    TemplateNotFound { name: String, available: Vec<String> },
    #[error("Template '{template}' requires placeholder '{placeholder}' which was not supplied")]
    MissingPlaceholder { template: String, placeholder: String },
    #[error("Model '{model_id}' invocation failed: {message}")]
    LlmProvider { model_id: String, message: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ClaimflowError {
    pub fn provider(model_id: impl Into<String>, message: impl Into<String>) -> Self {
        ClaimflowError::LlmProvider {
            model_id: model_id.into(),
            message: message.into(),
        }
    }

    /// Configuration errors are never recovered from.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ClaimflowError::TemplateNotFound { .. }
                | ClaimflowError::MissingPlaceholder { .. }
                | ClaimflowError::InvalidConfig(_)
        )
    }
}
