mod error;
mod invoke;

pub use error::ClaimflowError;
pub use invoke::{GenerationRequest, ModelInvoker};

pub type Value = serde_json::Value;
