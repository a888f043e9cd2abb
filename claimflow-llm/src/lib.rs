mod bedrock;
mod runtime;

pub use bedrock::{
    first_text_block, BedrockClient, BedrockClientBuilder, ANTHROPIC_VERSION, DEFAULT_REGION,
};
pub use claimflow_core::{GenerationRequest, ModelInvoker};
pub use runtime::RuntimeClient;
