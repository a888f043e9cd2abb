mod registry;
mod template;

pub use registry::{PromptRegistry, DOCUMENT_UNDERSTANDING, EXTRACT_INFO, GENERATE_SUMMARY};
pub use template::PromptTemplate;
