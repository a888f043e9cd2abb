use std::sync::Arc;
use std::time::Instant;

use claimflow_core::{ClaimflowError, GenerationRequest, ModelInvoker};
use claimflow_prompt::PromptTemplate;

use crate::{ComparisonRecord, ComparisonResults};

pub const COMPARISON_TEMPERATURE: f32 = 0.0;
pub const COMPARISON_MAX_TOKENS: u32 = 1000;
pub const SAMPLE_CHARS: usize = 200;
const ELLIPSIS: &str = "...";

pub const GENERIC_COMPARISON_TEMPLATE: &str =
    "Extract key information from this document: {{document_text}}";

/// Runs one prompt against several models in turn and records how each fared.
#[derive(Clone)]
pub struct ComparisonRunner {
    invoker: Arc<dyn ModelInvoker>,
}

impl ComparisonRunner {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { invoker }
    }

    pub fn default_template() -> Result<PromptTemplate, ClaimflowError> {
        PromptTemplate::new("comparison", GENERIC_COMPARISON_TEMPLATE)
    }

    /// Fails only if the prompt cannot be rendered. Model failures are recorded
    /// per model and never abort the batch.
    pub async fn run(
        &self,
        document_text: &str,
        model_ids: &[String],
        prompt_template: &PromptTemplate,
    ) -> Result<ComparisonResults, ClaimflowError> {
        let prompt = prompt_template.render_with(&[("document_text", document_text)])?;
        let mut results = ComparisonResults::new();

        for model_id in model_ids {
            tracing::info!(model_id = %model_id, "comparing model");
            let request = GenerationRequest::new(model_id.as_str(), prompt.as_str())
                .with_temperature(COMPARISON_TEMPERATURE)
                .with_max_tokens(COMPARISON_MAX_TOKENS);

            let started = Instant::now();
            let record = match self.invoker.invoke(request).await {
                Ok(output) => succeeded(&output, started.elapsed().as_secs_f64()),
                Err(err) => {
                    tracing::error!(model_id = %model_id, error = %err, "comparison model failed");
                    ComparisonRecord::failed(err.to_string())
                }
            };
            results.insert(model_id.as_str(), record);
        }

        Ok(results)
    }
}

fn succeeded(output: &str, elapsed_secs: f64) -> ComparisonRecord {
    ComparisonRecord {
        time_seconds: Some((elapsed_secs * 1000.0).round() / 1000.0),
        output_length: output.chars().count(),
        output_sample: sample(output),
        success: true,
        error: None,
    }
}

/// First 200 characters, with `...` appended when anything was cut.
pub fn sample(output: &str) -> String {
    let mut chars = output.chars();
    let head: String = chars.by_ref().take(SAMPLE_CHARS).collect();
    if chars.next().is_some() {
        head + ELLIPSIS
    } else {
        head
    }
}
