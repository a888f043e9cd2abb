use std::sync::Arc;

use chrono::Utc;
use claimflow_core::{ClaimflowError, GenerationRequest, ModelInvoker};
use claimflow_prompt::{
    PromptRegistry, PromptTemplate, DOCUMENT_UNDERSTANDING, EXTRACT_INFO, GENERATE_SUMMARY,
};

use crate::extraction::{parse_extraction, ParsedExtraction};
use crate::{ComparisonResults, ComparisonRunner, ModelsUsed, PipelineResult, ProcessingMetadata};

pub const DEFAULT_UNDERSTANDING_MODEL: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";
pub const DEFAULT_EXTRACTION_MODEL: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";
pub const DEFAULT_SUMMARY_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";

/// Prompt used when the pipeline benchmarks comparison models. It is
/// deliberately separate from the `extract_info` template.
pub const CLAIM_COMPARISON_TEMPLATE: &str =
    "Extract key information from this insurance claim document: {{document_text}}";

const UNDERSTANDING_TEMPERATURE: f32 = 0.1;
const UNDERSTANDING_MAX_TOKENS: u32 = 2000;
const EXTRACTION_TEMPERATURE: f32 = 0.0;
const EXTRACTION_MAX_TOKENS: u32 = 1500;
const SUMMARY_TEMPERATURE: f32 = 0.7;
const SUMMARY_MAX_TOKENS: u32 = 500;

/// Model identifiers serving each stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageModels {
    pub understanding: String,
    pub extraction: String,
    pub summary: String,
}

impl Default for StageModels {
    fn default() -> Self {
        Self {
            understanding: DEFAULT_UNDERSTANDING_MODEL.to_string(),
            extraction: DEFAULT_EXTRACTION_MODEL.to_string(),
            summary: DEFAULT_SUMMARY_MODEL.to_string(),
        }
    }
}

impl StageModels {
    /// Fills unset or blank stages with the defaults.
    pub fn resolve(
        understanding: Option<String>,
        extraction: Option<String>,
        summary: Option<String>,
    ) -> Self {
        let pick = |value: Option<String>, default: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            understanding: pick(understanding, DEFAULT_UNDERSTANDING_MODEL),
            extraction: pick(extraction, DEFAULT_EXTRACTION_MODEL),
            summary: pick(summary, DEFAULT_SUMMARY_MODEL),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComparisonSettings {
    pub enabled: bool,
    pub models: Vec<String>,
}

impl ComparisonSettings {
    /// Parses a comma-separated model list, dropping blank entries.
    pub fn from_list(enabled: bool, models: &str) -> Self {
        Self {
            enabled,
            models: models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.enabled && !self.models.is_empty()
    }
}

/// Result of the best-effort comparison step.
#[derive(Clone, Debug, PartialEq)]
pub enum ComparisonOutcome {
    Skipped,
    Completed(ComparisonResults),
    Failed { reason: String },
}

impl ComparisonOutcome {
    pub fn into_results(self) -> Option<ComparisonResults> {
        match self {
            ComparisonOutcome::Completed(results) => Some(results),
            ComparisonOutcome::Skipped | ComparisonOutcome::Failed { .. } => None,
        }
    }
}

/// Understanding, extraction and summary calls against one document.
pub struct DocumentPipeline {
    invoker: Arc<dyn ModelInvoker>,
    registry: PromptRegistry,
    models: StageModels,
    comparison: ComparisonSettings,
}

impl DocumentPipeline {
    pub fn new(invoker: Arc<dyn ModelInvoker>, models: StageModels) -> Result<Self, ClaimflowError> {
        Ok(Self {
            invoker,
            registry: PromptRegistry::claims()?,
            models,
            comparison: ComparisonSettings::default(),
        })
    }

    pub fn with_comparison(mut self, comparison: ComparisonSettings) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn models(&self) -> &StageModels {
        &self.models
    }

    pub async fn process(&self, document_text: &str) -> Result<PipelineResult, ClaimflowError> {
        tracing::info!(stage = "understanding", model_id = %self.models.understanding, "step 1: document understanding");
        let document_understanding = self.understand(document_text).await?;

        tracing::info!(stage = "extraction", model_id = %self.models.extraction, "step 2: information extraction");
        let extraction = self.extract(document_text).await?;

        tracing::info!(stage = "summary", model_id = %self.models.summary, "step 3: summary generation");
        let summary = self.summarize(&extraction.text).await?;

        let processing_metadata = ProcessingMetadata {
            models_used: ModelsUsed {
                understanding: self.models.understanding.clone(),
                extraction: self.models.extraction.clone(),
                summary: self.models.summary.clone(),
            },
            processed_at: Utc::now(),
        };

        let comparison_results = self.compare(document_text).await.into_results();

        Ok(PipelineResult {
            document_understanding,
            extracted_information: extraction.information,
            summary,
            processing_metadata,
            comparison_results,
        })
    }

    async fn understand(&self, document_text: &str) -> Result<String, ClaimflowError> {
        let prompt = self
            .registry
            .get_prompt(DOCUMENT_UNDERSTANDING, &[("document_text", document_text)])?;
        self.invoker
            .invoke(
                GenerationRequest::new(self.models.understanding.as_str(), prompt)
                    .with_temperature(UNDERSTANDING_TEMPERATURE)
                    .with_max_tokens(UNDERSTANDING_MAX_TOKENS),
            )
            .await
    }

    async fn extract(&self, document_text: &str) -> Result<ParsedExtraction, ClaimflowError> {
        let prompt = self
            .registry
            .get_prompt(EXTRACT_INFO, &[("document_text", document_text)])?;
        let output = self
            .invoker
            .invoke(
                GenerationRequest::new(self.models.extraction.as_str(), prompt)
                    .with_temperature(EXTRACTION_TEMPERATURE)
                    .with_max_tokens(EXTRACTION_MAX_TOKENS),
            )
            .await?;
        Ok(parse_extraction(&output))
    }

    async fn summarize(&self, extracted_info: &str) -> Result<String, ClaimflowError> {
        let prompt = self
            .registry
            .get_prompt(GENERATE_SUMMARY, &[("extracted_info", extracted_info)])?;
        self.invoker
            .invoke(
                GenerationRequest::new(self.models.summary.as_str(), prompt)
                    .with_temperature(SUMMARY_TEMPERATURE)
                    .with_max_tokens(SUMMARY_MAX_TOKENS),
            )
            .await
    }

    /// Never fails; any error is logged and reported as `Failed`.
    pub async fn compare(&self, document_text: &str) -> ComparisonOutcome {
        if !self.comparison.is_active() {
            return ComparisonOutcome::Skipped;
        }

        tracing::info!(models = self.comparison.models.len(), "running model comparison");
        let template = match PromptTemplate::new("claim_comparison", CLAIM_COMPARISON_TEMPLATE) {
            Ok(template) => template,
            Err(err) => return comparison_failed(err),
        };
        let runner = ComparisonRunner::new(Arc::clone(&self.invoker));
        match runner
            .run(document_text, &self.comparison.models, &template)
            .await
        {
            Ok(results) => ComparisonOutcome::Completed(results),
            Err(err) => comparison_failed(err),
        }
    }
}

fn comparison_failed(err: ClaimflowError) -> ComparisonOutcome {
    tracing::error!(error = ?err, "model comparison failed, continuing without comparison results");
    ComparisonOutcome::Failed {
        reason: err.to_string(),
    }
}
