//! Three-stage claim document pipeline with optional model comparison.

mod comparison;
pub mod extraction;
mod pipeline;
mod result;

pub use comparison::{
    sample, ComparisonRunner, COMPARISON_MAX_TOKENS, COMPARISON_TEMPERATURE,
    GENERIC_COMPARISON_TEMPLATE, SAMPLE_CHARS,
};
pub use pipeline::{
    ComparisonOutcome, ComparisonSettings, DocumentPipeline, StageModels,
    CLAIM_COMPARISON_TEMPLATE, DEFAULT_EXTRACTION_MODEL, DEFAULT_SUMMARY_MODEL,
    DEFAULT_UNDERSTANDING_MODEL,
};
pub use result::{
    ComparisonRecord, ComparisonResults, ExtractedInformation, ModelsUsed, PipelineResult,
    ProcessingMetadata,
};
