use claimflow_core::ClaimflowError;
use claimflow_pipeline::PipelineResult;
use serde::Serialize;

/// A pipeline result tagged with where its input came from.
#[derive(Clone, Debug, Serialize)]
pub struct ProcessedDocument<S> {
    pub source_document: S,
    #[serde(flatten)]
    pub result: PipelineResult,
}

impl<S: Serialize> ProcessedDocument<S> {
    pub fn to_pretty_json(&self) -> Result<String, ClaimflowError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
