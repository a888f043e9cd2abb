use std::path::Path;

use claimflow_core::ClaimflowError;
use claimflow_pipeline::DocumentPipeline;
use serde::{Deserialize, Serialize};

use crate::ProcessedDocument;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSource {
    pub path: String,
    /// Character count of the input text.
    pub size: usize,
}

/// Reads a UTF-8 text file, runs the pipeline, optionally writes indented JSON.
pub struct LocalRunner {
    pipeline: DocumentPipeline,
}

impl LocalRunner {
    pub fn new(pipeline: DocumentPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn run(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<ProcessedDocument<LocalSource>, ClaimflowError> {
        let document_text = read_document(input).await?;
        let size = document_text.chars().count();
        tracing::info!(path = %input.display(), characters = size, "processing document");

        let result = self.pipeline.process(&document_text).await?;
        let processed = ProcessedDocument {
            source_document: LocalSource {
                path: input.display().to_string(),
                size,
            },
            result,
        };

        if let Some(output) = output {
            tokio::fs::write(output, processed.to_pretty_json()?).await?;
            tracing::info!(path = %output.display(), "results saved");
        }

        Ok(processed)
    }
}

async fn read_document(path: &Path) -> Result<String, ClaimflowError> {
    let bytes = tokio::fs::read(path).await?;
    String::from_utf8(bytes).map_err(|err| {
        ClaimflowError::InvalidDocument(format!("{} is not UTF-8 text: {err}", path.display()))
    })
}
