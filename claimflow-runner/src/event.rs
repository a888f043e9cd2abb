//! Object-store notification handling.
//!
//! Each accepted record is read from the input store, run through the
//! pipeline and written to the output store as `processed/<key>.json`, with
//! comparison results (when present) written to `comparisons/<key>.json`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use claimflow_core::ClaimflowError;
use claimflow_pipeline::{ComparisonResults, DocumentPipeline};
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use serde::{Deserialize, Serialize};

use crate::ProcessedDocument;

pub const STORAGE_EVENT_SOURCE: &str = "aws:s3";
pub const DEFAULT_INPUT_PREFIX: &str = "claims/";
const PROCESSED_PREFIX: &str = "processed/";
const COMPARISONS_PREFIX: &str = "comparisons/";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventRecord {
    #[serde(rename = "eventSource", default)]
    pub event_source: String,
    #[serde(default)]
    pub s3: Option<StorageEntity>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StorageEntity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ObjectEntity {
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRunnerConfig {
    pub input_bucket: String,
    pub output_bucket: String,
    pub input_prefix: String,
}

impl EventRunnerConfig {
    pub fn new(input_bucket: impl Into<String>, output_bucket: impl Into<String>) -> Self {
        Self {
            input_bucket: input_bucket.into(),
            output_bucket: output_bucket.into(),
            input_prefix: DEFAULT_INPUT_PREFIX.to_string(),
        }
    }

    pub fn with_input_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.input_prefix = prefix.into();
        self
    }

    /// `claims/a/b.txt` becomes `a/b.txt` for the default prefix.
    pub fn derived_key(&self, key: &str) -> String {
        let stripped = if self.input_prefix.is_empty() {
            key
        } else {
            key.strip_prefix(self.input_prefix.as_str()).unwrap_or(key)
        };
        format!("{stripped}.json")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: ResponseBody,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Processed {
        message: String,
        output_locations: Vec<String>,
    },
    Failed {
        error: String,
        message: String,
    },
    Empty {
        message: String,
    },
}

impl HandlerResponse {
    fn processed(output_locations: Vec<String>) -> Self {
        Self {
            status_code: 200,
            body: ResponseBody::Processed {
                message: "Document processed successfully".to_string(),
                output_locations,
            },
        }
    }

    fn empty() -> Self {
        Self {
            status_code: 200,
            body: ResponseBody::Empty {
                message: "No records to process".to_string(),
            },
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: ResponseBody::Failed {
                error: "Error processing document".to_string(),
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

#[derive(Serialize)]
struct EventSource<'a> {
    bucket: &'a str,
    key: &'a str,
    processed_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ComparisonDocument<'a> {
    source_document: ComparisonSource<'a>,
    comparison_results: &'a ComparisonResults,
}

#[derive(Serialize)]
struct ComparisonSource<'a> {
    bucket: &'a str,
    key: &'a str,
    compared_at: DateTime<Utc>,
}

pub struct EventRunner {
    pipeline: DocumentPipeline,
    input_store: Arc<dyn ObjectStore>,
    output_store: Arc<dyn ObjectStore>,
    config: EventRunnerConfig,
}

impl EventRunner {
    pub fn new(
        pipeline: DocumentPipeline,
        input_store: Arc<dyn ObjectStore>,
        output_store: Arc<dyn ObjectStore>,
        config: EventRunnerConfig,
    ) -> Self {
        Self {
            pipeline,
            input_store,
            output_store,
            config,
        }
    }

    /// Always answers with a response; failures become a 500 body.
    pub async fn handle(&self, event: &StorageEvent) -> HandlerResponse {
        tracing::info!(records = event.records.len(), "received storage event");
        match self.process_records(event).await {
            Ok(locations) if locations.is_empty() => HandlerResponse::empty(),
            Ok(locations) => HandlerResponse::processed(locations),
            Err(err) => {
                tracing::error!(error = ?err, "error processing document");
                HandlerResponse::failed(err.to_string())
            }
        }
    }

    async fn process_records(&self, event: &StorageEvent) -> Result<Vec<String>, ClaimflowError> {
        let mut locations = Vec::new();
        for record in &event.records {
            if record.event_source != STORAGE_EVENT_SOURCE {
                tracing::warn!(event_source = %record.event_source, "skipping record from unexpected source");
                continue;
            }
            let Some(entity) = &record.s3 else {
                tracing::warn!("skipping storage record without bucket/object details");
                continue;
            };
            let bucket = entity.bucket.name.as_str();
            let key = entity.object.key.as_str();
            if bucket != self.config.input_bucket {
                tracing::warn!(bucket = %bucket, expected = %self.config.input_bucket, "event from unexpected bucket");
                continue;
            }

            tracing::info!(bucket = %bucket, key = %key, "processing document");
            locations.push(self.process_object(bucket, key).await?);
        }
        Ok(locations)
    }

    async fn process_object(&self, bucket: &str, key: &str) -> Result<String, ClaimflowError> {
        let document_text = self.read_document(key).await?;
        tracing::info!(characters = document_text.chars().count(), "document size");

        let result = self.pipeline.process(&document_text).await?;
        let derived = self.config.derived_key(key);

        let comparison = match &result.comparison_results {
            Some(results) => Some(serde_json::to_string_pretty(&ComparisonDocument {
                source_document: ComparisonSource {
                    bucket,
                    key,
                    compared_at: Utc::now(),
                },
                comparison_results: results,
            })?),
            None => None,
        };

        let processed = ProcessedDocument {
            source_document: EventSource {
                bucket,
                key,
                processed_at: Utc::now(),
            },
            result,
        };
        let output_key = format!("{PROCESSED_PREFIX}{derived}");
        self.write_json(&output_key, processed.to_pretty_json()?).await?;
        let location = self.location(&output_key);
        tracing::info!(location = %location, "results saved");

        if let Some(comparison) = comparison {
            let comparison_key = format!("{COMPARISONS_PREFIX}{derived}");
            self.write_json(&comparison_key, comparison).await?;
            tracing::info!(location = %self.location(&comparison_key), "comparison results saved");
        }

        Ok(location)
    }

    async fn read_document(&self, key: &str) -> Result<String, ClaimflowError> {
        let bytes = self
            .input_store
            .get(&ObjectPath::from(key))
            .await
            .map_err(|err| ClaimflowError::Storage(format!("failed to read {key}: {err}")))?
            .bytes()
            .await
            .map_err(|err| ClaimflowError::Storage(format!("failed to read {key}: {err}")))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|err| ClaimflowError::InvalidDocument(format!("{key} is not UTF-8 text: {err}")))
    }

    async fn write_json(&self, key: &str, body: String) -> Result<(), ClaimflowError> {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, "application/json".into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };
        self.output_store
            .put_opts(&ObjectPath::from(key), PutPayload::from(body.into_bytes()), options)
            .await
            .map_err(|err| ClaimflowError::Storage(format!("failed to write {key}: {err}")))?;
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.config.output_bucket, key)
    }
}
