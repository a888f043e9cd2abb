use chrono::{DateTime, Utc};
use claimflow_core::Value;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Output of the extraction stage.
///
/// Both variants serialize to their bare JSON form, so consumers of the
/// written document see either an object or a string.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractedInformation {
    Structured(Value),
    /// Model output that could not be parsed as JSON, carried verbatim.
    Raw(String),
}

impl ExtractedInformation {
    pub fn empty() -> Self {
        ExtractedInformation::Structured(Value::Object(Default::default()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsUsed {
    pub understanding: String,
    pub extraction: String,
    pub summary: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    pub models_used: ModelsUsed,
    pub processed_at: DateTime<Utc>,
}

/// Per-model outcome of a comparison run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub time_seconds: Option<f64>,
    pub output_length: usize,
    pub output_sample: String,
    pub success: bool,
    pub error: Option<String>,
}

impl ComparisonRecord {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            time_seconds: None,
            output_length: 0,
            output_sample: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Comparison records keyed by model id, in evaluation order.
///
/// Serializes as a JSON object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComparisonResults {
    entries: Vec<(String, ComparisonRecord)>,
}

impl ComparisonResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record; a repeated model id replaces the earlier record in place.
    pub fn insert(&mut self, model_id: impl Into<String>, record: ComparisonRecord) {
        let model_id = model_id.into();
        match self.entries.iter_mut().find(|(id, _)| *id == model_id) {
            Some((_, existing)) => *existing = record,
            None => self.entries.push((model_id, record)),
        }
    }

    pub fn get(&self, model_id: &str) -> Option<&ComparisonRecord> {
        self.entries
            .iter()
            .find(|(id, _)| id == model_id)
            .map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComparisonRecord)> {
        self.entries
            .iter()
            .map(|(id, record)| (id.as_str(), record))
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|(_, r)| !r.success).count()
    }
}

impl Serialize for ComparisonResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (model_id, record) in &self.entries {
            map.serialize_entry(model_id, record)?;
        }
        map.end()
    }
}

/// The assembled artifact for one processed document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineResult {
    pub document_understanding: String,
    pub extracted_information: ExtractedInformation,
    pub summary: String,
    pub processing_metadata: ProcessingMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_results: Option<ComparisonResults>,
}
