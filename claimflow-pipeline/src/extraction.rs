use claimflow_core::Value;

use crate::ExtractedInformation;

/// Extraction output after fence stripping and JSON parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedExtraction {
    /// Text handed to the summary stage.
    pub text: String,
    pub information: ExtractedInformation,
}

/// Drops the first and last lines when the output opens with a ``` fence.
pub fn strip_code_fence(output: &str) -> String {
    let trimmed = output.trim();
    if !trimmed.starts_with("```") {
        return output.to_string();
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    lines
        .get(1..lines.len().saturating_sub(1))
        .map(|inner| inner.join("\n"))
        .unwrap_or_default()
}

pub fn parse_extraction(output: &str) -> ParsedExtraction {
    let text = strip_code_fence(output);
    if text.trim().is_empty() {
        return ParsedExtraction {
            text,
            information: ExtractedInformation::empty(),
        };
    }

    let information = match serde_json::from_str::<Value>(&text) {
        Ok(value) => ExtractedInformation::Structured(value),
        Err(err) => {
            tracing::warn!(error = %err, "extraction response is not valid JSON, keeping raw text");
            ExtractedInformation::Raw(text.clone())
        }
    };
    ParsedExtraction { text, information }
}
