use claimflow_core::ClaimflowError;

use crate::PromptTemplate;

pub const DOCUMENT_UNDERSTANDING: &str = "document_understanding";
pub const EXTRACT_INFO: &str = "extract_info";
pub const GENERATE_SUMMARY: &str = "generate_summary";

const DOCUMENT_UNDERSTANDING_TEXT: &str = "
Analyze this insurance claim document and provide a comprehensive understanding of:
1. Document type and structure
2. Key sections identified
3. Overall document quality and completeness
4. Any notable patterns or anomalies

Document:
{{document_text}}

Provide your analysis in JSON format with clear structure.";

const EXTRACT_INFO_TEXT: &str = "
Extract the following information from this insurance claim document and return it as valid JSON:
- Claimant Name
- Policy Number
- Incident Date
- Claim Amount
- Incident Description
- Claim Type
- Any additional relevant information

Document:
{{document_text}}

Return ONLY valid JSON, no additional text or explanation.";

const GENERATE_SUMMARY_TEXT: &str = "
Based on this extracted claim information:
{{extracted_info}}

Generate a concise, professional summary of the insurance claim that includes:
1. Key claim details
2. Claimant information
3. Incident overview
4. Claim amount

Keep the summary clear and under 200 words.";

/// Read-only name-to-template lookup, seeded at construction.
#[derive(Debug, Clone)]
pub struct PromptRegistry {
    templates: Vec<PromptTemplate>,
}

impl PromptRegistry {
    /// The three claim-processing templates used by the document pipeline.
    pub fn claims() -> Result<Self, ClaimflowError> {
        Self::from_templates([
            PromptTemplate::new(DOCUMENT_UNDERSTANDING, DOCUMENT_UNDERSTANDING_TEXT)?,
            PromptTemplate::new(EXTRACT_INFO, EXTRACT_INFO_TEXT)?,
            PromptTemplate::new(GENERATE_SUMMARY, GENERATE_SUMMARY_TEXT)?,
        ])
    }

    pub fn from_templates(
        templates: impl IntoIterator<Item = PromptTemplate>,
    ) -> Result<Self, ClaimflowError> {
        let mut collected: Vec<PromptTemplate> = Vec::new();
        for template in templates {
            if collected.iter().any(|t| t.name() == template.name()) {
                return Err(ClaimflowError::InvalidConfig(format!(
                    "duplicate prompt template name '{}'",
                    template.name()
                )));
            }
            collected.push(template);
        }
        Ok(Self {
            templates: collected,
        })
    }

    pub fn template(&self, name: &str) -> Result<&PromptTemplate, ClaimflowError> {
        self.templates
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ClaimflowError::TemplateNotFound {
                name: name.to_string(),
                available: self.list_names(),
            })
    }

    pub fn get_prompt(&self, name: &str, vars: &[(&str, &str)]) -> Result<String, ClaimflowError> {
        self.template(name)?.render_with(vars)
    }

    /// Names in registration order.
    pub fn list_names(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.name().to_string()).collect()
    }
}
