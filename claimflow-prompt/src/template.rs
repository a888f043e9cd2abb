use std::collections::HashMap;

use claimflow_core::{ClaimflowError, Value};
use regex::Regex;

const PLACEHOLDER_PATTERN: &str = r"\{\{\s*(\w+)\s*\}\}";

fn placeholder_pattern() -> Result<Regex, ClaimflowError> {
    Regex::new(PLACEHOLDER_PATTERN).map_err(|e| ClaimflowError::InvalidConfig(e.to_string()))
}

/// Immutable prompt text with `{{name}}` placeholders.
///
/// Placeholder names are collected once at construction, in order of first
/// appearance. Rendering fails if any of them is absent from the supplied
/// variables; extra variables are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    template: String,
    placeholders: Vec<String>,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self, ClaimflowError> {
        let template = template.into();
        let pattern = placeholder_pattern()?;
        let mut placeholders: Vec<String> = Vec::new();
        for caps in pattern.captures_iter(&template) {
            let key = &caps[1];
            if !placeholders.iter().any(|existing| existing == key) {
                placeholders.push(key.to_string());
            }
        }
        Ok(Self {
            name: name.into(),
            template,
            placeholders,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    pub fn render(&self, vars: &HashMap<String, Value>) -> Result<String, ClaimflowError> {
        if let Some(missing) = self
            .placeholders
            .iter()
            .find(|key| !vars.contains_key(key.as_str()))
        {
            return Err(ClaimflowError::MissingPlaceholder {
                template: self.name.clone(),
                placeholder: missing.clone(),
            });
        }

        let pattern = placeholder_pattern()?;
        let rendered = pattern.replace_all(&self.template, |caps: &regex::Captures| {
            match vars.get(&caps[1]) {
                Some(value) => value
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| value.to_string()),
                None => String::new(),
            }
        });
        Ok(rendered.into_owned())
    }

    /// Renders from borrowed string pairs.
    pub fn render_with(&self, vars: &[(&str, &str)]) -> Result<String, ClaimflowError> {
        let vars: HashMap<String, Value> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), Value::from(*value)))
            .collect();
        self.render(&vars)
    }
}
