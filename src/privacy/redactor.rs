//! PII redactor for JSON payloads

use crate::error::{Error, Result};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named PII pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionPattern {
    /// Pattern name, embedded in the replacement token
    pub name: String,
    /// Regular expression matching the PII
    pub pattern: String,
}

impl RedactionPattern {
    fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// The fixed, ordered PII pattern table.
///
/// Order matters: each pattern rewrites the text before the next one scans
/// it, so an email is consumed before its digits could look like a phone
/// number.
pub fn default_redaction_patterns() -> Vec<RedactionPattern> {
    vec![
        RedactionPattern::new("em", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"),
        RedactionPattern::new(
            "ph",
            r"(\+[0-9]{1,3}[-.]?)?\(?[0-9]{3}\)?[-.]?[0-9]{3}[-.]?[0-9]{4}",
        ),
        RedactionPattern::new("ip", r"([0-9]{1,3}\.){3}[0-9]{1,3}"),
        RedactionPattern::new(
            "id",
            r"(?-u:\b)[0-9]{3}[-.]?[0-9]{2}[-.]?[0-9]{4}(?-u:\b)",
        ),
    ]
}

/// Replacement token for a pattern name
pub fn redaction_token(name: &str) -> String {
    format!("[REDACTED_{}]", name)
}

/// Redacts PII substrings from text and JSON values
pub struct Redactor {
    patterns: Vec<CompiledPattern>,
}

struct CompiledPattern {
    name: String,
    regex: Regex,
    token: String,
}

impl Redactor {
    /// Create a redactor from an ordered pattern list
    pub fn new(patterns: Vec<RedactionPattern>) -> Result<Self> {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let regex = Regex::new(&p.pattern).map_err(|e| {
                    Error::Privacy(format!(
                        "Invalid regex pattern for redaction '{}': {}",
                        p.name, e
                    ))
                })?;

                Ok(CompiledPattern {
                    token: redaction_token(&p.name),
                    name: p.name,
                    regex,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Create a redactor with the standard PII patterns
    pub fn standard() -> Result<Self> {
        Self::new(default_redaction_patterns())
    }

    /// Names of the configured patterns, in application order
    pub fn pattern_names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    /// Replace every PII match in `text` with its token
    pub fn redact_text(&self, text: &str) -> String {
        let mut result = text.to_string();
        for pattern in &self.patterns {
            result = pattern
                .regex
                .replace_all(&result, NoExpand(&pattern.token))
                .into_owned();
        }
        result
    }

    /// Redact a JSON value, keeping its shape.
    ///
    /// Strings are redacted, arrays element-wise and objects value-wise.
    /// Keys, numbers, booleans and null are left untouched.
    pub fn redact_value(&self, value: Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.redact_text(&s)),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.redact_value(v)).collect())
            }
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, self.redact_value(v)))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Check if text contains any PII
    pub fn contains_pii(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.regex.is_match(text))
    }
}
