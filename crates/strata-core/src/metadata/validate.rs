//! Value validation against a field's annotation rules.

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::FieldMetadata;
use crate::annotations::ValidationRule;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$";
const URL_PATTERN: &str = r"^https?://[^\s/$.?#].[^\s]*$";

/// A value rejected by a field's rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field '{field}' is required")]
    Required { field: String },

    #[error("field '{field}' failed {rule} (expected {expected})")]
    Failed {
        field: String,
        rule: ValidationRule,
        expected: String,
    },

    #[error("field '{field}' has an invalid {rule} rule: '{value}'")]
    InvalidRule {
        field: String,
        rule: ValidationRule,
        value: String,
    },
}

impl FieldMetadata {
    /// Validates a JSON value against the field's rules.
    ///
    /// Rules that do not apply to the value's type are skipped, and a null
    /// value on an optional field passes.
    ///
    /// # Errors
    ///
    /// Returns the first rule the value violates.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if is_empty(value) {
            if self.required {
                return Err(ValidationError::Required {
                    field: self.name.clone(),
                });
            }
            if value.is_null() {
                return Ok(());
            }
        }

        for (rule, expected) in &self.validations {
            self.check(*rule, expected, value)?;
        }
        Ok(())
    }

    fn check(
        &self,
        rule: ValidationRule,
        expected: &str,
        value: &Value,
    ) -> Result<(), ValidationError> {
        let passed = match rule {
            ValidationRule::Email | ValidationRule::Url | ValidationRule::Pattern => {
                match value.as_str() {
                    Some(s) => {
                        let pattern = match rule {
                            ValidationRule::Email => EMAIL_PATTERN,
                            ValidationRule::Url => URL_PATTERN,
                            _ => expected,
                        };
                        matches_pattern(pattern, s).map_err(|_| self.invalid(rule, expected))?
                    }
                    None => true,
                }
            }
            ValidationRule::Min | ValidationRule::Max => match value.as_f64() {
                Some(n) => {
                    let bound = self.number(rule, expected)?;
                    if rule == ValidationRule::Min {
                        n >= bound
                    } else {
                        n <= bound
                    }
                }
                None => true,
            },
            ValidationRule::MinLength | ValidationRule::MaxLength => match value.as_str() {
                Some(s) => {
                    let bound = expected
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| self.invalid(rule, expected))?;
                    let len = s.chars().count();
                    if rule == ValidationRule::MinLength {
                        len >= bound
                    } else {
                        len <= bound
                    }
                }
                None => true,
            },
            ValidationRule::Enum => match scalar_text(value) {
                Some(text) => expected.split(',').any(|allowed| allowed.trim() == text.trim()),
                None => true,
            },
        };

        if passed {
            Ok(())
        } else {
            Err(ValidationError::Failed {
                field: self.name.clone(),
                rule,
                expected: expected.to_string(),
            })
        }
    }

    fn number(&self, rule: ValidationRule, expected: &str) -> Result<f64, ValidationError> {
        expected
            .trim()
            .parse::<f64>()
            .map_err(|_| self.invalid(rule, expected))
    }

    fn invalid(&self, rule: ValidationRule, value: &str) -> ValidationError {
        ValidationError::InvalidRule {
            field: self.name.clone(),
            rule,
            value: value.to_string(),
        }
    }
}

fn matches_pattern(pattern: &str, text: &str) -> Result<bool, regex::Error> {
    Ok(Regex::new(pattern)?.is_match(text))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
