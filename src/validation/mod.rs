//! Declarative request validation.
//!
//! Each endpoint describes its body as a [`Schema`]: a static list of fields,
//! each with an ordered list of [`Rule`]s. Validation checks every field and
//! reports one [`FieldError`] per failing field, so clients see the complete
//! set of problems in a single response. Only a body that passes is
//! deserialized into the endpoint's typed request struct.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// One entry of the `details` array in a validation error envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub details: Vec<FieldError>,
}

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Field must be present and not null. Without it, absent fields skip the remaining rules.
    Required,
    String,
    Integer,
    Object,
    /// String must contain a non-whitespace character
    NotBlank,
    /// Minimum length in characters, measured after trimming
    MinLen(usize),
    /// Maximum length in characters, measured after trimming
    MaxLen(usize),
    /// Inclusive integer range
    Range(i64, i64),
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub label: &'static str,
    pub rules: &'static [Rule],
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldRules],
    /// Reject bodies that set none of the declared fields (partial updates)
    pub require_any: bool,
}

impl Schema {
    pub const fn new(fields: &'static [FieldRules]) -> Self {
        Self { fields, require_any: false }
    }

    pub const fn partial(fields: &'static [FieldRules]) -> Self {
        Self { fields, require_any: true }
    }

    pub fn validate(&self, body: &Value) -> Result<(), ValidationError> {
        let Some(object) = body.as_object() else {
            return Err(ValidationError { details: vec![FieldError::new("body", "Request body must be a JSON object")] });
        };

        let mut details = Vec::new();
        for field in self.fields {
            if let Some(message) = check_field(field, object.get(field.field)) {
                details.push(FieldError::new(field.field, message));
            }
        }

        if self.require_any && details.is_empty() {
            let any_present = self
                .fields
                .iter()
                .any(|f| object.get(f.field).map(|v| !v.is_null()).unwrap_or(false));
            if !any_present {
                details.push(FieldError::new("body", "At least one field must be provided for update"));
            }
        }

        if details.is_empty() { Ok(()) } else { Err(ValidationError { details }) }
    }

    /// Validate, then deserialize into the endpoint's typed request.
    pub fn parse<T: DeserializeOwned>(&self, body: Value) -> Result<T, ValidationError> {
        self.validate(&body)?;
        serde_json::from_value(body).map_err(|e| ValidationError {
            details: vec![FieldError::new("body", e.to_string())],
        })
    }
}

fn check_field(field: &FieldRules, value: Option<&Value>) -> Option<String> {
    let label = field.label;
    let value = match value {
        None | Some(Value::Null) => {
            let required = field.rules.iter().any(|r| matches!(r, Rule::Required));
            return required.then(|| format!("{} is required", label));
        }
        Some(v) => v,
    };

    for rule in field.rules {
        let failure = match *rule {
            Rule::Required => None,
            Rule::String => (!value.is_string()).then(|| format!("{} must be a string", label)),
            Rule::Integer => value.as_i64().is_none().then(|| format!("{} must be an integer", label)),
            Rule::Object => (!value.is_object()).then(|| format!("{} must be an object", label)),
            Rule::NotBlank => value
                .as_str()
                .filter(|s| s.trim().is_empty())
                .map(|_| format!("{} cannot be empty", label)),
            Rule::MinLen(min) => value
                .as_str()
                .filter(|s| s.trim().chars().count() < min)
                .map(|_| format!("{} must be at least {} characters long", label, min)),
            Rule::MaxLen(max) => value
                .as_str()
                .filter(|s| s.trim().chars().count() > max)
                .map(|_| format!("{} cannot exceed {} characters", label, max)),
            Rule::Range(min, max) => value
                .as_i64()
                .filter(|n| *n < min || *n > max)
                .map(|_| format!("{} must be between {} and {}", label, min, max)),
            Rule::OneOf(allowed) => value
                .as_str()
                .filter(|s| !allowed.iter().any(|a| a == s))
                .map(|_| format!("{} must be one of: {}", label, allowed.join(", "))),
        };
        if failure.is_some() {
            return failure;
        }
    }
    None
}
