//! Book payload checks. Every violation is collected so the client sees all
//! of them in one response.

use serde::Serialize;
use serde_json::{Map, Value};

/// One field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    Number,
}

struct FieldRule {
    name: &'static str,
    required: bool,
    kind: FieldKind,
}

const BOOK_SCHEMA: &[FieldRule] = &[
    FieldRule {
        name: "title",
        required: true,
        kind: FieldKind::Text,
    },
    FieldRule {
        name: "author",
        required: true,
        kind: FieldKind::Text,
    },
    FieldRule {
        name: "category",
        required: true,
        kind: FieldKind::Text,
    },
    FieldRule {
        name: "price",
        required: false,
        kind: FieldKind::Number,
    },
];

/// Check a create payload: required fields must be present and well typed.
pub fn validate_new(payload: &Map<String, Value>) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = BOOK_SCHEMA
        .iter()
        .filter_map(|rule| match payload.get(rule.name) {
            None if rule.required => Some(FieldError::new(
                rule.name,
                format!("{} is a mandatory field", rule.name),
            )),
            None => None,
            Some(value) => check_value(rule, value),
        })
        .collect();

    finish(errors)
}

/// Check an update payload: only the fields present are checked.
pub fn validate_patch(payload: &Map<String, Value>) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = BOOK_SCHEMA
        .iter()
        .filter_map(|rule| payload.get(rule.name).and_then(|value| check_value(rule, value)))
        .collect();

    finish(errors)
}

fn check_value(rule: &FieldRule, value: &Value) -> Option<FieldError> {
    if value.is_null() {
        return rule.required.then(|| {
            FieldError::new(rule.name, format!("{} is a mandatory field", rule.name))
        });
    }

    match rule.kind {
        FieldKind::Text => match value.as_str() {
            Some(text) if text.trim().is_empty() => Some(FieldError::new(
                rule.name,
                format!("{} must not be empty", rule.name),
            )),
            Some(_) => None,
            None => Some(FieldError::new(
                rule.name,
                format!("{} needs to be a string", rule.name),
            )),
        },
        FieldKind::Number if value.is_number() => None,
        FieldKind::Number => Some(FieldError::new(
            rule.name,
            format!("{} needs to be a number", rule.name),
        )),
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
