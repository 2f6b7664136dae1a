//! Field-level validation rules and the ordered error bag they fill.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::errors::ModelError;

pub const MIN_CHARS: usize = 2;
pub const MAX_CHARS: usize = 255;

/// Field name -> messages, in the order the fields were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, Vec<String>)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.0.iter_mut().find(|(f, _)| f == field) {
            Some((_, messages)) => messages.push(message),
            None => self.0.push((field.to_string(), vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn count(&self) -> usize {
        self.0.iter().map(|(_, m)| m.len()).sum()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.iter().find(|(f, _)| f == field).map(|(_, m)| m.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(f, _)| f.as_str())
    }

    pub fn first_message(&self) -> Option<&str> {
        self.0.first().and_then(|(_, m)| m.first()).map(String::as_str)
    }

    /// First message plus a count of the rest, e.g.
    /// `The name field is required. (and 1 more error)`.
    pub fn summary(&self) -> String {
        let first = self.first_message().unwrap_or("The given data was invalid.");
        match self.count().saturating_sub(1) {
            0 => first.to_string(),
            1 => format!("{first} (and 1 more error)"),
            n => format!("{first} (and {n} more errors)"),
        }
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ModelError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(ModelError::Validation(self))
        }
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, messages) in &self.0 {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

pub fn required_message(field: &str) -> String {
    format!("The {field} field is required.")
}

pub fn string_message(field: &str) -> String {
    format!("The {field} field must be a string.")
}

pub fn min_message(field: &str) -> String {
    format!("The {field} field must be at least {MIN_CHARS} characters.")
}

pub fn max_message(field: &str) -> String {
    format!("The {field} field must not be greater than {MAX_CHARS} characters.")
}

/// Trim `raw` and check it against the length rules. Returns the trimmed
/// value when it passes; otherwise records one message for `field`.
pub fn check_text(field: &str, raw: &str, errors: &mut FieldErrors) -> Option<String> {
    let value = raw.trim();
    let chars = value.chars().count();
    if chars == 0 {
        errors.add(field, required_message(field));
        None
    } else if chars < MIN_CHARS {
        errors.add(field, min_message(field));
        None
    } else if chars > MAX_CHARS {
        errors.add(field, max_message(field));
        None
    } else {
        Some(value.to_string())
    }
}

/// Check an untyped JSON field. `None` means the key was absent; `Some(Null)`
/// means it was sent as `null`, which counts as present but empty.
pub fn check_json_text(
    field: &str,
    value: Option<&Value>,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<String> {
    match value {
        None => {
            if required {
                errors.add(field, required_message(field));
            }
            None
        }
        Some(Value::Null) => {
            errors.add(field, required_message(field));
            None
        }
        Some(Value::String(s)) => check_text(field, s, errors),
        Some(_) => {
            errors.add(field, string_message(field));
            None
        }
    }
}
