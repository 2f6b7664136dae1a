use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validation::{check_json_text, check_text, FieldErrors};

/// Message reported on `name` when the name+country pair is taken.
pub const DUPLICATE_CITY_MESSAGE: &str = "This city already exists in this country.";

/// A stored city. Serialized as-is both to the store file and in responses.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct City {
    pub id: Uuid,
    pub name: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl City {
    /// Build a fresh record; both timestamps come from the same instant.
    pub fn new(input: CityInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            country: input.country,
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive comparison on both fields.
    pub fn is_same_place(&self, name: &str, country: &str) -> bool {
        same_text(&self.name, name) && same_text(&self.country, country)
    }

    /// Replace the supplied fields and refresh `updated_at`.
    pub fn apply(&mut self, patch: CityPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(country) = patch.country {
            self.country = country;
        }
        self.updated_at = now;
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Create input: both fields required.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CityInput {
    pub name: String,
    pub country: String,
}

impl CityInput {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self { name: name.into(), country: country.into() }
    }

    /// Check lengths and return the trimmed input.
    pub fn validate(self) -> Result<Self, ModelError> {
        let mut errors = FieldErrors::new();
        let name = check_text("name", &self.name, &mut errors);
        let country = check_text("country", &self.country, &mut errors);
        match (name, country) {
            (Some(name), Some(country)) => errors.into_result(Self { name, country }),
            _ => Err(ModelError::Validation(errors)),
        }
    }
}

/// Update input: only supplied fields change.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl CityPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.country.is_none()
    }

    pub fn validate(self) -> Result<Self, ModelError> {
        let mut errors = FieldErrors::new();
        let name = self.name.and_then(|n| check_text("name", &n, &mut errors));
        let country = self.country.and_then(|c| check_text("country", &c, &mut errors));
        errors.into_result(Self { name, country })
    }
}

/// Raw request body. Fields stay untyped so wrong types surface as field
/// errors; an explicit `null` is kept apart from a missing key.
#[derive(Debug, Default, Deserialize)]
pub struct CityPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub country: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl CityPayload {
    pub fn into_input(self) -> Result<CityInput, ModelError> {
        let mut errors = FieldErrors::new();
        let name = check_json_text("name", self.name.as_ref(), true, &mut errors);
        let country = check_json_text("country", self.country.as_ref(), true, &mut errors);
        match (name, country) {
            (Some(name), Some(country)) => errors.into_result(CityInput { name, country }),
            _ => Err(ModelError::Validation(errors)),
        }
    }

    pub fn into_patch(self) -> Result<CityPatch, ModelError> {
        let mut errors = FieldErrors::new();
        let name = check_json_text("name", self.name.as_ref(), false, &mut errors);
        let country = check_json_text("country", self.country.as_ref(), false, &mut errors);
        errors.into_result(CityPatch { name, country })
    }
}
