//! City record, request payloads and their field validation rules.

pub mod errors;
pub mod validation;
pub mod city;

pub use city::{City, CityInput, CityPatch, CityPayload};
pub use errors::ModelError;
pub use validation::FieldErrors;
