//! Service layer providing the city CRUD operations on top of models.
//! - Separates business rules (validation, uniqueness) from persistence.
//! - Persistence goes through the `CityRepository` trait; the JSON file
//!   implementation is built on the generic `JsonMapStore`.

pub mod errors;
pub mod storage;
pub mod city;
