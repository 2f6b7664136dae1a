//! City collection: storage abstraction and the CRUD service on top of it.

pub mod clock;
pub mod repository;
pub mod service;

pub use clock::{Clock, SystemClock};
pub use repository::{CityRepository, InMemoryCityRepository, JsonFileCityRepository};
pub use service::CityService;
