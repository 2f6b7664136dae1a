pub mod errors;
pub mod state;
pub mod routes;
pub mod startup;
pub mod openapi;

pub use startup::run;
