use std::sync::Arc;

use service::city::CityService;

#[derive(Clone)]
pub struct ServerState {
    pub cities: Arc<CityService>,
}

impl ServerState {
    pub fn new(cities: CityService) -> Self {
        Self { cities: Arc::new(cities) }
    }
}
