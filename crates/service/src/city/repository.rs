use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use models::City;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

/// Whole-collection persistence for cities.
/// Implementations can be file-backed, in-memory, or anything else that can
/// hand back and accept the full map.
#[async_trait]
pub trait CityRepository: Send + Sync {
    async fn load(&self) -> Result<HashMap<Uuid, City>, ServiceError>;
    async fn save(&self, cities: &HashMap<Uuid, City>) -> Result<(), ServiceError>;
}

/// File storage: the collection is one JSON object keyed by city id.
#[derive(Clone)]
pub struct JsonFileCityRepository {
    store: Arc<JsonMapStore<Uuid, City>>,
}

impl JsonFileCityRepository {
    /// Initialize storage, creating an empty file if none exists.
    pub async fn new<P: Into<PathBuf>>(path: P, pretty: bool) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<Uuid, City>::new(path, pretty).await?;
        Ok(Arc::new(Self { store }))
    }

    pub fn path(&self) -> &std::path::Path {
        self.store.path()
    }
}

#[async_trait]
impl CityRepository for JsonFileCityRepository {
    async fn load(&self) -> Result<HashMap<Uuid, City>, ServiceError> {
        self.store.load().await
    }

    async fn save(&self, cities: &HashMap<Uuid, City>) -> Result<(), ServiceError> {
        self.store.save(cities).await
    }
}

/// Memory-only storage. `set_failing(true)` makes every call return a
/// storage error.
#[derive(Default)]
pub struct InMemoryCityRepository {
    cities: RwLock<HashMap<Uuid, City>>,
    failing: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryCityRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::Storage("in-memory storage unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CityRepository for InMemoryCityRepository {
    async fn load(&self) -> Result<HashMap<Uuid, City>, ServiceError> {
        self.check()?;
        Ok(self.cities.read().await.clone())
    }

    async fn save(&self, cities: &HashMap<Uuid, City>) -> Result<(), ServiceError> {
        self.check()?;
        *self.cities.write().await = cities.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
