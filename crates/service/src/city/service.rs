use std::collections::HashMap;
use std::sync::Arc;

use configs::UniquenessMode;
use models::city::DUPLICATE_CITY_MESSAGE;
use models::{City, CityInput, CityPatch, FieldErrors};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::city::clock::{Clock, SystemClock};
use crate::city::repository::CityRepository;
use crate::errors::ServiceError;

/// CRUD over the city collection with the name+country uniqueness rule.
///
/// Every call loads the full collection from the repository; every mutation
/// writes it back in full. Mutations hold `write_lock` for the whole
/// load/check/save sequence, so two writers in this process never interleave.
pub struct CityService {
    repo: Arc<dyn CityRepository>,
    clock: Arc<dyn Clock>,
    uniqueness: UniquenessMode,
    write_lock: Mutex<()>,
}

impl CityService {
    pub fn new(repo: Arc<dyn CityRepository>) -> Self {
        Self {
            repo,
            clock: Arc::new(SystemClock),
            uniqueness: UniquenessMode::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_uniqueness(mut self, mode: UniquenessMode) -> Self {
        self.uniqueness = mode;
        self
    }

    /// All cities, oldest first.
    pub async fn list_all(&self) -> Result<Vec<City>, ServiceError> {
        let mut cities: Vec<City> = self.repo.load().await?.into_values().collect();
        cities.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        debug!(count = cities.len(), "listed cities");
        Ok(cities)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<City>, ServiceError> {
        Ok(self.repo.load().await?.remove(&id))
    }

    #[instrument(skip(self, input), fields(city_name = %input.name, city_country = %input.country))]
    pub async fn create(&self, input: CityInput) -> Result<City, ServiceError> {
        let input = input.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut cities = self.repo.load().await?;
        ensure_unique(&cities, &input.name, &input.country, None)?;

        let city = City::new(input, self.clock.now());
        cities.insert(city.id, city.clone());
        self.repo.save(&cities).await?;
        info!(city_id = %city.id, "city_created");
        Ok(city)
    }

    #[instrument(skip(self, patch), fields(city_id = %id))]
    pub async fn update(&self, id: Uuid, patch: CityPatch) -> Result<City, ServiceError> {
        let patch = patch.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut cities = self.repo.load().await?;
        let current = cities.get(&id).ok_or_else(|| ServiceError::not_found("City"))?;

        if let Some((name, country)) = self.pair_to_check(current, &patch) {
            ensure_unique(&cities, &name, &country, Some(id))?;
        }

        let now = self.clock.now();
        let city = cities.get_mut(&id).ok_or_else(|| ServiceError::not_found("City"))?;
        city.apply(patch, now);
        let updated = city.clone();
        self.repo.save(&cities).await?;
        info!("city_updated");
        Ok(updated)
    }

    /// Returns whether a record was removed. A missing id leaves storage untouched.
    #[instrument(skip(self), fields(city_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut cities = self.repo.load().await?;
        if cities.remove(&id).is_none() {
            debug!("city_delete_missing");
            return Ok(false);
        }
        self.repo.save(&cities).await?;
        info!("city_deleted");
        Ok(true)
    }

    /// The name+country pair an update must keep unique, if any.
    fn pair_to_check(&self, current: &City, patch: &CityPatch) -> Option<(String, String)> {
        match self.uniqueness {
            UniquenessMode::EffectivePair if patch.is_empty() => None,
            UniquenessMode::EffectivePair => Some((
                patch.name.clone().unwrap_or_else(|| current.name.clone()),
                patch.country.clone().unwrap_or_else(|| current.country.clone()),
            )),
            UniquenessMode::BothFieldsSupplied => match (&patch.name, &patch.country) {
                (Some(name), Some(country)) => Some((name.clone(), country.clone())),
                _ => None,
            },
        }
    }
}

fn ensure_unique(
    cities: &HashMap<Uuid, City>,
    name: &str,
    country: &str,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    let taken = cities
        .values()
        .any(|c| Some(c.id) != except && c.is_same_place(name, country));
    if taken {
        return Err(ServiceError::Duplicate(FieldErrors::single("name", DUPLICATE_CITY_MESSAGE)));
    }
    Ok(())
}
