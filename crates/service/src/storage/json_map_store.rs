use std::{
    collections::HashMap,
    hash::Hash,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::fs;
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map store.
///
/// The file holds one JSON object; every `load` reads and parses it from
/// disk and every `save` replaces it wholesale. Nothing is cached in memory.
pub struct JsonMapStore<K, V> {
    file_path: PathBuf,
    pretty: bool,
    _entries: PhantomData<fn() -> (K, V)>,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned,
    V: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    pub async fn new<P: Into<PathBuf>>(path: P, pretty: bool) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::storage(parent, "create directory", e))?;
        }

        let store = Self { file_path, pretty, _entries: PhantomData };
        match fs::symlink_metadata(&store.file_path).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                store.save(&HashMap::new()).await?;
                debug!(path = %store.file_path.display(), "initialized empty store file");
            }
            Err(e) => return Err(ServiceError::storage(&store.file_path, "inspect", e)),
        }
        Ok(Arc::new(store))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read the whole map. A missing or blank file is an empty map; anything
    /// that does not parse is an error.
    pub async fn load(&self) -> Result<HashMap<K, V>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(ServiceError::storage(&self.file_path, "read", e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(HashMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::storage(&self.file_path, "parse", e))
    }

    /// Overwrite the file with the full map via write-to-temp + rename.
    pub async fn save(&self, map: &HashMap<K, V>) -> Result<(), ServiceError> {
        let data = if self.pretty {
            serde_json::to_vec_pretty(map)
        } else {
            serde_json::to_vec(map)
        }
        .map_err(|e| ServiceError::storage(&self.file_path, "serialize", e))?;

        let tmp = self.temp_path();
        fs::write(&tmp, data)
            .await
            .map_err(|e| ServiceError::storage(&tmp, "write", e))?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|e| ServiceError::storage(&self.file_path, "replace", e))?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}
