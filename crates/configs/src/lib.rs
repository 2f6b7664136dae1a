use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

/// How an update decides whether to re-check the name+country uniqueness rule.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UniquenessMode {
    /// Check the merged pair (supplied values over stored ones) whenever
    /// either field is supplied.
    #[default]
    EffectivePair,
    /// Check only when both `name` and `country` are supplied together.
    BothFieldsSupplied,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_cities_file")]
    pub cities_file: String,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    #[serde(default)]
    pub update_uniqueness: UniquenessMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cities_file: default_cities_file(),
            pretty: default_pretty(),
            update_uniqueness: UniquenessMode::default(),
        }
    }
}

fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_cities_file() -> String { "cities.json".to_string() }
fn default_pretty() -> bool { true }

/// Path of the config file: `CONFIG_PATH`, or `config.toml` in the working directory.
pub fn config_path() -> PathBuf {
    std::env::var("CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// Parse the config file at `path`. `Ok(None)` when the file does not exist;
/// any other read failure or a parse failure is an error.
pub fn load_from_file(path: &Path) -> Result<Option<AppConfig>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading config {}", path.display())),
    };
    let cfg: AppConfig =
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(Some(cfg))
}

impl AppConfig {
    /// Config file from [`config_path`] when present, otherwise defaults filled
    /// from `SERVER_HOST` / `SERVER_PORT` / `TOKIO_WORKER_THREADS`.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_from(&config_path())
    }

    pub fn load_or_env_from(path: &Path) -> Result<Self> {
        let mut cfg = match load_from_file(path)? {
            Some(cfg) => cfg,
            None => {
                let mut cfg = AppConfig::default();
                cfg.server.apply_env();
                cfg
            }
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(dir) = std::env::var("CITIES_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_dir is empty"));
        }
        let file = self.cities_file.trim();
        if file.is_empty() {
            return Err(anyhow!("storage.cities_file is empty"));
        }
        if file.contains('/') || file.contains('\\') {
            return Err(anyhow!("storage.cities_file must be a bare file name, got {file:?}"));
        }
        Ok(())
    }

    /// Full path of the cities JSON document.
    pub fn cities_path(&self) -> PathBuf {
        self.data_dir.join(self.cities_file.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.cities_path(), PathBuf::from("data").join("cities.json"));
        assert!(cfg.storage.pretty);
        assert_eq!(cfg.storage.update_uniqueness, UniquenessMode::EffectivePair);
    }

    #[test]
    fn parses_storage_section() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            worker_threads = 0

            [storage]
            data_dir = "/var/lib/cities"
            cities_file = "store.json"
            pretty = false
            update_uniqueness = "both_fields_supplied"
            "#,
        )
        .unwrap();
        let mut server = cfg.server.clone();
        server.normalize().unwrap();
        assert_eq!(server.worker_threads, Some(4));
        assert_eq!(server.bind_addr(), "0.0.0.0:9000");
        assert_eq!(cfg.storage.cities_path(), PathBuf::from("/var/lib/cities/store.json"));
        assert!(!cfg.storage.pretty);
        assert_eq!(cfg.storage.update_uniqueness, UniquenessMode::BothFieldsSupplied);
    }

    #[test]
    fn rejects_bad_values() {
        let mut server = ServerConfig { host: " ".into(), port: 0, worker_threads: None };
        assert!(server.normalize().is_err());

        let storage = StorageConfig { cities_file: "a/b.json".into(), ..StorageConfig::default() };
        assert!(storage.validate().is_err());
        let storage = StorageConfig { cities_file: "  ".into(), ..StorageConfig::default() };
        assert!(storage.validate().is_err());
        assert!(StorageConfig::default().validate().is_ok());
    }

    fn tmp_config(content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("city_api_config_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn partial_file_keeps_configured_values() {
        let path = tmp_config(
            r#"
            [server]
            port = 9000

            [storage]
            data_dir = "/srv/cities"
            update_uniqueness = "both_fields_supplied"
            "#,
        );
        let cfg = AppConfig::load_or_env_from(&path).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.storage.update_uniqueness, UniquenessMode::BothFieldsSupplied);
        if std::env::var_os("CITIES_DATA_DIR").is_none() {
            assert_eq!(cfg.storage.data_dir, PathBuf::from("/srv/cities"));
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("city_api_absent_{}.toml", uuid::Uuid::new_v4()));
        assert!(load_from_file(&path).unwrap().is_none());
        let cfg = AppConfig::load_or_env_from(&path).unwrap();
        assert_eq!(cfg.storage.cities_file, "cities.json");
        assert_eq!(cfg.server.worker_threads.map(|w| w > 0), Some(true));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = tmp_config("[server]
port = \"not a number\"
[storage
");
        let err = AppConfig::load_or_env_from(&path).unwrap_err();
        assert!(err.to_string().contains("parsing config"), "{err:#}");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unknown_uniqueness_mode_is_rejected() {
        let res: Result<AppConfig, _> = toml::from_str("[storage]\nupdate_uniqueness = \"never\"\n");
        assert!(res.is_err());
    }
}
