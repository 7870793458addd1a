use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Which backend the assignment controller talks to
  pub backend: Backend,
  pub api: ApiConfig,
  pub database: DatabaseConfig,
  /// Write logs to this file instead of stderr
  pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// REST API through the cached request client
  #[default]
  Rest,
  /// Local SQLite database with the tbl_* schema
  Database,
}

impl FromStr for Backend {
  type Err = color_eyre::Report;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().as_str() {
      "rest" | "api" => Ok(Backend::Rest),
      "database" | "db" | "sqlite" => Ok(Backend::Database),
      other => Err(eyre!("Unknown backend '{}', expected 'rest' or 'database'", other)),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url: String,
  /// Per-request transport timeout
  pub timeout_secs: u64,
  /// Cache GET responses until a mutation on the same resource
  pub cache: bool,
  pub endpoints: Endpoints,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      timeout_secs: DEFAULT_TIMEOUT_SECS,
      cache: true,
      endpoints: Endpoints::default(),
    }
  }
}

impl ApiConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

/// REST paths for the lecturer/course assignment resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Endpoints {
  /// GET: every assignment
  pub list: String,
  /// POST: create an assignment
  pub create: String,
  /// DELETE: template with `{id_dosen}` and `{id_mk_genap}` placeholders
  pub delete: String,
}

impl Default for Endpoints {
  fn default() -> Self {
    Self {
      list: "data_dosen".to_string(),
      create: "data_dosen".to_string(),
      delete: "dosen/{id_dosen}/{id_mk_genap}".to_string(),
    }
  }
}

impl Endpoints {
  pub fn delete_path(&self, id_dosen: i64, id_mk_genap: i64) -> String {
    self
      .delete
      .replace("{id_dosen}", &id_dosen.to_string())
      .replace("{id_mk_genap}", &id_mk_genap.to_string())
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
  /// SQLite file (default: $XDG_DATA_HOME/jadwal/jadwal.db)
  pub path: Option<PathBuf>,
}

impl DatabaseConfig {
  pub fn resolved_path(&self) -> Result<PathBuf> {
    if let Some(path) = &self.path {
      return Ok(path.clone());
    }

    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("jadwal").join("jadwal.db"))
  }
}

impl Config {
  /// Load configuration from file and environment.
  ///
  /// File search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./jadwal.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/jadwal/config.yaml
  ///
  /// With no file, defaults apply. Environment variables override either.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("jadwal.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("jadwal").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Apply environment overrides.
  ///
  /// JADWAL_BASE_URL wins over BASE_URL.
  fn apply_env<F>(&mut self, var: F) -> Result<()>
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(url) = var("JADWAL_BASE_URL").or_else(|| var("BASE_URL")) {
      self.api.base_url = url;
    }
    if let Some(backend) = var("JADWAL_BACKEND") {
      self.backend = backend.parse()?;
    }
    if let Some(path) = var("JADWAL_DATABASE") {
      self.database.path = Some(PathBuf::from(path));
    }
    if let Some(path) = var("JADWAL_LOG_FILE") {
      self.log_file = Some(PathBuf::from(path));
    }
    Ok(())
  }

  fn validate(&self) -> Result<()> {
    let url = Url::parse(&self.api.base_url)
      .map_err(|e| eyre!("Invalid base URL '{}': {}", self.api.base_url, e))?;

    if !matches!(url.scheme(), "http" | "https") {
      return Err(eyre!(
        "Base URL must use http or https, got '{}'",
        url.scheme()
      ));
    }

    if self.api.timeout_secs == 0 {
      return Err(eyre!("api.timeout_secs must be at least 1"));
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;
  use std::io::Write;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.backend, Backend::Rest);
    assert_eq!(config.api.base_url, "http://localhost:8000");
    assert_eq!(config.api.timeout(), Duration::from_secs(30));
    assert!(config.api.cache);
    assert_eq!(config.api.endpoints.list, "data_dosen");
    assert_eq!(config.api.endpoints.create, "data_dosen");
  }

  #[test]
  fn test_delete_path_fills_placeholders() {
    let endpoints = Endpoints::default();
    assert_eq!(endpoints.delete_path(3, 42), "dosen/3/42");
  }

  #[test]
  fn test_load_partial_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
      file,
      "backend: database\napi:\n  base_url: http://10.0.0.5:9000\n  cache: false\ndatabase:\n  path: /tmp/jadwal.db"
    )
    .unwrap();

    let config = Config::load_from_path(file.path()).unwrap();
    assert_eq!(config.backend, Backend::Database);
    assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
    assert!(!config.api.cache);
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.api.endpoints.list, "data_dosen");
    assert_eq!(
      config.database.resolved_path().unwrap(),
      PathBuf::from("/tmp/jadwal.db")
    );
  }

  #[test]
  fn test_missing_explicit_path_fails() {
    let result = Config::load(Some(Path::new("/nonexistent/jadwal.yaml")));
    assert!(result.is_err());
  }

  #[test]
  fn test_env_overrides() {
    let env: HashMap<&str, &str> = [
      ("BASE_URL", "http://fallback:8000"),
      ("JADWAL_BASE_URL", "http://preferred:8000"),
      ("JADWAL_BACKEND", "sqlite"),
      ("JADWAL_DATABASE", "/var/lib/jadwal.db"),
    ]
    .into_iter()
    .collect();

    let mut config = Config::default();
    config
      .apply_env(|key| env.get(key).map(|v| v.to_string()))
      .unwrap();

    assert_eq!(config.api.base_url, "http://preferred:8000");
    assert_eq!(config.backend, Backend::Database);
    assert_eq!(
      config.database.path,
      Some(PathBuf::from("/var/lib/jadwal.db"))
    );
    assert!(config.log_file.is_none());
  }

  #[test]
  fn test_base_url_fallback_env() {
    let mut config = Config::default();
    config
      .apply_env(|key| (key == "BASE_URL").then(|| "http://fallback:8000".to_string()))
      .unwrap();
    assert_eq!(config.api.base_url, "http://fallback:8000");
  }

  #[test]
  fn test_unknown_backend_is_rejected() {
    let mut config = Config::default();
    let result = config.apply_env(|key| (key == "JADWAL_BACKEND").then(|| "redis".to_string()));
    assert!(result.is_err());
  }

  #[test]
  fn test_validate_rejects_bad_urls() {
    let mut config = Config::default();
    config.api.base_url = "not a url".to_string();
    assert!(config.validate().is_err());

    config.api.base_url = "ftp://example.com".to_string();
    assert!(config.validate().is_err());

    config.api.base_url = "https://api.example.com/v1".to_string();
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_validate_rejects_zero_timeout() {
    let mut config = Config::default();
    config.api.timeout_secs = 0;
    assert!(config.validate().is_err());

    config.api.timeout_secs = 1;
    assert!(config.validate().is_ok());
  }
}
