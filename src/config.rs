use crate::token::{TokenFile, TOKEN_KEY};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_BASE_PATH: &str = "/api";
const DEFAULT_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_CLIENT_HOST: &str = "localhost";

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Backend connection settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Development conveniences
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DevConfig {
    /// Host the client considers itself to be running on
    #[serde(default)]
    pub client_host: Option<String>,
    /// Swap a "preview" backend URL for the local default when running locally
    #[serde(default)]
    pub prefer_local_backend: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub dev: DevConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.shopfront/config.local.toml) > project (.shopfront/config.toml) > user (~/.shopfront/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".shopfront").join("config.toml");
            if user_config.exists() {
                config.merge(Self::load_from(&user_config)?);
            }
        }

        let project_config = Path::new(".shopfront").join("config.toml");
        if project_config.exists() {
            config.merge(Self::load_from(&project_config)?);
        }

        // Should be gitignored
        let local_config = Path::new(".shopfront").join("config.local.toml");
        if local_config.exists() {
            config.merge(Self::load_from(&local_config)?);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority for every field it sets)
    pub fn merge(&mut self, other: Config) {
        if other.api.base_url.is_some() {
            self.api.base_url = other.api.base_url;
        }
        if other.api.base_path.is_some() {
            self.api.base_path = other.api.base_path;
        }
        if other.api.timeout_ms.is_some() {
            self.api.timeout_ms = other.api.timeout_ms;
        }
        if other.dev.client_host.is_some() {
            self.dev.client_host = other.dev.client_host;
        }
        if other.dev.prefer_local_backend.is_some() {
            self.dev.prefer_local_backend = other.dev.prefer_local_backend;
        }
        if other.session.token_path.is_some() {
            self.session.token_path = other.session.token_path;
        }
    }

    pub fn base_path(&self) -> &str {
        self.api.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    pub fn client_host(&self) -> &str {
        self.dev.client_host.as_deref().unwrap_or(DEFAULT_CLIENT_HOST)
    }

    pub fn prefer_local_backend(&self) -> bool {
        self.dev.prefer_local_backend.unwrap_or(true)
    }

    pub fn token_file(&self) -> TokenFile {
        match &self.session.token_path {
            Some(path) if path.is_dir() => TokenFile::new(path.join(TOKEN_KEY)),
            Some(path) => TokenFile::new(path.clone()),
            None => TokenFile::default_location(),
        }
    }

    /// Backend root: the environment/CLI value wins over the config file
    pub fn backend_url(&self, from_env: Option<&str>) -> String {
        let configured = from_env
            .filter(|s| !s.trim().is_empty())
            .or(self.api.base_url.as_deref());
        resolve_backend_url(configured, self.client_host(), self.prefer_local_backend())
    }

    /// Backend root plus the API base path
    pub fn api_url(&self, from_env: Option<&str>) -> String {
        let backend = self.backend_url(from_env);
        let path = self.base_path().trim_matches('/');
        if path.is_empty() {
            backend.trim_end_matches('/').to_string()
        } else {
            format!("{}/{}", backend.trim_end_matches('/'), path)
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(url) = &self.api.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(ValidationError {
                    field: "api.base_url".to_string(),
                    message: format!("Expected an http(s) URL, got '{}'", url),
                });
            }
        }

        if let Some(path) = &self.api.base_path {
            if !path.is_empty() && !path.starts_with('/') {
                errors.push(ValidationError {
                    field: "api.base_path".to_string(),
                    message: format!("Must start with '/', got '{}'", path),
                });
            }
        }

        if self.api.timeout_ms == Some(0) {
            errors.push(ValidationError {
                field: "api.timeout_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if let Some(host) = &self.dev.client_host {
            if host.trim().is_empty() {
                errors.push(ValidationError {
                    field: "dev.client_host".to_string(),
                    message: "Must not be empty".to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Pick the backend root URL.
///
/// Unset falls back to the local default. A "preview" URL is swapped for the
/// local default when the client itself runs on a local host.
pub fn resolve_backend_url(configured: Option<&str>, client_host: &str, prefer_local: bool) -> String {
    let Some(url) = configured else {
        return DEFAULT_BACKEND_URL.to_string();
    };
    let local_client = matches!(client_host, "localhost" | "127.0.0.1");
    if prefer_local && local_client && url.contains("preview") {
        return DEFAULT_BACKEND_URL.to_string();
    }
    url.to_string()
}
